use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Connections, Provider};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct UpdateParams {
    connected: bool,
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Connections>, Error> {
    let connections = api.find_connections(user, id).await?;

    Ok(connections.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path((id, provider)): Path<(Uuid, Provider)>,
    Json(params): Json<UpdateParams>,
) -> Result<Json<Connections>, Error> {
    let connections = api
        .set_connection(user, id, provider, params.connected)
        .await?;

    Ok(connections.into())
}
