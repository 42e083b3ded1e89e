use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, Distance};
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    origin: Coordinates,
    destination: Coordinates,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CreateParams>,
) -> Json<Distance> {
    api.distance(params.origin, params.destination).into()
}
