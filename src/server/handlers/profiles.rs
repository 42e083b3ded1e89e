use axum::extract::{Extension, Json, Path};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Profile, ProfileUpdate};
use crate::error::Error;
use crate::server::DynAPI;

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, Error> {
    let profile = api.find_profile(user, id).await?;

    Ok(profile.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, Error> {
    let profile = api.update_profile(user, id, update).await?;

    Ok(profile.into())
}
