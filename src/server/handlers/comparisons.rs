use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::comparison::Comparison;
use crate::entities::ComparisonRequest;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    request: Option<ComparisonRequest>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Comparison>, Error> {
    let comparison = api.open_comparison(params.request).await?;

    Ok(comparison.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Comparison>, Error> {
    let comparison = api.find_comparison(id).await?;

    Ok(comparison.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Json<Comparison>, Error> {
    let comparison = api.update_comparison(id, request).await?;

    Ok(comparison.into())
}

pub async fn refresh(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Comparison>, Error> {
    let comparison = api.refresh_comparison(id).await?;

    Ok(comparison.into())
}

pub async fn close(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, Error> {
    api.close_comparison(id).await?;

    Ok(().into())
}
