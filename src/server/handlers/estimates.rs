use axum::extract::{Extension, Json};

use crate::entities::{ComparisonRequest, ComparisonResult};
use crate::error::Error;
use crate::server::DynAPI;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Json<Option<ComparisonResult>>, Error> {
    let result = api.estimate(request).await?;

    Ok(result.into())
}
