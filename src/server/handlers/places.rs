use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};

use crate::entities::{Place, PlaceLookup};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    input: String,
    #[serde(default)]
    session_token: String,
}

#[derive(Serialize, Deserialize)]
pub struct FindParams {
    #[serde(default)]
    session_token: String,
}

pub async fn find_suggestions(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<PlaceLookup>, Error> {
    let lookup = api
        .suggest_places(params.input, params.session_token)
        .await?;

    Ok(lookup.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
    Query(params): Query<FindParams>,
) -> Result<Json<Place>, Error> {
    let place = api.find_place(id, params.session_token).await?;

    Ok(place.into())
}
