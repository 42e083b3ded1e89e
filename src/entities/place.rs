use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
}

/// Outcome of an autocomplete lookup. `Unavailable` means location search
/// could not be initialized and the caller should accept free text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "suggestions", rename_all = "snake_case")]
pub enum PlaceLookup {
    Suggestions(Vec<PlaceSuggestion>),
    Unavailable,
}

impl PlaceLookup {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Suggestions(_))
    }
}
