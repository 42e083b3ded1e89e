mod connection;
mod location;
mod place;
mod profile;
mod provider;
mod quote;

pub use connection::Connections;
pub use location::{distance_km, Coordinates, Distance};
pub use place::{Geometry, Place, PlaceLookup, PlaceSuggestion};
pub use profile::{AddressUpdate, Gender, Profile, ProfileUpdate, SavedAddress};
pub use provider::{Category, Provider};
pub use quote::{ComparisonRequest, ComparisonResult, Quote};
