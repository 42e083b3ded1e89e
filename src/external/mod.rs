pub mod google_maps;
mod loader;

pub use google_maps::GoogleMaps;
pub use loader::{Loader, LoaderStatus};

pub type PlacesLoader = Loader<GoogleMaps>;

impl PlacesLoader {
    pub fn from_env() -> Self {
        Loader::new(GoogleMaps::from_env())
    }
}
