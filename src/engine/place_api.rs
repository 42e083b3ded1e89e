use super::Engine;

use async_trait::async_trait;

use crate::{
    api::PlaceAPI,
    entities::{Place, PlaceLookup},
    error::{places_unavailable_error, Error},
};

#[async_trait]
impl PlaceAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn suggest_places(
        &self,
        input: String,
        session_token: String,
    ) -> Result<PlaceLookup, Error> {
        let maps = match self.places.get().await {
            Ok(maps) => maps,
            Err(err) => {
                tracing::warn!(?err, "location search unavailable, accepting free text");
                return Ok(PlaceLookup::Unavailable);
            }
        };

        if input.trim().is_empty() {
            return Ok(PlaceLookup::Suggestions(vec![]));
        }

        let suggestions = maps.find_place_suggestions(input, session_token).await?;

        Ok(PlaceLookup::Suggestions(suggestions))
    }

    #[tracing::instrument(skip(self))]
    async fn find_place(&self, place_id: String, session_token: String) -> Result<Place, Error> {
        let maps = self
            .places
            .get()
            .await
            .map_err(|_| places_unavailable_error())?;

        maps.find_place(place_id, session_token).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryStore;
    use crate::engine::test_engine;
    use crate::external::LoaderStatus;

    #[tokio::test]
    async fn failed_loader_degrades_to_free_text() {
        let engine = test_engine(Arc::new(MemoryStore::default()));

        let lookup = engine
            .suggest_places("Connaught".into(), "session".into())
            .await
            .unwrap();

        assert_eq!(lookup, PlaceLookup::Unavailable);
        assert!(!lookup.is_available());
        assert_eq!(engine.places.status(), LoaderStatus::Failed);

        let lookup = engine
            .suggest_places("Connaught Place".into(), "session".into())
            .await
            .unwrap();
        assert_eq!(lookup, PlaceLookup::Unavailable);
    }

    #[tokio::test]
    async fn details_fail_when_search_is_unavailable() {
        let engine = test_engine(Arc::new(MemoryStore::default()));

        let err = engine
            .find_place("ChIJLbZ-NFv9DDkRQJY4FbcFcgM".into(), "session".into())
            .await
            .unwrap_err();

        assert_eq!(err, places_unavailable_error());
    }
}
