use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::ProfileAPI,
    auth::{Account, User},
    entities::{Profile, ProfileUpdate},
    error::{save_failed_error, Error},
};

#[async_trait]
impl ProfileAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_profile(&self, user: User, user_id: Uuid) -> Result<Profile, Error> {
        self.authorize(user, "read", Account::new(user_id))?;

        let profile = self.store.find_profile(user_id).await?;

        Ok(profile.unwrap_or_else(|| Profile::new(user_id)))
    }

    #[tracing::instrument(skip(self))]
    async fn update_profile(
        &self,
        user: User,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, Error> {
        self.authorize(user, "update", Account::new(user_id))?;

        let mut profile = self
            .store
            .find_profile(user_id)
            .await?
            .unwrap_or_else(|| Profile::new(user_id));

        profile.apply(update)?;

        self.store.upsert_profile(&profile).await.map_err(|err| {
            tracing::warn!(?err, "failed to save profile");
            save_failed_error()
        })?;

        Ok(profile)
    }
}
