use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::User;
use crate::comparison::Comparison;
use crate::entities::{
    ComparisonRequest, ComparisonResult, Connections, Coordinates, Distance, Place, PlaceLookup,
    Profile, ProfileUpdate, Provider,
};
use crate::error::Error;

#[async_trait]
pub trait EstimateAPI {
    async fn estimate(&self, request: ComparisonRequest)
        -> Result<Option<ComparisonResult>, Error>;
}

#[async_trait]
pub trait ComparisonAPI {
    async fn open_comparison(&self, request: Option<ComparisonRequest>)
        -> Result<Comparison, Error>;
    async fn find_comparison(&self, id: Uuid) -> Result<Comparison, Error>;
    async fn update_comparison(
        &self,
        id: Uuid,
        request: ComparisonRequest,
    ) -> Result<Comparison, Error>;
    async fn refresh_comparison(&self, id: Uuid) -> Result<Comparison, Error>;
    async fn close_comparison(&self, id: Uuid) -> Result<(), Error>;
}

pub trait DistanceAPI {
    fn distance(&self, origin: Coordinates, destination: Coordinates) -> Distance;
}

#[async_trait]
pub trait PlaceAPI {
    async fn suggest_places(&self, input: String, session_token: String)
        -> Result<PlaceLookup, Error>;
    async fn find_place(&self, place_id: String, session_token: String) -> Result<Place, Error>;
}

#[async_trait]
pub trait ProfileAPI {
    async fn find_profile(&self, user: User, user_id: Uuid) -> Result<Profile, Error>;
    async fn update_profile(
        &self,
        user: User,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, Error>;
}

#[async_trait]
pub trait ConnectionAPI {
    async fn find_connections(&self, user: User, user_id: Uuid) -> Result<Connections, Error>;
    async fn set_connection(
        &self,
        user: User,
        user_id: Uuid,
        provider: Provider,
        connected: bool,
    ) -> Result<Connections, Error>;
}

pub trait API:
    EstimateAPI + ComparisonAPI + DistanceAPI + PlaceAPI + ProfileAPI + ConnectionAPI
{
}
