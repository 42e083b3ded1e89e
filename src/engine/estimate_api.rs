use super::Engine;

use async_trait::async_trait;

use crate::{
    api::{DistanceAPI, EstimateAPI},
    entities::{ComparisonRequest, ComparisonResult, Coordinates, Distance},
    error::Error,
};

#[async_trait]
impl EstimateAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn estimate(
        &self,
        request: ComparisonRequest,
    ) -> Result<Option<ComparisonResult>, Error> {
        Ok(self.estimator.estimate(&request).await)
    }
}

impl DistanceAPI for Engine {
    fn distance(&self, origin: Coordinates, destination: Coordinates) -> Distance {
        Distance::new(origin, destination)
    }
}
