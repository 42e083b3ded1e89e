//! Simulated fare estimation.
//!
//! Every provider's fare starts from a fixed base per category, receives a
//! uniform integer jitter clamped to a floor, and is then multiplied by a
//! surge factor that kicks in with a per-provider probability. ETAs are drawn
//! from a per-provider range. Nothing here talks to a real provider.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Uniform};

use crate::{
    entities::{ComparisonRequest, ComparisonResult, Provider, Quote},
    error::{config_error, Error},
};

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(800);

#[derive(Clone, Debug)]
pub struct PricingPolicy {
    /// Largest absolute jitter applied to a base fare.
    pub jitter: u32,
    /// Lowest fare any provider may quote before surge.
    pub floor: u32,
    /// Indexed by provider enumeration order.
    pub providers: [ProviderPolicy; 3],
}

#[derive(Clone, Debug)]
pub struct ProviderPolicy {
    pub eta_minutes: RangeInclusive<u32>,
    pub surge_probability: f64,
    pub surge_multiplier: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            jitter: 15,
            floor: 50,
            providers: [
                ProviderPolicy {
                    eta_minutes: 2..=6,
                    surge_probability: 0.2,
                    surge_multiplier: 1.2,
                },
                ProviderPolicy {
                    eta_minutes: 3..=7,
                    surge_probability: 0.15,
                    surge_multiplier: 1.3,
                },
                ProviderPolicy {
                    eta_minutes: 2..=5,
                    surge_probability: 0.1,
                    surge_multiplier: 1.1,
                },
            ],
        }
    }
}

impl PricingPolicy {
    pub fn provider(&self, provider: Provider) -> &ProviderPolicy {
        &self.providers[provider.index()]
    }
}

#[derive(Debug)]
struct ProviderSampler {
    eta_minutes: Uniform<u32>,
    surge: Bernoulli,
    surge_multiplier: f64,
}

#[derive(Debug)]
pub struct Estimator {
    floor: u32,
    jitter: Uniform<i64>,
    providers: Vec<ProviderSampler>,
    latency: Duration,
}

impl Estimator {
    pub fn new(policy: PricingPolicy, latency: Duration) -> Result<Self, Error> {
        let jitter = i64::from(policy.jitter);

        let providers = policy
            .providers
            .iter()
            .map(|provider| {
                let (min, max) = (*provider.eta_minutes.start(), *provider.eta_minutes.end());

                if min > max || provider.surge_multiplier < 1.0 {
                    return Err(config_error());
                }

                Ok(ProviderSampler {
                    eta_minutes: Uniform::new_inclusive(min, max),
                    surge: Bernoulli::new(provider.surge_probability)
                        .map_err(|_| config_error())?,
                    surge_multiplier: provider.surge_multiplier,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            floor: policy.floor,
            jitter: Uniform::new_inclusive(-jitter, jitter),
            providers,
            latency,
        })
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// Waits out the simulated network latency and quotes every provider.
    /// Incomplete requests return immediately with no quotes.
    #[tracing::instrument(skip(self))]
    pub async fn estimate(&self, request: &ComparisonRequest) -> Option<ComparisonResult> {
        if !request.is_complete() {
            return None;
        }

        tokio::time::sleep(self.latency).await;

        let mut rng = StdRng::from_entropy();
        self.quote(request, &mut rng)
    }

    pub fn quote<R: Rng + ?Sized>(
        &self,
        request: &ComparisonRequest,
        rng: &mut R,
    ) -> Option<ComparisonResult> {
        if !request.is_complete() {
            return None;
        }

        let quotes: BTreeMap<Provider, Quote> = Provider::ALL
            .into_iter()
            .map(|provider| {
                let sampler = &self.providers[provider.index()];

                let base = i64::from(request.category.base_fare(provider));
                let jittered = (base + self.jitter.sample(rng)).max(i64::from(self.floor));

                let eta_minutes = sampler.eta_minutes.sample(rng);

                let surge_multiplier = if sampler.surge.sample(rng) {
                    sampler.surge_multiplier
                } else {
                    1.0
                };

                let quote = Quote::new(jittered as u32, eta_minutes, surge_multiplier);
                (provider, quote)
            })
            .collect();

        let result = ComparisonResult::new(quotes)?;

        tracing::debug!(
            cheapest = ?result.cheapest,
            price = result.cheapest_quote().map(|quote| quote.price),
            "quoted {:?}",
            request.category
        );

        Some(result)
    }
}
