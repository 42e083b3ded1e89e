use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Category, Provider};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Final fare, surge included.
    pub price: u32,
    /// Fare before surge.
    pub base_price: u32,
    pub eta_minutes: u32,
    pub eta: String,
    pub surge_multiplier: f64,
}

impl Quote {
    pub fn new(base_price: u32, eta_minutes: u32, surge_multiplier: f64) -> Self {
        let price = (base_price as f64 * surge_multiplier).round() as u32;

        Self {
            price,
            base_price,
            eta_minutes,
            eta: format!("{} min", eta_minutes),
            surge_multiplier,
        }
    }

    pub fn is_surging(&self) -> bool {
        self.surge_multiplier > 1.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub pickup: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub category: Category,
}

impl ComparisonRequest {
    pub fn new(pickup: &str, destination: &str, category: Category) -> Self {
        Self {
            pickup: pickup.into(),
            destination: destination.into(),
            category,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.pickup.trim().is_empty() && !self.destination.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub quotes: BTreeMap<Provider, Quote>,
    pub cheapest: Provider,
    /// Difference between the most expensive and the cheapest final fare.
    pub savings: u32,
    pub generated_at: DateTime<Utc>,
}

impl ComparisonResult {
    /// Returns `None` when there is nothing to compare.
    pub fn new(quotes: BTreeMap<Provider, Quote>) -> Option<Self> {
        // min_by_key keeps the first of equal elements, and the map iterates
        // in provider enumeration order
        let cheapest = quotes
            .iter()
            .min_by_key(|(_, quote)| quote.price)
            .map(|(provider, _)| *provider)?;

        let highest = quotes.values().map(|quote| quote.price).max()?;
        let savings = highest - quotes[&cheapest].price;

        Some(Self {
            quotes,
            cheapest,
            savings,
            generated_at: Utc::now(),
        })
    }

    pub fn quote(&self, provider: Provider) -> Option<&Quote> {
        self.quotes.get(&provider)
    }

    pub fn cheapest_quote(&self) -> Option<&Quote> {
        self.quote(self.cheapest)
    }
}
