use serde::{Deserialize, Serialize};

/// Ride providers compared on every request. The declaration order is the
/// enumeration order used when two providers quote the same price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Ola,
    Uber,
    Rapido,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Ola, Provider::Uber, Provider::Rapido];

    pub fn name(&self) -> String {
        match self {
            Self::Ola => "ola".into(),
            Self::Uber => "uber".into(),
            Self::Rapido => "rapido".into(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|provider| provider.name() == name)
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Ola => 0,
            Self::Uber => 1,
            Self::Rapido => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Bike,
    Auto,
    Mini,
    Sedan,
    Suv,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Bike,
        Category::Auto,
        Category::Mini,
        Category::Sedan,
        Category::Suv,
    ];

    /// Base fares in provider enumeration order.
    pub fn base_fares(&self) -> [u32; 3] {
        match self {
            Self::Bike => [45, 55, 35],
            Self::Auto => [85, 95, 75],
            Self::Mini => [145, 155, 135],
            Self::Sedan => [235, 245, 225],
            Self::Suv => [345, 365, 335],
        }
    }

    pub fn base_fare(&self, provider: Provider) -> u32 {
        self.base_fares()[provider.index()]
    }
}

#[test]
fn provider_names_round_trip() {
    for provider in Provider::ALL {
        assert_eq!(Provider::from_name(&provider.name()), Some(provider));
    }

    assert_eq!(Provider::from_name("lyft"), None);
}

#[test]
fn base_fares_are_distinct_per_category() {
    for category in Category::ALL {
        let [ola, uber, rapido] = category.base_fares();
        assert!(ola != uber && uber != rapido && ola != rapido);
    }

    assert_eq!(Category::Sedan.base_fare(Provider::Ola), 235);
    assert_eq!(Category::Sedan.base_fare(Provider::Uber), 245);
    assert_eq!(Category::Sedan.base_fare(Provider::Rapido), 225);
}
