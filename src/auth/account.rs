use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization resource for per-user data: the profile and the connected
/// providers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
}

impl Account {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

impl PolarClass for Account {
    fn get_polar_class_builder() -> oso::ClassBuilder<Account> {
        oso::Class::builder()
            .name("Account")
            .add_attribute_getter("id", |recv: &Account| recv.id.clone())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Account::get_polar_class_builder();
        builder.build()
    }
}
