use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_input_error, Error};

const MIN_AGE: u32 = 1;
const MAX_AGE: u32 = 120;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub addresses: Vec<SavedAddress>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: Uuid,
    pub label: String,
    pub address: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub addresses: Vec<AddressUpdate>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AddressUpdate {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub address: String,
}

impl Profile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            display_name: None,
            age: None,
            gender: None,
            addresses: vec![],
        }
    }

    /// Replaces every field with the submitted form. Nothing is changed when
    /// validation fails.
    #[tracing::instrument(skip(self))]
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<(), Error> {
        let age = match update.age {
            Some(age) if !(MIN_AGE..=MAX_AGE).contains(&age) => {
                return Err(invalid_input_error())
            }
            Some(age) => Some(u8::try_from(age).map_err(|_| invalid_input_error())?),
            None => None,
        };

        let display_name = update
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let addresses = update
            .addresses
            .into_iter()
            .filter(|entry| !(entry.label.trim().is_empty() && entry.address.trim().is_empty()))
            .map(|entry| SavedAddress {
                id: entry.id.unwrap_or_else(Uuid::new_v4),
                label: entry.label.trim().to_string(),
                address: entry.address.trim().to_string(),
            })
            .collect();

        self.display_name = display_name;
        self.age = age;
        self.gender = update.gender;
        self.addresses = addresses;

        Ok(())
    }
}
