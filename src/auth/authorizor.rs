use oso::{Oso, PolarClass};

use crate::auth::{Account, User};
use crate::error::Error;

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(User::get_polar_class())?;
    o.register_class(Account::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[test]
fn owner_can_manage_own_account() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let owner = User::new(Uuid::new_v4());
    let account = Account::new(owner.id.clone());

    let result = authorizor.is_allowed(owner.clone(), "read", account.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(owner.clone(), "update", account.clone());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn stranger_cannot_touch_account() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let stranger = User::new(Uuid::new_v4());
    let account = Account::new(Uuid::new_v4());

    let result = authorizor.is_allowed(stranger.clone(), "read", account.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(stranger.clone(), "update", account.clone());
    assert_eq!(result.unwrap(), false);
}

#[test]
fn system_role_test() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let system = User::new_system_user();
    let account = Account::new(Uuid::new_v4());

    let result = authorizor.is_allowed(system.clone(), "read", account.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(system.clone(), "update", account.clone());
    assert_eq!(result.unwrap(), true);
}
