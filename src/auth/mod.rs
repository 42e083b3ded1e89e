mod account;
pub mod authorizor;
mod user;

pub use account::Account;
pub use user::{User, USER_ID_HEADER};
