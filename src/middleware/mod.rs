pub mod auth;

pub use auth::{CurrentIdentity, TabId};
