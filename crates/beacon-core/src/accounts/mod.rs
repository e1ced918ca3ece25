//! Privileged account management

pub mod manager;
pub mod traits;

pub use manager::AccountManager;
pub use traits::{IdentityProvider, ProfileStore};
