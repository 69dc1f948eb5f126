// This module re-exports important pieces for convenience,
// so we can "use crate::models::*" easily.
pub mod payloads;
pub mod token;
pub mod user;

pub use payloads::*;
pub use token::TokenPair;
pub use user::User;
