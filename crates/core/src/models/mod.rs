//! Data models for SpaceRoom chat

mod message;
mod user;

pub use message::*;
pub use user::*;
