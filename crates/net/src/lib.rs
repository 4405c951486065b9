//! SpaceRoom Push Channel Library
//!
//! Delivers chat messages for one conversation from the SpaceRoom push
//! server.
//!
//! # Architecture
//!
//! - **Protocol**: Length-prefixed JSON push events
//! - **Client**: Subscribes to a conversation and forwards its events
//!
//! # Usage
//!
//! ```ignore
//! let mut client = PushClient::connect(addr, "course-42", UserId::from("u1")).await?;
//!
//! while let Some(event) = client.next_event().await {
//!     match event {
//!         SourceEvent::Message(record) => { session.receive(record); }
//!         SourceEvent::Presence { user_id, presence } => {
//!             directory.set_presence(&user_id, presence);
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod client;
pub mod error;
mod frame;
pub mod protocol;

pub use client::{ConnectionState, PushClient, SourceEvent};
pub use error::{Error, Result};
pub use frame::{read_frame, write_frame, MAX_FRAME_SIZE};
pub use protocol::PushEvent;
