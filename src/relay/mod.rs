//! Anonymous relay between senders and the owner.
//!
//! No state is kept between events: the sender id travels with the copied
//! message as a ticket and comes back when the owner replies to it.

pub mod classify;
pub mod engine;
pub mod identity;
pub mod route;

pub use engine::RelayEngine;
