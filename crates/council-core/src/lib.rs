//! Council client core (data model, event codec, stage reducer, transport, config).

pub mod client;
pub mod config;
pub mod conversation;
pub mod events;
pub mod logging;
pub mod reducer;
