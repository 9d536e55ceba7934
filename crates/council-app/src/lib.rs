//! Council application layer.
//!
//! Elm-style split: `AppState` is mutated only by `update`, which returns
//! `UiEffect`s; the `Runtime` executes effects as tokio tasks and feeds
//! their results back as `UiEvent`s.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod runtime;
pub mod state;
pub mod update;

pub use effects::UiEffect;
pub use events::{Command, UiEvent};
pub use features::{conversations, rerun, restart, session};
pub use runtime::Runtime;
pub use state::{AppState, Status, StatusLevel};
pub use update::update;
