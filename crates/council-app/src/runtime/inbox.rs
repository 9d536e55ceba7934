//! Inbox channel types.
//!
//! Effect handlers send their results here; the runtime drains the inbox
//! and feeds each event through the reducer.

use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;
