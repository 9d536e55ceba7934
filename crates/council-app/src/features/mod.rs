//! Feature slices (state/update per slice).

pub mod conversations;
pub mod rerun;
pub mod restart;
pub mod session;
