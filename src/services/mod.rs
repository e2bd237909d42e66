//! Service layer
//!
//! The shortener engine and the background expiration sweeper. Both are
//! plain values wired together at startup and shared by reference.

mod shortener;
mod sweeper;

pub use shortener::*;
pub use sweeper::*;
