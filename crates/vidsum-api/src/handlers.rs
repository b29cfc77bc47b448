//! Request handlers.

pub mod health;
pub mod summaries;
pub mod videos;

pub use health::*;
pub use summaries::*;
pub use videos::*;
