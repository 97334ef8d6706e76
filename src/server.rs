//! Server-side hydration.
//!
//! See [`create_renderer`] for the entry point.

pub use trellis_server::*;
