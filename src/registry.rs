//! Component registry loading.

pub use trellis_registry::*;
