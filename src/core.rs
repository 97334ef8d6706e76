//! Component metadata, instance proxies and host capabilities.
//!
//! ```rust
//! use trellis::core::meta::{ComponentMeta, FieldKind};
//!
//! let meta = ComponentMeta::new("ion-tabs").with_states(["selectedTab"]);
//! assert_eq!(meta.field_kind("selectedTab"), FieldKind::Reactive);
//! ```

pub use trellis_core::*;
