//! Trellis Registry - component registry loading
//!
//! The build emits one registry file per app namespace holding every
//! component as a compact positional record. This crate normalizes those
//! records into [`ComponentMeta`](trellis_core::meta::ComponentMeta) values
//! and collects them into a [`ComponentRegistry`].
//!
//! ```
//! use trellis_registry::parse_registry_json;
//!
//! let registry = parse_registry_json(
//! 	r#"{"components": [["ion-tabs", "b1", 0, [["selectedTab", 5]]]]}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(registry.get("ion-tabs").unwrap().states(), ["selectedTab"]);
//! ```

pub mod data_parse;
pub mod error;
pub mod loader;
pub mod registry;

pub use data_parse::{parse_component_meta, parse_component_registry};
pub use error::{RecordError, RegistryError, RegistryResult};
pub use loader::{load_registry, parse_registry_json};
pub use registry::ComponentRegistry;
