//! Trellis Core - component metadata and instance proxies
//!
//! This crate holds the passive pieces every other trellis crate builds on:
//!
//! - [`meta`]: component metadata (tag name, declared state and prop fields)
//! - [`proxy`]: host elements, instances and the proxy installer that turns
//!   declared state fields into reactive accessors
//! - [`diagnostic`]: the uniform error-reporting record of the pipeline
//! - [`sys`]: file system and URL capabilities supplied by the host
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use trellis_core::meta::ComponentMeta;
//! use trellis_core::proxy::{HostElement, Instance, NoopPlatform, install_proxy};
//!
//! let meta = ComponentMeta::new("ion-tabs").with_states(["selectedTab"]);
//! let elm = HostElement::new("ion-tabs");
//! let mut instance = Instance::new().with_field("selectedTab", json!(0));
//!
//! install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);
//!
//! assert_eq!(instance.get("selectedTab"), Some(json!(0)));
//! assert_eq!(elm.state("selectedTab"), Some(json!(0)));
//! ```

pub mod diagnostic;
pub mod meta;
pub mod proxy;
pub mod sys;

pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticType};
pub use meta::{
	BundleIds, ComponentMeta, Encapsulation, FieldKind, FieldSpec, ListenerMeta, PropType,
};
pub use proxy::{
	FieldDescriptor, FieldId, HostElement, Instance, NoopPlatform, PlatformApi, PlatformRef,
	StateStore, install_proxy,
};
pub use sys::{
	FileSystem, FsError, MemoryFileSystem, OsFileSystem, Sys, UrlError, UrlParts, UrlSys,
	WhatwgUrlSys,
};
