//! Instance proxies.
//!
//! A component instance is a small slot table. Every slot starts out as a
//! stored value; [`install_proxy`] turns the slots named in
//! [`ComponentMeta::states_meta`] into reactive accessors that read and write
//! the host element's [`StateStore`].
//!
//! The host element owns both the store and the instance. Accessors only keep
//! weak references, so a reactive read after the element is gone yields
//! `None` instead of keeping the element alive.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use trellis_core::meta::{ComponentMeta, FieldKind};
//! use trellis_core::proxy::{HostElement, Instance, NoopPlatform, install_proxy};
//!
//! let meta = ComponentMeta::new("my-counter").with_states(["count"]);
//! let elm = HostElement::new("my-counter");
//! let mut instance = Instance::new()
//!     .with_field("count", json!(1))
//!     .with_field("label", json!("clicks"));
//!
//! install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);
//!
//! instance.set("count", json!(2));
//! assert_eq!(elm.state("count"), Some(json!(2)));
//! assert_eq!(instance.descriptor("label").unwrap().kind, FieldKind::Stored);
//! ```

use crate::meta::{ComponentMeta, FieldKind};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for host element instance ids.
static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Platform hooks invoked by reactive accessors.
pub trait PlatformApi {
	/// Called after a reactive field of `elm`'s instance was written.
	///
	/// Implementations must not borrow the element's instance, the write
	/// that triggered the call may still hold it.
	fn queue_update(&self, elm: &HostElement);
}

/// Shared handle to a platform.
pub type PlatformRef = Rc<dyn PlatformApi>;

/// Platform that ignores update requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPlatform;

impl NoopPlatform {
	/// Returns a shared no-op platform.
	pub fn shared() -> PlatformRef {
		Rc::new(Self)
	}
}

impl PlatformApi for NoopPlatform {
	fn queue_update(&self, _elm: &HostElement) {}
}

/// Internal state container of a host element.
#[derive(Debug, Default)]
pub struct StateStore {
	values: RefCell<HashMap<String, Value>>,
}

impl StateStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current value under `key`.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.values.borrow().get(key).cloned()
	}

	/// Stores `value` under `key`, returning the previous value.
	pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
		self.values.borrow_mut().insert(key.into(), value)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.values.borrow().contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.values.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.borrow().is_empty()
	}
}

/// The outward-facing element of one component instance.
pub struct HostElement {
	tag_name: String,
	id: u64,
	store: Rc<StateStore>,
	properties: RefCell<HashMap<String, Value>>,
	instance: RefCell<Option<Instance>>,
}

impl HostElement {
	/// Creates a new element with an empty state store.
	pub fn new(tag_name: impl Into<String>) -> Rc<Self> {
		Rc::new(Self {
			tag_name: tag_name.into(),
			id: INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed),
			store: Rc::new(StateStore::new()),
			properties: RefCell::new(HashMap::new()),
			instance: RefCell::new(None),
		})
	}

	pub fn tag_name(&self) -> &str {
		&self.tag_name
	}

	/// Process-unique instance id.
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Identity of this element as a JSON value (`{"tagName", "id"}`).
	pub fn identity(&self) -> Value {
		serde_json::json!({ "tagName": self.tag_name, "id": self.id })
	}

	/// The element's internal state store.
	pub fn state_store(&self) -> &StateStore {
		&self.store
	}

	/// Reads `key` from the internal state store.
	pub fn state(&self, key: &str) -> Option<Value> {
		self.store.get(key)
	}

	/// Returns an own property of the element.
	pub fn property(&self, name: &str) -> Option<Value> {
		self.properties.borrow().get(name).cloned()
	}

	/// Sets an own property of the element.
	pub fn set_property(&self, name: impl Into<String>, value: Value) {
		self.properties.borrow_mut().insert(name.into(), value);
	}

	/// Describes the element's own property `name`.
	///
	/// Elements never carry accessors; state lives in the store and accessors
	/// live on the instance.
	pub fn own_descriptor(&self, name: &str) -> Option<FieldDescriptor> {
		self.property(name).map(FieldDescriptor::stored)
	}

	/// Gives ownership of `instance` to this element.
	///
	/// The instance's host back-reference is pointed at this element.
	pub fn attach_instance(self: &Rc<Self>, mut instance: Instance) {
		instance.host = Rc::downgrade(self);
		*self.instance.borrow_mut() = Some(instance);
	}

	/// Detaches and returns the owned instance.
	pub fn take_instance(&self) -> Option<Instance> {
		self.instance.borrow_mut().take()
	}

	pub fn has_instance(&self) -> bool {
		self.instance.borrow().is_some()
	}

	/// Runs `f` with a shared borrow of the owned instance.
	pub fn with_instance<R>(&self, f: impl FnOnce(&Instance) -> R) -> Option<R> {
		self.instance.borrow().as_ref().map(f)
	}

	/// Runs `f` with a mutable borrow of the owned instance.
	pub fn with_instance_mut<R>(&self, f: impl FnOnce(&mut Instance) -> R) -> Option<R> {
		self.instance.borrow_mut().as_mut().map(f)
	}
}

impl fmt::Debug for HostElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HostElement")
			.field("tag_name", &self.tag_name)
			.field("id", &self.id)
			.field("state", &self.store)
			.field("has_instance", &self.has_instance())
			.finish()
	}
}

/// Index of a field in an instance's slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

impl FieldId {
	pub fn index(self) -> usize {
		self.0
	}
}

/// Description of one field, analogous to a property descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
	pub kind: FieldKind,
	/// The stored value. Always `None` for accessors.
	pub value: Option<Value>,
}

impl FieldDescriptor {
	fn stored(value: Value) -> Self {
		Self {
			kind: FieldKind::Stored,
			value: Some(value),
		}
	}

	fn accessor() -> Self {
		Self {
			kind: FieldKind::Reactive,
			value: None,
		}
	}

	/// Returns `true` if the field has get/set accessors.
	pub fn is_accessor(&self) -> bool {
		self.kind == FieldKind::Reactive
	}
}

struct ReactiveCell {
	store: Weak<StateStore>,
	host: Weak<HostElement>,
	platform: PlatformRef,
}

enum Storage {
	Stored(Value),
	Reactive(ReactiveCell),
}

struct Slot {
	name: String,
	storage: Storage,
}

/// A component instance: an indexed table of fields.
#[derive(Default)]
pub struct Instance {
	slots: Vec<Slot>,
	index: HashMap<String, FieldId>,
	host: Weak<HostElement>,
}

impl Instance {
	/// Creates an instance without fields.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a stored field (builder style).
	pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
		self.set_stored(name, value);
		self
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Field names in definition order.
	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.slots.iter().map(|s| s.name.as_str())
	}

	/// Looks up the slot id of `name`.
	pub fn field_id(&self, name: &str) -> Option<FieldId> {
		self.index.get(name).copied()
	}

	/// The host element back-reference, if the element is still alive.
	pub fn host(&self) -> Option<Rc<HostElement>> {
		self.host.upgrade()
	}

	/// Reads field `name`.
	pub fn get(&self, name: &str) -> Option<Value> {
		self.field_id(name).and_then(|id| self.get_by_id(id))
	}

	/// Reads the field at `id`.
	pub fn get_by_id(&self, id: FieldId) -> Option<Value> {
		let slot = self.slots.get(id.0)?;
		match &slot.storage {
			Storage::Stored(value) => Some(value.clone()),
			Storage::Reactive(cell) => cell.store.upgrade()?.get(&slot.name),
		}
	}

	/// Writes field `name`, creating a stored field if it does not exist.
	///
	/// Writes to reactive fields go to the host element's state store and
	/// then notify the platform.
	pub fn set(&mut self, name: &str, value: Value) {
		match self.field_id(name) {
			Some(id) => self.set_by_id(id, value),
			None => {
				self.set_stored(name, value);
			}
		}
	}

	/// Writes the field at `id`. Unknown ids are ignored.
	pub fn set_by_id(&mut self, id: FieldId, value: Value) {
		let Some(slot) = self.slots.get_mut(id.0) else {
			return;
		};
		match &mut slot.storage {
			Storage::Stored(current) => *current = value,
			Storage::Reactive(cell) => {
				let Some(store) = cell.store.upgrade() else {
					tracing::debug!(field = %slot.name, "write to reactive field of dropped element");
					return;
				};
				store.set(slot.name.clone(), value);
				if let Some(host) = cell.host.upgrade() {
					cell.platform.queue_update(&host);
				}
			}
		}
	}

	/// Describes field `name`.
	pub fn descriptor(&self, name: &str) -> Option<FieldDescriptor> {
		let slot = &self.slots[self.field_id(name)?.0];
		Some(match &slot.storage {
			Storage::Stored(value) => FieldDescriptor::stored(value.clone()),
			Storage::Reactive(_) => FieldDescriptor::accessor(),
		})
	}

	fn set_stored(&mut self, name: impl Into<String>, value: Value) -> FieldId {
		let name = name.into();
		if let Some(id) = self.field_id(&name) {
			self.slots[id.0].storage = Storage::Stored(value);
			return id;
		}
		let id = FieldId(self.slots.len());
		self.index.insert(name.clone(), id);
		self.slots.push(Slot {
			name,
			storage: Storage::Stored(value),
		});
		id
	}

	fn make_reactive(&mut self, name: &str, cell: ReactiveCell) {
		match self.field_id(name) {
			Some(id) => self.slots[id.0].storage = Storage::Reactive(cell),
			None => {
				let id = FieldId(self.slots.len());
				self.index.insert(name.to_string(), id);
				self.slots.push(Slot {
					name: name.to_string(),
					storage: Storage::Reactive(cell),
				});
			}
		}
	}

	fn is_reactive(&self, name: &str) -> bool {
		self.field_id(name)
			.is_some_and(|id| matches!(self.slots[id.0].storage, Storage::Reactive(_)))
	}

	fn stored_value(&self, name: &str) -> Option<&Value> {
		let slot = &self.slots[self.field_id(name)?.0];
		match &slot.storage {
			Storage::Stored(value) => Some(value),
			Storage::Reactive(_) => None,
		}
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for slot in &self.slots {
			match &slot.storage {
				Storage::Stored(value) => map.entry(&slot.name, value),
				Storage::Reactive(_) => map.entry(&slot.name, &"<reactive>"),
			};
		}
		map.finish()
	}
}

/// Installs reactive accessors on `instance` for every field in
/// `meta.states_meta`.
///
/// A field's stored value is copied into the element's state store before its
/// slot becomes an accessor, so the first read returns the same value as
/// before installation. Fields that are not declared as state keep their
/// stored value. Installing twice is a no-op for fields that are already
/// reactive.
pub fn install_proxy(
	platform: &PlatformRef,
	elm: &Rc<HostElement>,
	instance: &mut Instance,
	meta: &ComponentMeta,
) {
	instance.host = Rc::downgrade(elm);

	// a member also declared as state stays reactive
	if let Some(member) = &meta.host_element_member
		&& !meta.states().contains(member)
	{
		instance.set_stored(member.clone(), elm.identity());
	}

	let mut installed = 0usize;
	for field in meta.states() {
		if instance.is_reactive(field) {
			continue;
		}
		if let Some(current) = instance.stored_value(field) {
			elm.store.set(field.clone(), current.clone());
		}
		instance.make_reactive(
			field,
			ReactiveCell {
				store: Rc::downgrade(&elm.store),
				host: Rc::downgrade(elm),
				platform: Rc::clone(platform),
			},
		);
		installed += 1;
	}

	tracing::trace!(tag = %elm.tag_name(), installed, "instance proxies installed");
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::cell::Cell;

	/// Platform counting update requests.
	#[derive(Default)]
	struct CountingPlatform {
		updates: Cell<usize>,
	}

	impl PlatformApi for CountingPlatform {
		fn queue_update(&self, _elm: &HostElement) {
			self.updates.set(self.updates.get() + 1);
		}
	}

	#[fixture]
	fn elm() -> Rc<HostElement> {
		HostElement::new("ion-cmp")
	}

	#[fixture]
	fn instance() -> Instance {
		Instance::new().with_field("state", json!("value"))
	}

	#[rstest]
	fn test_state_is_not_set_on_element(elm: Rc<HostElement>, mut instance: Instance) {
		// Arrange
		let meta = ComponentMeta::new("ion-cmp").with_states(["state"]);

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		assert!(elm.own_descriptor("state").is_none());
	}

	#[rstest]
	fn test_state_accessor_is_set_on_instance(elm: Rc<HostElement>, mut instance: Instance) {
		// Arrange
		let meta = ComponentMeta::new("ion-cmp").with_states(["state"]);

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		let desc = instance.descriptor("state").unwrap();
		assert!(desc.is_accessor());
		assert!(desc.value.is_none());
		assert_eq!(instance.get("state"), Some(json!("value")));
	}

	#[rstest]
	fn test_no_states_meta_keeps_plain_value(elm: Rc<HostElement>, mut instance: Instance) {
		// Arrange
		let meta = ComponentMeta::new("ion-cmp");

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		let desc = instance.descriptor("state").unwrap();
		assert_eq!(desc.kind, FieldKind::Stored);
		assert_eq!(desc.value, Some(json!("value")));
		assert!(elm.state_store().is_empty());
	}

	#[rstest]
	fn test_undeclared_field_stays_stored_even_if_declared_elsewhere(elm: Rc<HostElement>) {
		// Arrange
		let mut instance = Instance::new()
			.with_field("state", json!(1))
			.with_field("other", json!(2));
		let other_meta = ComponentMeta::new("other-cmp").with_states(["other"]);
		let meta = ComponentMeta::new("ion-cmp")
			.with_states(["state"])
			.with_props(["other"]);
		install_proxy(
			&NoopPlatform::shared(),
			&HostElement::new("other-cmp"),
			&mut Instance::new(),
			&other_meta,
		);

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		assert!(!instance.descriptor("other").unwrap().is_accessor());
		assert_eq!(instance.get("other"), Some(json!(2)));
	}

	#[rstest]
	fn test_store_value_is_overwritten_by_instance_value(
		elm: Rc<HostElement>,
		mut instance: Instance,
	) {
		// Arrange
		elm.state_store().set("state", json!("stale"));
		let meta = ComponentMeta::new("ion-cmp").with_states(["state"]);

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		assert_eq!(instance.get("state"), Some(json!("value")));
		assert_eq!(elm.state("state"), Some(json!("value")));
	}

	#[rstest]
	fn test_state_declared_but_missing_reads_from_store(elm: Rc<HostElement>) {
		// Arrange
		elm.state_store().set("restored", json!(42));
		let mut instance = Instance::new();
		let meta = ComponentMeta::new("ion-cmp").with_states(["restored", "absent"]);

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		assert_eq!(instance.get("restored"), Some(json!(42)));
		assert_eq!(instance.get("absent"), None);
		assert!(instance.descriptor("absent").unwrap().is_accessor());
	}

	#[rstest]
	fn test_reactive_write_goes_to_store_and_queues_update(
		elm: Rc<HostElement>,
		mut instance: Instance,
	) {
		// Arrange
		let counting = Rc::new(CountingPlatform::default());
		let platform: PlatformRef = counting.clone();
		let meta = ComponentMeta::new("ion-cmp").with_states(["state"]);
		install_proxy(&platform, &elm, &mut instance, &meta);

		// Act
		instance.set("state", json!("next"));

		// Assert
		assert_eq!(elm.state("state"), Some(json!("next")));
		assert_eq!(instance.get("state"), Some(json!("next")));
		assert_eq!(counting.updates.get(), 1);
	}

	#[rstest]
	fn test_stored_write_does_not_queue_update(elm: Rc<HostElement>, mut instance: Instance) {
		let counting = Rc::new(CountingPlatform::default());
		let platform: PlatformRef = counting.clone();
		install_proxy(&platform, &elm, &mut instance, &ComponentMeta::new("ion-cmp"));

		instance.set("state", json!("next"));

		assert_eq!(instance.get("state"), Some(json!("next")));
		assert_eq!(counting.updates.get(), 0);
	}

	#[rstest]
	fn test_install_twice_keeps_current_value(elm: Rc<HostElement>, mut instance: Instance) {
		// Arrange
		let meta = ComponentMeta::new("ion-cmp").with_states(["state"]);
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);
		instance.set("state", json!("changed"));

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		assert_eq!(instance.get("state"), Some(json!("changed")));
	}

	#[rstest]
	fn test_host_back_reference_and_member(elm: Rc<HostElement>, mut instance: Instance) {
		// Arrange
		let meta = ComponentMeta::new("ion-cmp").with_host_element_member("el");

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		assert!(Rc::ptr_eq(&instance.host().unwrap(), &elm));
		let member = instance.descriptor("el").unwrap();
		assert_eq!(member.kind, FieldKind::Stored);
		assert_eq!(member.value, Some(elm.identity()));
	}

	#[rstest]
	fn test_member_declared_as_state_survives_reinstall(
		elm: Rc<HostElement>,
		mut instance: Instance,
	) {
		// Arrange
		let meta = ComponentMeta::new("ion-cmp")
			.with_states(["state"])
			.with_host_element_member("state");
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);
		instance.set("state", json!("updated"));

		// Act
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Assert
		assert!(instance.descriptor("state").unwrap().is_accessor());
		assert_eq!(instance.get("state"), Some(json!("updated")));
		assert_eq!(elm.state("state"), Some(json!("updated")));
	}

	#[rstest]
	fn test_element_owns_attached_instance(elm: Rc<HostElement>, mut instance: Instance) {
		// Arrange
		let meta = ComponentMeta::new("ion-cmp").with_states(["state"]);
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Act
		elm.attach_instance(instance);
		elm.with_instance_mut(|i| i.set("state", json!("via element")));

		// Assert
		assert_eq!(elm.state("state"), Some(json!("via element")));
		assert_eq!(
			elm.with_instance(|i| i.get("state")).flatten(),
			Some(json!("via element"))
		);
	}

	#[rstest]
	fn test_accessor_after_element_dropped_reads_none(mut instance: Instance) {
		// Arrange
		let elm = HostElement::new("ion-cmp");
		let meta = ComponentMeta::new("ion-cmp").with_states(["state"]);
		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		// Act
		drop(elm);

		// Assert
		assert_eq!(instance.get("state"), None);
		assert!(instance.host().is_none());
	}

	#[rstest]
	fn test_field_ids_are_stable(elm: Rc<HostElement>) {
		let mut instance = Instance::new()
			.with_field("a", json!(1))
			.with_field("b", json!(2));
		let before = instance.field_id("b").unwrap();
		let meta = ComponentMeta::new("ion-cmp").with_states(["b"]);

		install_proxy(&NoopPlatform::shared(), &elm, &mut instance, &meta);

		assert_eq!(instance.field_id("b"), Some(before));
		assert_eq!(instance.get_by_id(before), Some(json!(2)));
		assert_eq!(instance.field_names().collect::<Vec<_>>(), ["a", "b"]);
	}

	#[rstest]
	fn test_own_property_is_plain(elm: Rc<HostElement>) {
		elm.set_property("mode", json!("ios"));

		let desc = elm.own_descriptor("mode").unwrap();

		assert_eq!(desc.kind, FieldKind::Stored);
		assert_eq!(desc.value, Some(json!("ios")));
	}
}
