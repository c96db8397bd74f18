use crate::descriptor::Identity;
use core::hash::Hash;
use hashbrown::{hash_map::Entry, HashMap};
use tracing::{trace, warn};

/// Association between live nodes and descriptor identities.
///
/// Implementations must keep the association one-to-one: at most one handle per identity and vice versa.
pub trait IdentityRegistry<K> {
	fn register(&mut self, handle: K, identity: Identity);

	/// Returns whether `handle` was registered. Unregistering an unknown handle is a no-op.
	fn unregister(&mut self, handle: &K) -> bool;

	fn is_registered(&self, handle: &K) -> bool;
	fn lookup(&self, identity: &Identity) -> Option<K>;
	fn identity_of(&self, handle: &K) -> Option<Identity>;
}

/// Bidirectional [`IdentityRegistry`] over two hash maps.
#[derive(Debug)]
pub struct Registry<K: Hash + Eq> {
	by_identity: HashMap<Identity, K>,
	by_handle: HashMap<K, Identity>,
}
impl<K: Hash + Eq> Default for Registry<K> {
	fn default() -> Self {
		Self::new()
	}
}
impl<K: Hash + Eq> Registry<K> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			by_identity: HashMap::new(),
			by_handle: HashMap::new(),
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		debug_assert_eq!(self.by_identity.len(), self.by_handle.len());
		self.by_handle.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn identities(&self) -> impl Iterator<Item = &Identity> {
		self.by_identity.keys()
	}
}
impl<K: Clone + Hash + Eq + core::fmt::Debug> IdentityRegistry<K> for Registry<K> {
	fn register(&mut self, handle: K, identity: Identity) {
		if let Some(previous) = self.by_handle.remove(&handle) {
			trace!("Re-registering {:?}, dropping previous identity.", handle);
			self.by_identity.remove(&previous);
		}
		match self.by_identity.entry(identity.clone()) {
			Entry::Occupied(mut occupied) => {
				warn!("Identity was already bound to {:?}. Evicting it in favour of {:?}.", occupied.get(), handle);
				let evicted = occupied.insert(handle.clone());
				self.by_handle.remove(&evicted);
			}
			Entry::Vacant(vacant) => {
				vacant.insert(handle.clone());
			}
		}
		self.by_handle.insert(handle, identity);
	}

	fn unregister(&mut self, handle: &K) -> bool {
		match self.by_handle.remove(handle) {
			Some(identity) => {
				self.by_identity.remove(&identity);
				true
			}
			None => false,
		}
	}

	fn is_registered(&self, handle: &K) -> bool {
		self.by_handle.contains_key(handle)
	}

	fn lookup(&self, identity: &Identity) -> Option<K> {
		self.by_identity.get(identity).cloned()
	}

	fn identity_of(&self, handle: &K) -> Option<Identity> {
		self.by_handle.get(handle).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::{IdentityRegistry, Registry};
	use crate::descriptor::Identity;

	#[test]
	fn register_and_lookup() {
		let mut registry = Registry::new();
		registry.register(1_u32, Identity::new("a"));
		assert_eq!(registry.lookup(&Identity::new("a")), Some(1));
		assert_eq!(registry.identity_of(&1), Some(Identity::new("a")));
		assert!(registry.is_registered(&1));
	}

	#[test]
	fn unregister_unknown_is_noop() {
		let mut registry = Registry::<u32>::new();
		assert!(!registry.unregister(&7));
		assert!(registry.is_empty());
	}

	#[test]
	fn identity_is_bound_to_one_handle() {
		let mut registry = Registry::new();
		registry.register(1_u32, Identity::new("a"));
		registry.register(2_u32, Identity::new("a"));
		assert_eq!(registry.lookup(&Identity::new("a")), Some(2));
		assert!(!registry.is_registered(&1));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn handle_is_bound_to_one_identity() {
		let mut registry = Registry::new();
		registry.register(1_u32, Identity::new("a"));
		registry.register(1_u32, Identity::new("b"));
		assert_eq!(registry.lookup(&Identity::new("a")), None);
		assert_eq!(registry.lookup(&Identity::new("b")), Some(1));
		assert_eq!(registry.len(), 1);
	}
}
