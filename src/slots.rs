use crate::host::HostSurface;
use tracing::trace;

/// One position in a layout's live child order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<K> {
	Node(K),
	/// The caption decoration `handle` owned by the plain node `owner`.
	Caption { owner: K, handle: K },
}
impl<K> Slot<K> {
	/// The host handle occupying this slot.
	pub fn handle(&self) -> &K {
		match self {
			Slot::Node(handle) | Slot::Caption { handle, .. } => handle,
		}
	}

	pub fn node(&self) -> Option<&K> {
		match self {
			Slot::Node(node) => Some(node),
			Slot::Caption { .. } => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
	Unchanged,
	Moved,
	Inserted,
}

/// Mirror of the panel's children, kept in sync with the host by going through it for each change.
#[derive(Debug)]
pub(crate) struct ChildSlots<K> {
	slots: Vec<Slot<K>>,
}
impl<K: Clone + Eq> ChildSlots<K> {
	pub fn new() -> Self {
		Self { slots: Vec::new() }
	}

	pub fn as_slice(&self) -> &[Slot<K>] {
		&self.slots
	}

	pub fn nodes(&self) -> impl Iterator<Item = &K> {
		self.slots.iter().filter_map(Slot::node)
	}

	pub fn position_of_node(&self, node: &K) -> Option<usize> {
		self.slots.iter().position(|slot| matches!(slot, Slot::Node(n) if n == node))
	}

	pub fn position_of_caption(&self, owner: &K) -> Option<usize> {
		self.slots.iter().position(|slot| matches!(slot, Slot::Caption { owner: o, .. } if o == owner))
	}

	fn position(&self, slot: &Slot<K>) -> Option<usize> {
		match slot {
			Slot::Node(node) => self.position_of_node(node),
			Slot::Caption { owner, .. } => self.position_of_caption(owner),
		}
	}

	/// Puts `slot` at `index`, touching the host only if it isn't there already.
	pub fn place<H: HostSurface<Handle = K>>(&mut self, host: &mut H, panel: &K, slot: Slot<K>, index: usize) -> Result<Placement, H::Error> {
		match self.position(&slot) {
			Some(current) if current == index => Ok(Placement::Unchanged),
			Some(current) => {
				host.insert_at(panel, slot.handle(), index)?;
				let slot = self.slots.remove(current);
				trace!("Moved slot from {} to {}.", current, index);
				let index = index.min(self.slots.len());
				self.slots.insert(index, slot);
				Ok(Placement::Moved)
			}
			None => {
				host.insert_at(panel, slot.handle(), index)?;
				trace!("Inserted slot at {}.", index);
				let index = index.min(self.slots.len());
				self.slots.insert(index, slot);
				Ok(Placement::Inserted)
			}
		}
	}

	/// Removes the slot at `index` from the host and the mirror.
	pub fn remove_at<H: HostSurface<Handle = K>>(&mut self, host: &mut H, panel: &K, index: usize) -> Result<Slot<K>, H::Error> {
		host.remove_child(panel, self.slots[index].handle())?;
		Ok(self.slots.remove(index))
	}
}
