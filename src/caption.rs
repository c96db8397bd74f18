//! Caption decorations: optional siblings placed immediately before their owning node.

use crate::{
	descriptor::Descriptor,
	host::HostSurface,
	slots::{ChildSlots, Placement, Slot},
};
use core::hash::Hash;
use hashbrown::{hash_map::Entry, HashMap};
use tracing::{instrument, trace, warn};

/// Tag passed to [`HostSurface::create_live_node`] for captions.
pub const CAPTION_TAG: &str = "caption";

/// The declared state a caption renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionContent {
	pub text: Option<String>,
	pub icon: Option<String>,
	pub error: Option<String>,
	pub required: bool,
	pub selected: bool,
}
impl CaptionContent {
	/// Reads the `caption`, `icon` and `error` attributes and the `required` and `selected` flags.
	#[must_use]
	pub fn from_descriptor(descriptor: &Descriptor) -> Self {
		let non_empty = |name| descriptor.string_attribute(name).filter(|value| !value.is_empty()).map(str::to_owned);
		Self {
			text: non_empty("caption"),
			icon: non_empty("icon"),
			error: non_empty("error"),
			required: descriptor.has_flag("required"),
			selected: descriptor.has_flag("selected"),
		}
	}
}

/// Decides whether a node needs a caption in the current pass.
pub trait CaptionPolicy {
	fn is_needed(&self, descriptor: &Descriptor, content: &CaptionContent) -> bool;
}

/// A caption is needed if there is something to show: text, an icon, or an indicator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCaptionPolicy;
impl CaptionPolicy for DefaultCaptionPolicy {
	fn is_needed(&self, _: &Descriptor, content: &CaptionContent) -> bool {
		content.text.is_some() || content.icon.is_some() || content.error.is_some() || content.required || content.selected
	}
}
impl<F: Fn(&Descriptor, &CaptionContent) -> bool> CaptionPolicy for F {
	fn is_needed(&self, descriptor: &Descriptor, content: &CaptionContent) -> bool {
		self(descriptor, content)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionChange {
	Unchanged,
	Created,
	Reattached,
	Refreshed,
	Dropped,
}

#[derive(Debug)]
pub(crate) struct Caption<K> {
	pub handle: K,
	pub attached: bool,
	pub content: CaptionContent,
}

/// Owner node to caption.
#[derive(Debug)]
pub(crate) struct CaptionMap<K: Hash + Eq>(HashMap<K, Caption<K>>);
impl<K: Clone + Hash + Eq + core::fmt::Debug> CaptionMap<K> {
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn get(&self, owner: &K) -> Option<&Caption<K>> {
		self.0.get(owner)
	}

	/// Detaches `owner`'s caption from `slots` (if attached) and forgets it.
	pub fn drop_caption<H: HostSurface<Handle = K>>(&mut self, host: &mut H, panel: &K, slots: &mut ChildSlots<K>, owner: &K) -> Result<bool, H::Error> {
		let caption = match self.0.get(owner) {
			Some(caption) => caption,
			None => return Ok(false),
		};
		if caption.attached {
			match slots.position_of_caption(owner) {
				Some(index) => {
					slots.remove_at(host, panel, index)?;
				}
				None => warn!("Caption of {:?} was marked attached but is missing from the child order.", owner),
			}
		}
		self.0.remove(owner);
		trace!("Dropped caption of {:?}.", owner);
		Ok(true)
	}

	/// Marks `owner`'s caption as detached after its slot was taken out by the caller.
	pub fn mark_detached(&mut self, owner: &K) {
		if let Some(caption) = self.0.get_mut(owner) {
			caption.attached = false;
		}
	}

	/// Creates, reattaches, refreshes or drops `owner`'s caption so that it exists iff `needed`.
	///
	/// A (re)attached caption is inserted at `owner`'s current index, i.e. immediately before it.
	/// If `owner` isn't a child, the caption is kept detached until it is.
	#[allow(clippy::too_many_arguments)]
	#[instrument(skip(self, host, slots, content))]
	pub fn sync<H: HostSurface<Handle = K>>(
		&mut self,
		host: &mut H,
		panel: &K,
		slots: &mut ChildSlots<K>,
		owner: &K,
		content: CaptionContent,
		needed: bool,
	) -> Result<CaptionChange, H::Error> {
		if !needed {
			return Ok(if self.drop_caption(host, panel, slots, owner)? {
				CaptionChange::Dropped
			} else {
				CaptionChange::Unchanged
			});
		}

		let mut change = CaptionChange::Refreshed;
		let caption = match self.0.entry(owner.clone()) {
			Entry::Occupied(occupied) => occupied.into_mut(),
			Entry::Vacant(vacant) => {
				change = CaptionChange::Created;
				vacant.insert(Caption {
					handle: host.create_live_node(CAPTION_TAG)?,
					attached: false,
					content: CaptionContent::default(),
				})
			}
		};
		if !caption.attached {
			if let Some(index) = slots.position_of_node(owner) {
				let slot = Slot::Caption {
					owner: owner.clone(),
					handle: caption.handle.clone(),
				};
				let placement = slots.place(host, panel, slot, index)?;
				debug_assert_eq!(placement, Placement::Inserted);
				caption.attached = true;
				if change == CaptionChange::Refreshed {
					change = CaptionChange::Reattached;
				}
			} else {
				trace!("Owner {:?} is not a child. Leaving its caption detached.", owner);
			}
		}

		host.update_caption(&caption.handle, &content)?;
		caption.content = content;
		Ok(change)
	}
}
