use crate::{config::HostProfile, descriptor::Descriptor, host::HostSurface};
use core::cell::Cell;
use tracing::trace;

/// Content area available to a layout's children, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedSpace {
	pub width: i32,
	pub height: i32,
}

/// Which sides of a layout have a margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarginInfo {
	pub top: bool,
	pub right: bool,
	pub bottom: bool,
	pub left: bool,
}
impl MarginInfo {
	#[must_use]
	pub const fn all(enabled: bool) -> Self {
		Self {
			top: enabled,
			right: enabled,
			bottom: enabled,
			left: enabled,
		}
	}

	/// Reads the `margin-top`, `margin-right`, `margin-bottom` and `margin-left` flags.
	#[must_use]
	pub fn from_descriptor(descriptor: &Descriptor) -> Self {
		Self {
			top: descriptor.has_flag("margin-top"),
			right: descriptor.has_flag("margin-right"),
			bottom: descriptor.has_flag("margin-bottom"),
			left: descriptor.has_flag("margin-left"),
		}
	}
}

/// Size bookkeeping for the outer element ⊃ margin element ⊃ panel structure.
///
/// The allocated space is computed on first query and then served from cache until [`invalidate`](`SizeNegotiator::invalidate`)d.
#[derive(Debug)]
pub struct SizeNegotiator<K> {
	outer: K,
	margin: K,
	panel: K,
	has_width: bool,
	has_height: bool,
	space: Cell<Option<AllocatedSpace>>,
}
impl<K> SizeNegotiator<K> {
	pub fn new(outer: K, margin: K, panel: K) -> Self {
		Self {
			outer,
			margin,
			panel,
			has_width: false,
			has_height: false,
			space: Cell::new(None),
		}
	}

	pub fn allocated_space<H: HostSurface<Handle = K>>(&self, host: &H, profile: HostProfile) -> AllocatedSpace {
		if let Some(space) = self.space.get() {
			return space;
		}

		let panel_width = host.offset_width(&self.panel);
		let width = if profile.box_model_quirk {
			let margins = host.offset_width(&self.margin) - panel_width;
			host.offset_width(&self.outer) - margins
		} else {
			panel_width
		};

		let margins = host.offset_height(&self.margin) - host.offset_height(&self.panel);
		let height = host.offset_height(&self.outer) - margins;

		let space = AllocatedSpace { width, height };
		trace!("Computed allocated space: {:?}", space);
		self.space.set(Some(space));
		space
	}

	pub fn invalidate(&self) {
		self.space.set(None);
	}

	/// Records a declared width. `None` and `""` mean "not set".
	pub fn set_width(&mut self, width: Option<&str>) {
		self.has_width = width.map_or(false, |width| !width.is_empty());
		self.invalidate();
	}

	/// Records a declared height. `None` and `""` mean "not set".
	pub fn set_height(&mut self, height: Option<&str>) {
		self.has_height = height.map_or(false, |height| !height.is_empty());
		self.invalidate();
	}

	#[must_use]
	pub fn has_fixed_size(&self) -> bool {
		self.has_width && self.has_height
	}

	/// Whether a layout change of `children` is absorbed by this container.
	///
	/// `false` means the container's own size may have changed, so ancestors need to re-measure.
	pub fn request_layout<'a>(&self, children: impl IntoIterator<Item = &'a K>) -> bool
	where
		K: 'a,
	{
		if self.has_fixed_size() {
			true
		} else {
			trace!("Not fixed-size; {} child(ren) may resize the container.", children.into_iter().count());
			self.invalidate();
			false
		}
	}

	pub fn outer(&self) -> &K {
		&self.outer
	}

	pub fn margin(&self) -> &K {
		&self.margin
	}

	pub fn panel(&self) -> &K {
		&self.panel
	}
}
