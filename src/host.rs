use crate::{caption::CaptionContent, descriptor::Descriptor};
use core::{fmt::Debug, hash::Hash};

/// The rendering surface a [`FlowLayout`](`crate::flow::FlowLayout`) mirrors its child order onto.
///
/// # Positional insertion
///
/// [`insert_at`](`HostSurface::insert_at`) moves `child` if it already has a parent (this one or another).
/// `index` is interpreted **after** `child` was taken out of its current position and is clamped to the child count.
pub trait HostSurface {
	/// Opaque reference to a live node.
	type Handle: Clone + Eq + Hash + Debug;
	type Error: Debug;

	fn create_live_node(&mut self, tag: &str) -> Result<Self::Handle, Self::Error>;
	fn insert_at(&mut self, parent: &Self::Handle, child: &Self::Handle, index: usize) -> Result<(), Self::Error>;
	fn remove_child(&mut self, parent: &Self::Handle, child: &Self::Handle) -> Result<(), Self::Error>;

	fn offset_width(&self, node: &Self::Handle) -> i32;
	fn offset_height(&self, node: &Self::Handle) -> i32;

	/// Sets one property on `node`'s inline style surface.
	///
	/// `name` is in the surface's camel-case form, e.g. `marginTop`. An empty `value` clears the property.
	fn set_style_property(&mut self, node: &Self::Handle, name: &str, value: &str) -> Result<(), Self::Error>;

	fn set_class(&mut self, node: &Self::Handle, class: &str, enabled: bool) -> Result<(), Self::Error>;

	/// The live node's own update contract, used to propagate non-cached descriptors into its content.
	///
	/// For nested containers, this runs before the layout reconciles `descriptor.children` into the nested panel.
	/// Errors are not caught by the reconciler.
	fn update_content(&mut self, node: &Self::Handle, descriptor: &Descriptor) -> Result<(), Self::Error>;

	fn update_caption(&mut self, caption: &Self::Handle, content: &CaptionContent) -> Result<(), Self::Error>;

	/// Called for each child when its container's declared size changed outside of a reconciliation pass.
	fn handle_relative_size(&mut self, node: &Self::Handle);
}
