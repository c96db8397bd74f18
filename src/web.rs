//! [`HostSurface`] over the browser DOM.

use crate::{caption::CaptionContent, descriptor::{AttributeValue, Descriptor}, host::HostSurface};
use core::{
	hash::{Hash, Hasher},
	sync::atomic::{AtomicU32, Ordering},
};
use thiserror::Error;
use tracing::{instrument, trace};
use wasm_bindgen::{JsCast, JsValue};

/// Failed DOM call, with the thrown value.
#[derive(Debug, Error)]
#[error("DOM operation failed: {0:?}")]
pub struct WebHostError(pub JsValue);
impl From<JsValue> for WebHostError {
	fn from(value: JsValue) -> Self {
		Self(value)
	}
}

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

/// A [`web_sys::Element`] with a process-unique key, since elements can't be hashed directly.
#[derive(Debug, Clone)]
pub struct WebNode {
	id: u32,
	element: web_sys::Element,
}
impl WebNode {
	/// Wraps an element that wasn't created through [`WebHost`], e.g. the mount point.
	///
	/// Wrapping the same element twice yields two distinct handles.
	#[must_use]
	pub fn adopt(element: web_sys::Element) -> Self {
		Self {
			id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
			element,
		}
	}

	#[must_use]
	pub fn element(&self) -> &web_sys::Element {
		&self.element
	}
}
impl PartialEq for WebNode {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}
impl Eq for WebNode {}
impl Hash for WebNode {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

#[derive(Debug)]
pub struct WebHost {
	document: web_sys::Document,
}
impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	/// Uses the owner document of `element`.
	#[must_use]
	pub fn for_element(element: &web_sys::Element) -> Option<Self> {
		element.owner_document().map(Self::new)
	}

	fn html(node: &WebNode) -> Option<&web_sys::HtmlElement> {
		node.element.dyn_ref::<web_sys::HtmlElement>()
	}
}
impl HostSurface for WebHost {
	type Handle = WebNode;
	type Error = WebHostError;

	fn create_live_node(&mut self, tag: &str) -> Result<WebNode, WebHostError> {
		Ok(WebNode::adopt(self.document.create_element(tag)?))
	}

	#[instrument(skip(self))]
	fn insert_at(&mut self, parent: &WebNode, child: &WebNode, index: usize) -> Result<(), WebHostError> {
		let parent_node: &web_sys::Node = parent.element.as_ref();
		let child_node: &web_sys::Node = child.element.as_ref();
		if child_node.parent_node().as_ref() == Some(parent_node) {
			parent_node.remove_child(child_node)?;
		}
		#[allow(clippy::cast_possible_truncation)]
		let next_sibling = parent_node.child_nodes().get(index as u32);
		parent_node.insert_before(child_node, next_sibling.as_ref())?;
		Ok(())
	}

	fn remove_child(&mut self, parent: &WebNode, child: &WebNode) -> Result<(), WebHostError> {
		let parent_node: &web_sys::Node = parent.element.as_ref();
		parent_node.remove_child(child.element.as_ref())?;
		Ok(())
	}

	fn offset_width(&self, node: &WebNode) -> i32 {
		Self::html(node).map_or(0, web_sys::HtmlElement::offset_width)
	}

	fn offset_height(&self, node: &WebNode) -> i32 {
		Self::html(node).map_or(0, web_sys::HtmlElement::offset_height)
	}

	/// Assigns `name` on the element's style object, which is where the camel-case names live.
	fn set_style_property(&mut self, node: &WebNode, name: &str, value: &str) -> Result<(), WebHostError> {
		let style = match Self::html(node) {
			Some(html) => html.style(),
			None => return Err(WebHostError(JsValue::from_str("element has no inline style surface"))),
		};
		if js_sys::Reflect::set(style.as_ref(), &JsValue::from_str(name), &JsValue::from_str(value))? {
			Ok(())
		} else {
			Err(WebHostError(JsValue::from_str(name)))
		}
	}

	fn set_class(&mut self, node: &WebNode, class: &str, enabled: bool) -> Result<(), WebHostError> {
		node.element.class_list().toggle_with_force(class, enabled)?;
		Ok(())
	}

	/// Mirrors the descriptor's attributes onto the element. `false` removes an attribute and `text` sets the text content.
	fn update_content(&mut self, node: &WebNode, descriptor: &Descriptor) -> Result<(), WebHostError> {
		for (name, value) in &descriptor.attributes {
			match (name.as_str(), value) {
				("text", value) => node.element.set_text_content(Some(&value.to_string())),
				(name, AttributeValue::Bool(false)) => node.element.remove_attribute(name)?,
				(name, AttributeValue::Bool(true)) => node.element.set_attribute(name, "")?,
				(name, value) => node.element.set_attribute(name, &value.to_string())?,
			}
		}
		if !descriptor.children.is_empty() {
			trace!("{} nested descriptor(s) are left to the layout that owns this element, if any.", descriptor.children.len());
		}
		Ok(())
	}

	fn update_caption(&mut self, caption: &WebNode, content: &CaptionContent) -> Result<(), WebHostError> {
		let element = &caption.element;
		element.set_text_content(content.text.as_deref());
		element.class_list().toggle_with_force("v-caption", true)?;
		element.class_list().toggle_with_force("v-required-field-indicator", content.required)?;
		element.class_list().toggle_with_force("v-errorindicator", content.error.is_some())?;
		element.class_list().toggle_with_force("v-selected", content.selected)?;
		match &content.icon {
			Some(icon) => element.set_attribute("data-icon", icon)?,
			None => element.remove_attribute("data-icon")?,
		}
		match &content.error {
			Some(error) => element.set_attribute("title", error)?,
			None => element.remove_attribute("title")?,
		}
		Ok(())
	}

	fn handle_relative_size(&mut self, node: &WebNode) {
		trace!("Relative size of {:?} is recomputed by the browser.", node.id);
	}
}
