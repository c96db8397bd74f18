//! A headless [`HostSurface`] that keeps live nodes in an in-memory arena.
//!
//! Useful for server-side layout bookkeeping and for observing what a pass does:
//! [`HostStats`] counts every structural operation the host was asked to perform.

use crate::{
	caption::CaptionContent,
	descriptor::{AttributeValue, Descriptor, Identity},
	host::HostSurface,
};
use hashbrown::HashSet;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryHostError {
	#[error("unknown node {0:?}")]
	UnknownNode(NodeId),
	#[error("{child:?} is not a child of {parent:?}")]
	NotAChild { parent: NodeId, child: NodeId },
	#[error("{0:?} is an ancestor of the insertion target")]
	Cycle(NodeId),
	#[error("content update rejected for {0}")]
	ContentRejected(Identity),
	#[error("style property {0:?} refused")]
	StyleRefused(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HostStats {
	pub created: usize,
	/// Insertions of nodes that weren't children of the target parent.
	pub inserts: usize,
	/// Insertions of nodes that already were children of the target parent.
	pub moves: usize,
	pub removals: usize,
	pub content_updates: usize,
	pub caption_updates: usize,
	pub style_writes: usize,
	pub relative_size_updates: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
	pub tag: String,
	pub parent: Option<NodeId>,
	pub children: Vec<NodeId>,
	pub style: BTreeMap<String, String>,
	pub classes: BTreeSet<String>,
	pub attributes: BTreeMap<String, AttributeValue>,
	pub caption: Option<CaptionContent>,
	pub offset_width: i32,
	pub offset_height: i32,
	pub content_updates: usize,
	pub relative_size_updates: usize,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
	nodes: Vec<MemoryNode>,
	stats: HostStats,
	rejected_content: HashSet<Identity>,
	refused_styles: HashSet<String>,
}
impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
		self.nodes.get(id.0)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut MemoryNode> {
		self.nodes.get_mut(id.0)
	}

	#[must_use]
	pub fn children(&self, id: NodeId) -> &[NodeId] {
		self.node(id).map_or(&[][..], |node| node.children.as_slice())
	}

	#[must_use]
	pub fn stats(&self) -> HostStats {
		self.stats
	}

	pub fn reset_stats(&mut self) {
		self.stats = HostStats::default();
	}

	/// Sets the sizes reported by [`HostSurface::offset_width`] and [`HostSurface::offset_height`].
	pub fn set_offset_size(&mut self, id: NodeId, width: i32, height: i32) -> Result<(), MemoryHostError> {
		let node = self.get_mut(id)?;
		node.offset_width = width;
		node.offset_height = height;
		Ok(())
	}

	/// Makes content updates for `identity` fail until [`accept_content`](`MemoryHost::accept_content`) is called.
	pub fn reject_content(&mut self, identity: impl Into<Identity>) {
		self.rejected_content.insert(identity.into());
	}

	pub fn accept_content(&mut self, identity: &Identity) {
		self.rejected_content.remove(identity);
	}

	/// Makes writes to the (camel-case) style property `name` fail.
	pub fn refuse_style(&mut self, name: &str) {
		self.refused_styles.insert(name.to_owned());
	}

	fn get(&self, id: NodeId) -> Result<&MemoryNode, MemoryHostError> {
		self.nodes.get(id.0).ok_or(MemoryHostError::UnknownNode(id))
	}

	fn get_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, MemoryHostError> {
		self.nodes.get_mut(id.0).ok_or(MemoryHostError::UnknownNode(id))
	}

	fn is_ancestor_or_self(&self, candidate: NodeId, mut of: NodeId) -> bool {
		loop {
			if candidate == of {
				return true;
			}
			match self.nodes.get(of.0).and_then(|node| node.parent) {
				Some(parent) => of = parent,
				None => return false,
			}
		}
	}

	fn detach(&mut self, child: NodeId) -> Result<(), MemoryHostError> {
		if let Some(parent) = self.get_mut(child)?.parent.take() {
			self.get_mut(parent)?.children.retain(|&c| c != child);
		}
		Ok(())
	}
}
impl HostSurface for MemoryHost {
	type Handle = NodeId;
	type Error = MemoryHostError;

	fn create_live_node(&mut self, tag: &str) -> Result<NodeId, MemoryHostError> {
		let id = NodeId(self.nodes.len());
		self.nodes.push(MemoryNode {
			tag: tag.to_owned(),
			..MemoryNode::default()
		});
		self.stats.created += 1;
		trace!("Created <{}> as {:?}.", tag, id);
		Ok(id)
	}

	fn insert_at(&mut self, parent: &NodeId, child: &NodeId, index: usize) -> Result<(), MemoryHostError> {
		let (parent, child) = (*parent, *child);
		self.get(parent)?;
		if self.is_ancestor_or_self(child, parent) {
			return Err(MemoryHostError::Cycle(child));
		}

		if self.get(child)?.parent == Some(parent) {
			self.stats.moves += 1;
		} else {
			self.stats.inserts += 1;
		}
		self.detach(child)?;

		let siblings = &mut self.get_mut(parent)?.children;
		let index = index.min(siblings.len());
		siblings.insert(index, child);
		self.get_mut(child)?.parent = Some(parent);
		Ok(())
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryHostError> {
		if self.get(*child)?.parent != Some(*parent) {
			return Err(MemoryHostError::NotAChild { parent: *parent, child: *child });
		}
		self.detach(*child)?;
		self.stats.removals += 1;
		Ok(())
	}

	fn offset_width(&self, node: &NodeId) -> i32 {
		self.node(*node).map_or(0, |node| node.offset_width)
	}

	fn offset_height(&self, node: &NodeId) -> i32 {
		self.node(*node).map_or(0, |node| node.offset_height)
	}

	fn set_style_property(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), MemoryHostError> {
		if self.refused_styles.contains(name) {
			return Err(MemoryHostError::StyleRefused(name.to_owned()));
		}
		let style = &mut self.get_mut(*node)?.style;
		if value.is_empty() {
			style.remove(name);
		} else {
			style.insert(name.to_owned(), value.to_owned());
		}
		self.stats.style_writes += 1;
		Ok(())
	}

	fn set_class(&mut self, node: &NodeId, class: &str, enabled: bool) -> Result<(), MemoryHostError> {
		let classes = &mut self.get_mut(*node)?.classes;
		if enabled {
			classes.insert(class.to_owned());
		} else {
			classes.remove(class);
		}
		Ok(())
	}

	fn update_content(&mut self, node: &NodeId, descriptor: &Descriptor) -> Result<(), MemoryHostError> {
		if self.rejected_content.contains(&descriptor.identity) {
			return Err(MemoryHostError::ContentRejected(descriptor.identity.clone()));
		}
		let node = self.get_mut(*node)?;
		node.attributes = descriptor.attributes.clone();
		node.content_updates += 1;
		self.stats.content_updates += 1;
		Ok(())
	}

	fn update_caption(&mut self, caption: &NodeId, content: &CaptionContent) -> Result<(), MemoryHostError> {
		self.get_mut(*caption)?.caption = Some(content.clone());
		self.stats.caption_updates += 1;
		Ok(())
	}

	fn handle_relative_size(&mut self, node: &NodeId) {
		if let Some(node) = self.node_mut(*node) {
			node.relative_size_updates += 1;
		}
		self.stats.relative_size_updates += 1;
	}
}
