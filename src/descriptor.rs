//! The declarative side of a reconciliation pass.
//!
//! A [`Descriptor`] describes one node of the incoming subtree for the current update only.
//! Nothing in here is retained by [`FlowLayout`](`crate::flow::FlowLayout`) across passes except [`Identity`] keys.

use core::{
	borrow::Borrow,
	fmt::{self, Display, Formatter},
};
use hashbrown::HashMap;
use std::{
	collections::{BTreeMap, BTreeSet},
	rc::Rc,
};

/// Opaque key that stays stable across updates and is used to match descriptors to live nodes.
///
/// Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Rc<str>);
impl Identity {
	#[must_use]
	pub fn new(identity: &str) -> Self {
		Self(identity.into())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl From<&str> for Identity {
	fn from(identity: &str) -> Self {
		Self::new(identity)
	}
}
impl From<String> for Identity {
	fn from(identity: String) -> Self {
		Self(identity.into())
	}
}
impl Borrow<str> for Identity {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Display for Identity {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Primitive attribute value as received with a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
}
impl AttributeValue {
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttributeValue::Str(value) => Some(value),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		match *self {
			AttributeValue::Bool(value) => Some(value),
			_ => None,
		}
	}
}
impl Display for AttributeValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			AttributeValue::Bool(value) => value.fmt(f),
			AttributeValue::Int(value) => value.fmt(f),
			AttributeValue::Float(value) => value.fmt(f),
			AttributeValue::Str(value) => f.write_str(value),
		}
	}
}
impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<i64> for AttributeValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}
impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}
impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}
impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

/// Boolean flags of a descriptor.
///
/// `cached` marks content as unchanged since the previous update, which suppresses recursive content propagation.
/// Identity, position and removal still apply to cached nodes.
///
/// Any other flag is a named presence flag, e.g. `selected` or `required`, and is absent unless raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
	pub cached: bool,
	raised: BTreeSet<String>,
}
impl Flags {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, name: &str, value: bool) {
		if value {
			self.raised.insert(name.to_owned());
		} else {
			self.raised.remove(name);
		}
	}

	#[must_use]
	pub fn is_set(&self, name: &str) -> bool {
		self.raised.contains(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.raised.iter().map(String::as_str)
	}
}

/// Declarative description of one node for the current update.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
	pub identity: Identity,
	pub tag: String,
	pub attributes: BTreeMap<String, AttributeValue>,
	pub flags: Flags,
	pub children: Vec<Descriptor>,
}
impl Descriptor {
	#[must_use]
	pub fn new(identity: impl Into<Identity>, tag: &str) -> Self {
		Self {
			identity: identity.into(),
			tag: tag.to_owned(),
			attributes: BTreeMap::new(),
			flags: Flags::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
		self.attributes.insert(name.to_owned(), value.into());
		self
	}

	#[must_use]
	pub fn flag(mut self, name: &str, value: bool) -> Self {
		self.flags.set(name, value);
		self
	}

	#[must_use]
	pub fn cached(mut self, cached: bool) -> Self {
		self.flags.cached = cached;
		self
	}

	#[must_use]
	pub fn child(mut self, child: Descriptor) -> Self {
		self.children.push(child);
		self
	}

	#[must_use]
	pub fn string_attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).and_then(AttributeValue::as_str)
	}

	/// A flag counts as set if it was raised or if a boolean attribute of the same name is `true`.
	#[must_use]
	pub fn has_flag(&self, name: &str) -> bool {
		self.flags.is_set(name) || self.attributes.get(name).and_then(AttributeValue::as_bool) == Some(true)
	}
}

/// Inline style strings per child identity, scoped to a single update.
pub type StyleMap = HashMap<Identity, String>;
