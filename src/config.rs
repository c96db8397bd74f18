use std::borrow::Cow;

/// Capabilities of the host environment, resolved once by the embedder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostProfile {
	/// The outer box reports margins inconsistently, so the panel's own width can't be trusted
	/// and available width has to be derived from the outer element instead.
	pub box_model_quirk: bool,
	/// The horizontal float style property is called `styleFloat` rather than `cssFloat`.
	pub legacy_float: bool,
}
impl HostProfile {
	#[must_use]
	pub const fn standards() -> Self {
		Self {
			box_model_quirk: false,
			legacy_float: false,
		}
	}

	#[must_use]
	pub const fn quirks() -> Self {
		Self {
			box_model_quirk: true,
			legacy_float: true,
		}
	}
}

pub const DEFAULT_CLASS_NAME: &str = "v-csslayout";
pub const DEFAULT_CONTAINER_TAG: &str = "csslayout";

/// Per-layout configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
	/// Base class of the outer element. The margin element and panel are classed `<base>-margin` and `<base>-container`.
	pub class_name: Cow<'static, str>,
	/// Descriptor tag of children that are nested flow layouts themselves.
	pub container_tag: Cow<'static, str>,
	pub profile: HostProfile,
}
impl Default for FlowConfig {
	fn default() -> Self {
		Self {
			class_name: Cow::Borrowed(DEFAULT_CLASS_NAME),
			container_tag: Cow::Borrowed(DEFAULT_CONTAINER_TAG),
			profile: HostProfile::standards(),
		}
	}
}
impl FlowConfig {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_class_name(mut self, class_name: impl Into<Cow<'static, str>>) -> Self {
		self.class_name = class_name.into();
		self
	}

	#[must_use]
	pub fn with_container_tag(mut self, container_tag: impl Into<Cow<'static, str>>) -> Self {
		self.container_tag = container_tag.into();
		self
	}

	#[must_use]
	pub fn with_profile(mut self, profile: HostProfile) -> Self {
		self.profile = profile;
		self
	}

	pub(crate) fn class(&self, suffix: &str) -> String {
		format!("{}-{}", self.class_name, suffix)
	}
}
