use crate::{
	caption::{CaptionChange, CaptionContent, CaptionMap, CaptionPolicy, DefaultCaptionPolicy},
	config::FlowConfig,
	descriptor::{Descriptor, Identity, StyleMap},
	host::HostSurface,
	layout::{AllocatedSpace, MarginInfo, SizeNegotiator},
	registry::IdentityRegistry,
	slots::{ChildSlots, Placement, Slot},
	style::{apply_inline_style, StyleSink, TracingSink},
};
use hashbrown::{HashMap, HashSet};
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// What a single reconciliation pass did.
///
/// A pass over an unchanged descriptor list reports no moves, insertions, removals, registrations or unregistrations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
	pub moves: usize,
	pub insertions: usize,
	pub removals: usize,
	pub registrations: usize,
	pub unregistrations: usize,
	pub captions_created: usize,
	pub captions_dropped: usize,
	/// Rejected style rules, nested containers' included.
	pub style_failures: usize,
	pub content_updates: usize,
	/// Nested containers whose own children were reconciled.
	pub nested_passes: usize,
}
impl PassReport {
	/// No child was moved, inserted or removed.
	#[must_use]
	pub fn is_structurally_idle(&self) -> bool {
		self.moves == 0 && self.insertions == 0 && self.removals == 0
	}

	fn count(&mut self, placement: Placement) {
		match placement {
			Placement::Unchanged => (),
			Placement::Moved => self.moves += 1,
			Placement::Inserted => self.insertions += 1,
		}
	}
}

/// A flow container whose children are kept in descriptor order, matched by [`Identity`].
///
/// The container consists of three live nodes: an outer element, a margin element inside it, and the panel inside that.
/// Children and their captions are placed into the panel.
///
/// Descriptors tagged with [`FlowConfig::container_tag`] become nested [`FlowLayout`]s owned by this one.
/// Their children are reconciled as part of this layout's pass unless the descriptor is cached.
///
/// # Identity matching
///
/// A registered node is only reused if it is a child of this layout, or was [taken](`FlowLayout::take_child`) out of it.
/// An identity bound to another layout's node is rebound to a new node here, and the other layout drops its copy on its next pass.
pub struct FlowLayout<H: HostSurface, S = TracingSink> {
	config: FlowConfig,
	size: SizeNegotiator<H::Handle>,
	slots: ChildSlots<H::Handle>,
	captions: CaptionMap<H::Handle>,
	nested: HashMap<H::Handle, FlowLayout<H, S>>,
	taken: HashSet<H::Handle>,
	policy: Box<dyn CaptionPolicy>,
	sink: S,
	rendering: bool,
}
impl<H: HostSurface> FlowLayout<H> {
	pub fn new(host: &mut H, config: FlowConfig) -> Result<Self, H::Error> {
		Self::with_style_sink(host, config, TracingSink)
	}
}
impl<H: HostSurface, S: StyleSink> FlowLayout<H, S> {
	#[instrument(skip(host, sink))]
	pub fn with_style_sink(host: &mut H, config: FlowConfig, sink: S) -> Result<Self, H::Error> {
		let outer = host.create_live_node("div")?;
		let margin = host.create_live_node("div")?;
		let panel = host.create_live_node("div")?;
		host.set_class(&outer, &config.class_name, true)?;
		host.set_class(&margin, &config.class("margin"), true)?;
		host.set_class(&panel, &config.class("container"), true)?;
		host.insert_at(&outer, &margin, 0)?;
		host.insert_at(&margin, &panel, 0)?;

		Ok(Self {
			config,
			size: SizeNegotiator::new(outer, margin, panel),
			slots: ChildSlots::new(),
			captions: CaptionMap::new(),
			nested: HashMap::new(),
			taken: HashSet::new(),
			policy: Box::new(DefaultCaptionPolicy),
			sink,
			rendering: false,
		})
	}

	#[must_use]
	pub fn with_caption_policy(mut self, policy: impl CaptionPolicy + 'static) -> Self {
		self.policy = Box::new(policy);
		self
	}

	/// The outer element, to be placed into the surrounding tree by the caller.
	pub fn element(&self) -> &H::Handle {
		self.size.outer()
	}

	pub fn panel(&self) -> &H::Handle {
		self.size.panel()
	}

	pub fn config(&self) -> &FlowConfig {
		&self.config
	}

	pub fn style_sink(&self) -> &S {
		&self.sink
	}

	pub fn style_sink_mut(&mut self) -> &mut S {
		&mut self.sink
	}

	/// Whether a pass started by [`update`](`FlowLayout::update`) or [`reconcile`](`FlowLayout::reconcile`) is running.
	pub fn is_rendering(&self) -> bool {
		self.rendering
	}

	/// Child nodes in order, without captions.
	pub fn children(&self) -> impl Iterator<Item = &H::Handle> {
		self.slots.nodes()
	}

	/// The full live child order, captions included.
	pub fn slots(&self) -> &[Slot<H::Handle>] {
		self.slots.as_slice()
	}

	pub fn child_count(&self) -> usize {
		self.slots.nodes().count()
	}

	pub fn has_child(&self, node: &H::Handle) -> bool {
		self.slots.position_of_node(node).is_some()
	}

	pub fn caption_of(&self, owner: &H::Handle) -> Option<&H::Handle> {
		self.captions.get(owner).map(|caption| &caption.handle)
	}

	/// Content last pushed into `owner`'s caption.
	pub fn caption_content(&self, owner: &H::Handle) -> Option<&CaptionContent> {
		self.captions.get(owner).map(|caption| &caption.content)
	}

	pub fn is_caption_attached(&self, owner: &H::Handle) -> bool {
		self.captions.get(owner).map_or(false, |caption| caption.attached)
	}

	pub fn caption_count(&self) -> usize {
		self.captions.len()
	}

	/// The nested container whose outer element is `node`.
	pub fn nested(&self, node: &H::Handle) -> Option<&FlowLayout<H, S>> {
		self.nested.get(node)
	}

	pub fn nested_count(&self) -> usize {
		self.nested.len()
	}

	/// Evaluates `owner`'s caption against `descriptor`, creating, reattaching, refreshing or dropping it.
	///
	/// [`reconcile`](`FlowLayout::reconcile`) does this for each child, so this is only needed for out-of-band state changes.
	pub fn sync_caption(&mut self, host: &mut H, owner: &H::Handle, descriptor: &Descriptor) -> Result<CaptionChange, H::Error> {
		let panel = self.size.panel().clone();
		let content = CaptionContent::from_descriptor(descriptor);
		let needed = self.policy.is_needed(descriptor, &content);
		self.captions.sync(host, &panel, &mut self.slots, owner, content, needed)
	}

	/// Drops `old`'s caption, then puts `new` where `old` is.
	///
	/// Returns `false` if `old` isn't a child. Its caption is dropped either way.
	/// `old` stays registered; it is the caller's to dispose of, along with its nested container, if any.
	#[instrument(skip(self, host))]
	pub fn replace_child(&mut self, host: &mut H, old: &H::Handle, new: &H::Handle) -> Result<bool, H::Error> {
		let panel = self.size.panel().clone();
		self.captions.drop_caption(host, &panel, &mut self.slots, old)?;
		let index = match self.slots.position_of_node(old) {
			Some(index) => index,
			None => return Ok(false),
		};
		self.slots.remove_at(host, &panel, index)?;
		self.slots.place(host, &panel, Slot::Node(new.clone()), index)?;
		self.nested.remove(old);
		Ok(true)
	}

	/// Detaches `node` without unregistering it. Its caption is kept, detached, and reattached when `node` returns.
	///
	/// A taken node is only reused by this layout.
	#[instrument(skip(self, host))]
	pub fn take_child(&mut self, host: &mut H, node: &H::Handle) -> Result<bool, H::Error> {
		let panel = self.size.panel().clone();
		if let Some(index) = self.slots.position_of_caption(node) {
			self.slots.remove_at(host, &panel, index)?;
			self.captions.mark_detached(node);
		}
		match self.slots.position_of_node(node) {
			Some(index) => {
				self.slots.remove_at(host, &panel, index)?;
				self.taken.insert(node.clone());
				Ok(true)
			}
			None => Ok(false),
		}
	}

	/// Declares the container's width. `None` or `""` leaves it undefined (auto).
	pub fn set_width(&mut self, host: &mut H, width: Option<&str>) -> Result<(), H::Error> {
		host.set_style_property(self.size.outer(), "width", width.unwrap_or(""))?;
		self.size.set_width(width);
		if !self.rendering {
			self.update_relative_sizes(host);
		}
		Ok(())
	}

	/// Declares the container's height. `None` or `""` leaves it undefined (auto).
	pub fn set_height(&mut self, host: &mut H, height: Option<&str>) -> Result<(), H::Error> {
		host.set_style_property(self.size.outer(), "height", height.unwrap_or(""))?;
		self.size.set_height(height);
		if !self.rendering {
			self.update_relative_sizes(host);
		}
		Ok(())
	}

	fn update_relative_sizes(&self, host: &mut H) {
		for node in self.slots.nodes() {
			host.handle_relative_size(node);
		}
	}

	/// Toggles the `<base>-margin-*` and `<base>-spacing` classes on the margin element.
	pub fn set_margin_and_spacing(&mut self, host: &mut H, margins: MarginInfo, spacing: bool) -> Result<(), H::Error> {
		let margin = self.size.margin();
		for &(side, enabled) in &[("margin-top", margins.top), ("margin-right", margins.right), ("margin-bottom", margins.bottom), ("margin-left", margins.left)] {
			host.set_class(margin, &self.config.class(side), enabled)?;
		}
		host.set_class(margin, &self.config.class("spacing"), spacing)
	}

	/// Unregisters all children and taken nodes, recursively through nested containers.
	fn release<R: IdentityRegistry<H::Handle>>(self, registry: &mut R) -> usize {
		let mut released = 0;
		for node in self.slots.nodes().chain(self.taken.iter()) {
			if registry.unregister(node) {
				released += 1;
			}
		}
		for (_, nested) in self.nested {
			released += nested.release(registry);
		}
		released
	}

	/// Content area available to children. Cached until the next size declaration or pass.
	pub fn allocated_space(&self, host: &H) -> AllocatedSpace {
		self.size.allocated_space(host, self.config.profile)
	}

	pub fn invalidate_space(&self) {
		self.size.invalidate();
	}

	/// Both width and height are declared, so child resizes can't change this container's size.
	pub fn has_fixed_size(&self) -> bool {
		self.size.has_fixed_size()
	}

	/// See [`SizeNegotiator::request_layout`].
	pub fn request_layout<'a>(&self, children: impl IntoIterator<Item = &'a H::Handle>) -> bool
	where
		H::Handle: 'a,
	{
		self.size.request_layout(children)
	}
}
impl<H: HostSurface, S: StyleSink + Default> FlowLayout<H, S> {
	/// Applies the container's own descriptor: declared size, margins and spacing, then its children.
	///
	/// Size declarations made here don't trigger relative-size updates of the children, since those are updated by the pass anyway.
	#[instrument(skip(self, host, registry, descriptor, styles))]
	pub fn update<R: IdentityRegistry<H::Handle>>(&mut self, host: &mut H, registry: &mut R, descriptor: &Descriptor, styles: Option<&StyleMap>) -> Result<PassReport, H::Error> {
		self.rendering = true;
		let result = self.update_rendering(host, registry, descriptor, styles);
		self.rendering = false;
		result
	}

	fn update_rendering<R: IdentityRegistry<H::Handle>>(&mut self, host: &mut H, registry: &mut R, descriptor: &Descriptor, styles: Option<&StyleMap>) -> Result<PassReport, H::Error> {
		self.set_width(host, descriptor.string_attribute("width"))?;
		self.set_height(host, descriptor.string_attribute("height"))?;
		self.set_margin_and_spacing(host, MarginInfo::from_descriptor(descriptor), descriptor.has_flag("spacing"))?;
		self.reconcile_children(host, registry, &descriptor.children, styles)
	}

	/// Matches `descriptors` to live children by identity, puts them in order and removes children that no longer appear.
	///
	/// `styles` maps child identities to inline style strings for this pass only.
	/// Malformed styles are reported to the style sink and never abort the pass.
	/// Host errors, including those of content updates of non-cached children, are returned immediately.
	#[instrument(skip(self, host, registry, descriptors, styles))]
	pub fn reconcile<R: IdentityRegistry<H::Handle>>(&mut self, host: &mut H, registry: &mut R, descriptors: &[Descriptor], styles: Option<&StyleMap>) -> Result<PassReport, H::Error> {
		self.rendering = true;
		let result = self.reconcile_children(host, registry, descriptors, styles);
		self.rendering = false;
		result
	}

	fn reconcile_children<R: IdentityRegistry<H::Handle>>(&mut self, host: &mut H, registry: &mut R, descriptors: &[Descriptor], styles: Option<&StyleMap>) -> Result<PassReport, H::Error> {
		let mut report = PassReport::default();
		let panel = self.size.panel().clone();
		self.size.invalidate();

		let old_nodes: Vec<H::Handle> = self.slots.nodes().cloned().collect();
		let mut retained = HashSet::with_capacity(descriptors.len());
		let mut seen = HashSet::<&Identity>::with_capacity(descriptors.len());

		let mut insertion_index = 0;
		for descriptor in descriptors {
			let cached = descriptor.flags.cached;
			let span = if cfg!(feature = "dangerous-logging") {
				trace_span!("Reconciling child", identity = %descriptor.identity, tag = %descriptor.tag, cached)
			} else {
				trace_span!("Reconciling child", tag = %descriptor.tag, cached)
			};
			let _enter = span.enter();

			if !seen.insert(&descriptor.identity) {
				error!("Duplicate identity encountered. Skipping the repeated descriptor.");
				continue;
			}

			let node = self.resolve_node(host, registry, descriptor, &mut report)?;
			retained.insert(node.clone());

			if let Some(caption) = self.captions.get(&node) {
				if caption.attached {
					let slot = Slot::Caption {
						owner: node.clone(),
						handle: caption.handle.clone(),
					};
					report.count(self.slots.place(host, &panel, slot, insertion_index)?);
					insertion_index += 1;
				}
			}

			report.count(self.slots.place(host, &panel, Slot::Node(node.clone()), insertion_index)?);

			if let Some(style) = styles.and_then(|styles| styles.get(&descriptor.identity)) {
				let style_report = apply_inline_style(host, &node, &descriptor.identity, style, self.config.profile, &mut self.sink);
				report.style_failures += style_report.rejected;
			}

			if cached {
				trace!("Cached. Skipping content update.");
			} else {
				host.update_content(&node, descriptor)?;
				report.content_updates += 1;
				if let Some(nested) = self.nested.get_mut(&node) {
					// Nested passes report into this layout's sink.
					core::mem::swap(&mut nested.sink, &mut self.sink);
					let result = nested.update(host, registry, descriptor, styles);
					core::mem::swap(&mut nested.sink, &mut self.sink);
					let nested_report = result?;
					report.nested_passes += 1;
					report.style_failures += nested_report.style_failures;
				}
			}

			let content = CaptionContent::from_descriptor(descriptor);
			let needed = self.policy.is_needed(descriptor, &content);
			match self.captions.sync(host, &panel, &mut self.slots, &node, content, needed)? {
				CaptionChange::Created => report.captions_created += 1,
				CaptionChange::Dropped => report.captions_dropped += 1,
				CaptionChange::Unchanged | CaptionChange::Reattached | CaptionChange::Refreshed => (),
			}

			// Captions may have been added or dropped in front of the node.
			insertion_index = match self.slots.position_of_node(&node) {
				Some(index) => index + 1,
				None => {
					error!("Live node {:?} vanished from the child order during its own pass.", node);
					insertion_index
				}
			};
		}

		for node in old_nodes.iter().filter(|node| !retained.contains(*node)) {
			self.remove_stale(host, registry, &panel, node, &mut report)?;
		}

		debug_assert_eq!(self.slots.nodes().count(), retained.len());
		info!("Reconciled {} descriptor(s): {:?}", descriptors.len(), report);
		if STATIC_MAX_LEVEL >= Level::WARN && report.moves >= 16 && report.moves * 2 > descriptors.len() {
			warn!(
				"Moved {} of {} children in one pass.\n\
				This may point to unstable descriptor ordering.",
				report.moves,
				descriptors.len()
			);
		}
		Ok(report)
	}

	/// Reuses the registered node for `descriptor`'s identity if it belongs to this layout, otherwise creates and registers a new one.
	fn resolve_node<R: IdentityRegistry<H::Handle>>(&mut self, host: &mut H, registry: &mut R, descriptor: &Descriptor, report: &mut PassReport) -> Result<H::Handle, H::Error> {
		if let Some(node) = registry.lookup(&descriptor.identity) {
			if self.slots.position_of_node(&node).is_some() || self.taken.remove(&node) {
				return Ok(node);
			}
			trace!("Identity is bound to {:?}, which is not a child here. Rebinding it.", node);
		}

		let node = if descriptor.tag == *self.config.container_tag {
			let nested = FlowLayout::with_style_sink(host, self.config.clone(), S::default())?;
			let node = nested.element().clone();
			self.nested.insert(node.clone(), nested);
			node
		} else {
			host.create_live_node(&descriptor.tag)?
		};
		trace!("Created live node {:?}.", node);
		registry.register(node.clone(), descriptor.identity.clone());
		report.registrations += 1;
		Ok(node)
	}

	fn remove_stale<R: IdentityRegistry<H::Handle>>(&mut self, host: &mut H, registry: &mut R, panel: &H::Handle, node: &H::Handle, report: &mut PassReport) -> Result<(), H::Error> {
		trace!("Removing stale child {:?}.", node);
		if let Some(index) = self.slots.position_of_node(node) {
			self.slots.remove_at(host, panel, index)?;
			report.removals += 1;
		}
		if registry.is_registered(node) {
			registry.unregister(node);
			report.unregistrations += 1;
		}
		if let Some(nested) = self.nested.remove(node) {
			report.unregistrations += nested.release(registry);
		}
		if self.captions.drop_caption(host, panel, &mut self.slots, node)? {
			report.captions_dropped += 1;
		}
		Ok(())
	}
}
