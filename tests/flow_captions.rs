#![cfg(not(target_arch = "wasm32"))]

use keyflow_dom::{caption::CaptionChange, CaptionContent, Descriptor, FlowConfig, FlowLayout, IdentityRegistry};

use flow_support_::{host_order, item, items, node, setup};

fn captioned(identity: &str, caption: &str) -> Descriptor {
	item(identity).attribute("caption", caption)
}

#[test]
fn caption_follows_predicate_across_passes() {
	let (mut host, mut registry, mut layout) = setup();

	layout.reconcile(&mut host, &mut registry, &[item("a")], None).unwrap();
	let a = node(&registry, "a");
	assert_eq!(layout.caption_of(&a), None);

	let report = layout.reconcile(&mut host, &mut registry, &[captioned("a", "First")], None).unwrap();
	assert_eq!(report.captions_created, 1);
	let first = *layout.caption_of(&a).unwrap();
	assert_eq!(host_order(&host, &layout, &registry), ["^a", "a"]);
	assert_eq!(host.node(first).unwrap().caption.as_ref().unwrap().text.as_deref(), Some("First"));

	let report = layout.reconcile(&mut host, &mut registry, &[item("a")], None).unwrap();
	assert_eq!(report.captions_dropped, 1);
	assert_eq!(layout.caption_of(&a), None);
	assert_eq!(host.node(first).unwrap().parent, None);
	assert_eq!(host_order(&host, &layout, &registry), ["a"]);

	layout.reconcile(&mut host, &mut registry, &[captioned("a", "Second")], None).unwrap();
	let second = *layout.caption_of(&a).unwrap();
	assert_ne!(first, second);
	assert_eq!(layout.caption_content(&a).unwrap().text.as_deref(), Some("Second"));
	assert_eq!(host.node(second).unwrap().caption.as_ref().unwrap().text.as_deref(), Some("Second"));
}

#[test]
fn captions_precede_their_owners() {
	let (mut host, mut registry, mut layout) = setup();

	layout
		.reconcile(&mut host, &mut registry, &[captioned("a", "A"), item("b"), captioned("c", "C")], None)
		.unwrap();
	assert_eq!(host_order(&host, &layout, &registry), ["^a", "a", "b", "^c", "c"]);

	let update = [captioned("c", "C"), item("b"), captioned("a", "A")];
	layout.reconcile(&mut host, &mut registry, &update, None).unwrap();
	assert_eq!(host_order(&host, &layout, &registry), ["^c", "c", "b", "^a", "a"]);

	let report = layout.reconcile(&mut host, &mut registry, &update, None).unwrap();
	assert!(report.is_structurally_idle());
	assert_eq!((report.captions_created, report.captions_dropped), (0, 0));
}

#[test]
fn caption_appearing_mid_list_moves_nothing() {
	let (mut host, mut registry, mut layout) = setup();
	layout.reconcile(&mut host, &mut registry, &items(&["a", "b", "c"]), None).unwrap();

	let report = layout
		.reconcile(&mut host, &mut registry, &[item("a"), captioned("b", "B"), item("c")], None)
		.unwrap();
	assert_eq!(host_order(&host, &layout, &registry), ["a", "^b", "b", "c"]);
	assert_eq!((report.moves, report.captions_created), (0, 1));

	let report = layout.reconcile(&mut host, &mut registry, &items(&["a", "b", "c"]), None).unwrap();
	assert_eq!(host_order(&host, &layout, &registry), ["a", "b", "c"]);
	assert_eq!((report.moves, report.captions_dropped), (0, 1));
}

#[test]
fn indicators_need_captions() {
	let (mut host, mut registry, mut layout) = setup();

	layout
		.reconcile(
			&mut host,
			&mut registry,
			&[item("a").flag("required", true), item("b").flag("selected", true), item("c").attribute("error", "Invalid"), item("d")],
			None,
		)
		.unwrap();

	assert_eq!(host_order(&host, &layout, &registry), ["^a", "a", "^b", "b", "^c", "c", "d"]);
	assert!(layout.caption_content(&node(&registry, "a")).unwrap().required);
	assert!(layout.caption_content(&node(&registry, "b")).unwrap().selected);
}

#[test]
fn cached_children_reevaluate_captions() {
	let (mut host, mut registry, mut layout) = setup();
	layout.reconcile(&mut host, &mut registry, &[item("a")], None).unwrap();

	let report = layout
		.reconcile(&mut host, &mut registry, &[captioned("a", "A").cached(true)], None)
		.unwrap();

	assert_eq!((report.content_updates, report.captions_created), (0, 1));
	assert_eq!(host_order(&host, &layout, &registry), ["^a", "a"]);
}

#[test]
fn custom_policy() {
	let (mut host, mut registry, _) = setup();
	let mut layout = FlowLayout::new(&mut host, FlowConfig::default())
		.unwrap()
		.with_caption_policy(|descriptor: &Descriptor, _: &CaptionContent| descriptor.tag == "field");

	layout
		.reconcile(&mut host, &mut registry, &[captioned("a", "A"), Descriptor::new("b", "field")], None)
		.unwrap();

	assert_eq!(layout.caption_of(&node(&registry, "a")), None);
	assert!(layout.caption_of(&node(&registry, "b")).is_some());
	assert_eq!(layout.caption_count(), 1);
}

#[test]
fn taken_child_keeps_detached_caption() {
	let (mut host, mut registry, mut layout) = setup();
	layout
		.reconcile(&mut host, &mut registry, &[captioned("a", "Old"), item("b")], None)
		.unwrap();
	let a = node(&registry, "a");
	let caption = *layout.caption_of(&a).unwrap();

	assert!(layout.take_child(&mut host, &a).unwrap());
	assert_eq!(host_order(&host, &layout, &registry), ["b"]);
	assert!(registry.is_registered(&a));
	assert!(!layout.is_caption_attached(&a));
	assert_eq!(host.node(caption).unwrap().parent, None);

	let report = layout
		.reconcile(&mut host, &mut registry, &[captioned("a", "New"), item("b")], None)
		.unwrap();

	assert_eq!(host_order(&host, &layout, &registry), ["^a", "a", "b"]);
	assert_eq!(layout.caption_of(&a), Some(&caption));
	assert!(layout.is_caption_attached(&a));
	assert_eq!(report.captions_created, 0);
	assert_eq!(host.node(caption).unwrap().caption.as_ref().unwrap().text.as_deref(), Some("New"));
}

#[test]
fn out_of_band_caption_sync() {
	let (mut host, mut registry, mut layout) = setup();
	layout.reconcile(&mut host, &mut registry, &items(&["a", "b"]), None).unwrap();
	let b = node(&registry, "b");

	let change = layout.sync_caption(&mut host, &b, &captioned("b", "Late")).unwrap();
	assert_eq!(change, CaptionChange::Created);
	assert_eq!(host_order(&host, &layout, &registry), ["a", "^b", "b"]);

	let change = layout.sync_caption(&mut host, &b, &captioned("b", "Later")).unwrap();
	assert_eq!(change, CaptionChange::Refreshed);

	let change = layout.sync_caption(&mut host, &b, &item("b")).unwrap();
	assert_eq!(change, CaptionChange::Dropped);
	assert_eq!(host_order(&host, &layout, &registry), ["a", "b"]);

	let change = layout.sync_caption(&mut host, &b, &item("b")).unwrap();
	assert_eq!(change, CaptionChange::Unchanged);
}

#[test]
fn stale_owner_takes_caption_along() {
	let (mut host, mut registry, mut layout) = setup();
	layout
		.reconcile(&mut host, &mut registry, &[item("a"), captioned("b", "B"), item("c")], None)
		.unwrap();

	let report = layout.reconcile(&mut host, &mut registry, &items(&["a", "c"]), None).unwrap();

	assert_eq!(host_order(&host, &layout, &registry), ["a", "c"]);
	assert_eq!(layout.caption_count(), 0);
	assert_eq!(report.captions_dropped, 1);
}
