#![cfg(not(target_arch = "wasm32"))]

use keyflow_dom::{memory::MemoryHost, style::StyleError, FlowConfig, FlowLayout, HostProfile, Registry, StyleMap};

use flow_support_::{init_logging, items, node, order, setup};

fn styles(entries: &[(&str, &str)]) -> StyleMap {
	entries.iter().map(|&(identity, style)| (identity.into(), style.to_owned())).collect()
}

#[test]
fn malformed_rules_are_skipped() {
	let (mut host, mut registry, mut layout) = setup();

	let report = layout
		.reconcile(
			&mut host,
			&mut registry,
			&items(&["a", "b"]),
			Some(&styles(&[("a", "color:red;;margin-top"), ("b", "margin-top: 4px")])),
		)
		.unwrap();

	let a = host.node(node(&registry, "a")).unwrap();
	assert_eq!(a.style.len(), 1);
	assert_eq!(a.style.get("color").map(String::as_str), Some("red"));
	let b = host.node(node(&registry, "b")).unwrap();
	assert_eq!(b.style.get("marginTop").map(String::as_str), Some("4px"));
	assert_eq!(report.style_failures, 1);
	assert_eq!(order(&layout, &registry), ["a", "b"]);
}

#[test]
fn rejected_rules_reach_the_sink() {
	init_logging();
	let mut host = MemoryHost::new();
	let mut registry = Registry::new();
	let mut layout = FlowLayout::with_style_sink(&mut host, FlowConfig::default(), Vec::<StyleError>::new()).unwrap();

	layout
		.reconcile(&mut host, &mut registry, &items(&["a"]), Some(&styles(&[("a", "color:red;;margin-top; :x; width:")])))
		.unwrap();

	assert_eq!(
		layout.style_sink(),
		&[
			StyleError::MissingValue("margin-top".to_owned()),
			StyleError::EmptyProperty(":x".to_owned()),
			StyleError::EmptyValue("width:".to_owned()),
		]
	);
}

#[test]
fn refused_properties_do_not_stop_later_rules() {
	init_logging();
	let mut host = MemoryHost::new();
	host.refuse_style("color");
	let mut registry = Registry::new();
	let mut layout = FlowLayout::with_style_sink(&mut host, FlowConfig::default(), Vec::<StyleError>::new()).unwrap();

	let report = layout
		.reconcile(&mut host, &mut registry, &items(&["a"]), Some(&styles(&[("a", "color: red; width: 10px")])))
		.unwrap();

	let a = host.node(node(&registry, "a")).unwrap();
	assert_eq!(a.style.get("width").map(String::as_str), Some("10px"));
	assert!(!a.style.contains_key("color"));
	assert_eq!(report.style_failures, 1);
	assert_eq!(
		layout.style_sink(),
		&[StyleError::Refused {
			property: "color".to_owned(),
			value: "red".to_owned(),
		}]
	);
}

#[test]
fn float_follows_profile() {
	init_logging();
	let mut host = MemoryHost::new();
	let mut registry = Registry::new();
	let mut standards = FlowLayout::new(&mut host, FlowConfig::default()).unwrap();
	let mut quirks = FlowLayout::new(&mut host, FlowConfig::default().with_profile(HostProfile::quirks())).unwrap();
	let style = styles(&[("a", "float: left"), ("b", "float: right")]);

	standards.reconcile(&mut host, &mut registry, &items(&["a"]), Some(&style)).unwrap();
	quirks.reconcile(&mut host, &mut registry, &items(&["b"]), Some(&style)).unwrap();

	assert_eq!(host.node(node(&registry, "a")).unwrap().style.get("cssFloat").map(String::as_str), Some("left"));
	assert_eq!(host.node(node(&registry, "b")).unwrap().style.get("styleFloat").map(String::as_str), Some("right"));
}

#[test]
fn missing_entries_are_not_styled() {
	let (mut host, mut registry, mut layout) = setup();

	let report = layout
		.reconcile(&mut host, &mut registry, &items(&["a"]), Some(&styles(&[("z", "color: red")])))
		.unwrap();

	assert_eq!(host.stats().style_writes, 0);
	assert_eq!(report.style_failures, 0);
}

#[test]
fn styles_persist_without_a_style_map() {
	let (mut host, mut registry, mut layout) = setup();
	layout
		.reconcile(&mut host, &mut registry, &items(&["a"]), Some(&styles(&[("a", "border-top-width: 1px")])))
		.unwrap();

	layout.reconcile(&mut host, &mut registry, &items(&["a"]), None).unwrap();

	let a = host.node(node(&registry, "a")).unwrap();
	assert_eq!(a.style.get("borderTopWidth").map(String::as_str), Some("1px"));
}
