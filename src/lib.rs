#![doc(html_root_url = "https://docs.rs/keyflow-dom/0.0.3")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod caption;
pub mod config;
pub mod descriptor;
pub mod flow;
pub mod host;
pub mod layout;
pub mod memory;
pub mod registry;
pub mod slots;
pub mod style;
pub mod web;

pub use crate::{
	caption::{CaptionContent, CaptionPolicy, DefaultCaptionPolicy},
	config::{FlowConfig, HostProfile},
	descriptor::{AttributeValue, Descriptor, Flags, Identity, StyleMap},
	flow::{FlowLayout, PassReport},
	host::HostSurface,
	layout::{AllocatedSpace, MarginInfo},
	registry::{IdentityRegistry, Registry},
	slots::Slot,
};
