//! The inline style mini-language: `property: value; property: value`.
//!
//! Rules are independent. A malformed rule is reported and skipped, and never prevents later rules from applying.

use crate::{config::HostProfile, descriptor::Identity, host::HostSurface};
use thiserror::Error;
use tracing::{error, trace, warn};

/// One well-formed rule, with both halves trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule<'a> {
	pub property: &'a str,
	pub value: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
	#[error("style rule has no `:` separator: {0:?}")]
	MissingValue(String),
	#[error("style rule has an empty property: {0:?}")]
	EmptyProperty(String),
	#[error("style rule has an empty value: {0:?}")]
	EmptyValue(String),
	#[error("host refused style property {property:?} = {value:?}")]
	Refused { property: String, value: String },
}
impl StyleError {
	/// The offending rule segment.
	#[must_use]
	pub fn segment(&self) -> &str {
		match self {
			StyleError::MissingValue(segment) | StyleError::EmptyProperty(segment) | StyleError::EmptyValue(segment) => segment,
			StyleError::Refused { property, .. } => property,
		}
	}

	fn kind(&self) -> &'static str {
		match self {
			StyleError::MissingValue(_) => "missing value",
			StyleError::EmptyProperty(_) => "empty property",
			StyleError::EmptyValue(_) => "empty value",
			StyleError::Refused { .. } => "refused",
		}
	}
}

/// Receives rejected style rules.
pub trait StyleSink {
	fn rejected(&mut self, owner: &Identity, style: &str, error: StyleError);
}

/// Logs rejected rules as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;
impl StyleSink for TracingSink {
	fn rejected(&mut self, owner: &Identity, style: &str, error: StyleError) {
		if cfg!(feature = "dangerous-logging") {
			warn!("Invalid inline style for {}: {} (in {:?})", owner, error, style);
		} else {
			warn!("Invalid inline style ({}, {} byte(s)).", error.kind(), style.len());
		}
	}
}

/// Collects rejected rules, dropping the context.
impl StyleSink for Vec<StyleError> {
	fn rejected(&mut self, _: &Identity, _: &str, error: StyleError) {
		self.push(error);
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StyleReport {
	pub applied: usize,
	pub rejected: usize,
}

/// Splits `style` into rules. Empty rules are skipped silently.
pub fn parse_rules(style: &str) -> impl Iterator<Item = Result<StyleRule<'_>, StyleError>> {
	style.split(';').filter(|rule| !rule.trim().is_empty()).map(|rule| {
		let (property, value) = rule.split_once(':').ok_or_else(|| StyleError::MissingValue(rule.trim().to_owned()))?;
		let (property, value) = (property.trim(), value.trim());
		if property.is_empty() {
			Err(StyleError::EmptyProperty(rule.trim().to_owned()))
		} else if value.is_empty() {
			Err(StyleError::EmptyValue(rule.trim().to_owned()))
		} else {
			Ok(StyleRule { property, value })
		}
	})
}

/// Converts a hyphenated CSS property to the style surface's camel-case name.
///
/// `float` maps to `cssFloat`, or `styleFloat` on hosts with [`HostProfile::legacy_float`].
#[must_use]
pub fn css_property_name(property: &str, profile: HostProfile) -> String {
	let mut name = String::with_capacity(property.len());
	let mut capitalize = false;
	for c in property.chars() {
		if c == '-' {
			// This also capitalises vendor prefixes, e.g. `-webkit-…` becomes `Webkit…`.
			capitalize = true;
		} else if capitalize {
			name.extend(c.to_uppercase());
			capitalize = false;
		} else {
			name.push(c);
		}
	}

	if name == "float" {
		return if profile.legacy_float { "styleFloat" } else { "cssFloat" }.to_owned();
	}
	name
}

/// Applies each well-formed rule of `style` to `target`'s style surface.
///
/// Never fails: malformed rules and properties the host refuses are handed to `sink` and skipped.
pub fn apply_inline_style<H: HostSurface, S: StyleSink + ?Sized>(host: &mut H, target: &H::Handle, owner: &Identity, style: &str, profile: HostProfile, sink: &mut S) -> StyleReport {
	let mut report = StyleReport::default();
	for rule in parse_rules(style) {
		let rule = match rule {
			Ok(rule) => rule,
			Err(error) => {
				report.rejected += 1;
				sink.rejected(owner, style, error);
				continue;
			}
		};

		let name = css_property_name(rule.property, profile);
		match host.set_style_property(target, &name, rule.value) {
			Ok(()) => {
				trace!("Set style property {:?}.", name);
				report.applied += 1;
			}
			Err(host_error) => {
				error!("Failed to set style property {:?}: {:?}", name, host_error);
				report.rejected += 1;
				sink.rejected(
					owner,
					style,
					StyleError::Refused {
						property: name,
						value: rule.value.to_owned(),
					},
				);
			}
		}
	}
	report
}

#[cfg(test)]
mod tests {
	use super::{css_property_name, parse_rules, StyleError, StyleRule};
	use crate::config::HostProfile;

	#[test]
	fn skips_empty_and_incomplete_rules() {
		let rules: Vec<_> = parse_rules("color:red;;margin-top").collect();
		assert_eq!(
			rules,
			vec![Ok(StyleRule { property: "color", value: "red" }), Err(StyleError::MissingValue("margin-top".to_owned()))]
		);
	}

	#[test]
	fn later_rules_survive_malformed_ones() {
		let rules: Vec<_> = parse_rules(" : red ; width :; height: 10px ").collect();
		assert_eq!(
			rules,
			vec![
				Err(StyleError::EmptyProperty(": red".to_owned())),
				Err(StyleError::EmptyValue("width :".to_owned())),
				Ok(StyleRule { property: "height", value: "10px" }),
			]
		);
	}

	#[test]
	fn value_keeps_later_colons() {
		let rules: Vec<_> = parse_rules("background-image: url(http://example.com/a.png)").collect();
		assert_eq!(
			rules,
			vec![Ok(StyleRule {
				property: "background-image",
				value: "url(http://example.com/a.png)"
			})]
		);
	}

	#[test]
	fn camel_case() {
		let profile = HostProfile::standards();
		assert_eq!(css_property_name("margin-top", profile), "marginTop");
		assert_eq!(css_property_name("border-top-left-radius", profile), "borderTopLeftRadius");
		assert_eq!(css_property_name("color", profile), "color");
		assert_eq!(css_property_name("-webkit-box-sizing", profile), "WebkitBoxSizing");
	}

	#[test]
	fn float_depends_on_profile() {
		assert_eq!(css_property_name("float", HostProfile::standards()), "cssFloat");
		assert_eq!(css_property_name("float", HostProfile::quirks()), "styleFloat");
	}
}
