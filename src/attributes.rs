//! Attribute extraction from the loosely typed request input.
//!
//! The host hands over a nested key-value tree with optional groups
//! (`resourceInfo`, `subjectInfo`, `widgetInfo`, `deviceInfo`,
//! `environmentInfo`). Extraction is driven by constant field-to-category
//! tables: known fields are appended to their category, unknown fields are
//! ignored, and no field is individually required. Every category of the
//! fixed catalog is always present in the output, so downstream consumers
//! never need to distinguish "absent" from "empty".

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

/// Subject attribute categories, in catalog order.
///
/// The widget group and the device group also feed this set: a widget or a
/// peer device acts as the requesting subject from the policy's point of view.
pub const SUBJECT_CATEGORIES: [&str; 19] = [
    "user-id",
    "user-key-cn",
    "user-key-fingerprint",
    "user-key-root-cn",
    "user-key-root-fingerprint",
    "id",
    "distributor-key-cn",
    "distributor-key-fingerprint",
    "distributor-key-root-cn",
    "distributor-key-root-fingerprint",
    "author-key-cn",
    "author-key-fingerprint",
    "author-key-root-cn",
    "author-key-root-fingerprint",
    "target-id",
    "target-domain",
    "requestor-id",
    "requestor-domain",
    "webinos-enabled",
];

/// Resource attribute categories, in catalog order.
pub const RESOURCE_CATEGORIES: [&str; 4] =
    ["api-feature", "service-id", "device-cap", "param:feature"];

/// Environment attribute categories, in catalog order.
pub const ENVIRONMENT_CATEGORIES: [&str; 4] =
    ["profile", "timemin", "days-of-week", "days-of-month"];

// Field-to-category tables, one per input group.
const RESOURCE_FIELDS: [(&str, &str); 4] = [
    ("deviceCap", "device-cap"),
    ("apiFeature", "api-feature"),
    ("serviceId", "service-id"),
    ("paramFeature", "param:feature"),
];

const SUBJECT_FIELDS: [(&str, &str); 5] = [
    ("userId", "user-id"),
    ("userKeyCn", "user-key-cn"),
    ("userKeyFingerprint", "user-key-fingerprint"),
    ("userKeyRootCn", "user-key-root-cn"),
    ("userKeyRootFingerprint", "user-key-root-fingerprint"),
];

const WIDGET_FIELDS: [(&str, &str); 9] = [
    ("id", "id"),
    ("distributorKeyCn", "distributor-key-cn"),
    ("distributorKeyFingerprint", "distributor-key-fingerprint"),
    ("distributorKeyRootCn", "distributor-key-root-cn"),
    ("distributorKeyRootFingerprint", "distributor-key-root-fingerprint"),
    ("authorKeyCn", "author-key-cn"),
    ("authorKeyFingerprint", "author-key-fingerprint"),
    ("authorKeyRootCn", "author-key-root-cn"),
    ("authorKeyRootFingerprint", "author-key-root-fingerprint"),
];

const DEVICE_FIELDS: [(&str, &str); 5] = [
    ("targetId", "target-id"),
    ("targetDomain", "target-domain"),
    ("requestorId", "requestor-id"),
    ("requestorDomain", "requestor-domain"),
    ("webinosEnabled", "webinos-enabled"),
];

const ENVIRONMENT_FIELDS: [(&str, &str); 4] = [
    ("profile", "profile"),
    ("timemin", "timemin"),
    ("days-of-week", "days-of-week"),
    ("days-of-month", "days-of-month"),
];

const EMPTY: &[String] = &[];

/// A total mapping from a fixed category catalog to ordered string values.
///
/// Categories not populated by the input remain present with an empty
/// sequence, never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet {
    values: BTreeMap<&'static str, Vec<String>>,
}

impl AttributeSet {
    fn with_catalog(catalog: &[&'static str]) -> Self {
        let values = catalog.iter().map(|c| (*c, Vec::new())).collect();
        Self { values }
    }

    /// Returns the ordered values for a category.
    ///
    /// Unknown categories yield an empty slice, the same as known but
    /// unpopulated ones.
    pub fn values(&self, category: &str) -> &[String] {
        self.values.get(category).map_or(EMPTY, Vec::as_slice)
    }

    /// Returns `true` if no category holds any value.
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    /// Iterates over the catalog categories of this set.
    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    fn push(&mut self, category: &'static str, value: String) {
        debug!(category, %value, "extracted attribute");
        self.values.entry(category).or_default().push(value);
    }
}

/// Environment attributes: single string value per category.
///
/// Unpopulated categories read back as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentAttrs {
    values: BTreeMap<&'static str, String>,
}

impl EnvironmentAttrs {
    /// Returns the value for a category, or `""` if unpopulated or unknown.
    pub fn get(&self, category: &str) -> &str {
        self.values.get(category).map_or("", String::as_str)
    }

    /// Returns `true` if no category holds a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn set(&mut self, category: &'static str, value: String) {
        debug!(category, %value, "extracted environment attribute");
        self.values.insert(category, value);
    }
}

/// Renders a scalar leaf of the input tree as a string.
///
/// Strings pass through; booleans and numbers are stringified the way the
/// host's own string conversion would render them. Objects, arrays and null
/// are not attribute material and yield `None`.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn extract_group(
    input: &Value,
    group: &str,
    fields: &[(&str, &'static str)],
    set: &mut AttributeSet,
) {
    let Some(group_value) = input.get(group) else {
        return;
    };
    for &(field, category) in fields {
        if let Some(value) = group_value.get(field).and_then(scalar_string) {
            set.push(category, value);
        }
    }
}

/// Extracts the subject attribute set from the `subjectInfo`, `widgetInfo`
/// and `deviceInfo` groups.
pub fn extract_subject(input: &Value) -> AttributeSet {
    let mut set = AttributeSet::with_catalog(&SUBJECT_CATEGORIES);
    extract_group(input, "subjectInfo", &SUBJECT_FIELDS, &mut set);
    extract_group(input, "widgetInfo", &WIDGET_FIELDS, &mut set);
    extract_group(input, "deviceInfo", &DEVICE_FIELDS, &mut set);
    set
}

/// Extracts the resource attribute set from the `resourceInfo` group.
pub fn extract_resource(input: &Value) -> AttributeSet {
    let mut set = AttributeSet::with_catalog(&RESOURCE_CATEGORIES);
    extract_group(input, "resourceInfo", &RESOURCE_FIELDS, &mut set);
    set
}

/// Extracts the environment attributes from the `environmentInfo` group.
pub fn extract_environment(input: &Value) -> EnvironmentAttrs {
    let mut attrs = EnvironmentAttrs::default();
    let Some(group_value) = input.get("environmentInfo") else {
        return attrs;
    };
    for &(field, category) in &ENVIRONMENT_FIELDS {
        if let Some(value) = group_value.get(field).and_then(scalar_string) {
            attrs.set(category, value);
        }
    }
    attrs
}
