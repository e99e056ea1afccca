//! Payload masking applied before anything reaches the audit store.

use regex::{NoExpand, Regex};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Default token substituted for a masked value.
pub const DEFAULT_MASK_TOKEN: &str = "***MASKED***";

/// Rewrites every match of `pattern` inside string values.
#[derive(Debug, Clone)]
pub struct ValueMask {
    /// What to find.
    pub pattern: Regex,
    /// What to put in its place.
    pub replacement: String,
}

impl ValueMask {
    /// Creates a value mask.
    #[must_use]
    pub fn new(pattern: Regex, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
        }
    }
}

/// A [`ValueMask`] applied only beneath keys containing `fragment`.
#[derive(Debug, Clone)]
pub struct KeyedValueMask {
    fragment: String,
    mask: ValueMask,
}

/// Masking rules contributed by a pack or a contract.
#[derive(Debug, Clone, Default)]
pub struct MaskingRules {
    keys: BTreeSet<String>,
    value_masks: Vec<ValueMask>,
    keyed_masks: Vec<KeyedValueMask>,
}

/// Folds a key to its comparison form: ASCII lowercase with `-` read as `_`.
fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase().replace('-', "_")
}

impl MaskingRules {
    /// Adds object keys whose values are replaced wholesale. Matching is
    /// case-insensitive and treats `-` and `_` as the same character.
    #[must_use]
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keys
            .extend(keys.into_iter().map(|key| normalize_key(key.as_ref())));
        self
    }

    /// Adds a pattern rewritten inside scalar values whose key contains
    /// `fragment`.
    #[must_use]
    pub fn with_keyed_mask(mut self, fragment: &str, mask: ValueMask) -> Self {
        self.keyed_masks.push(KeyedValueMask {
            fragment: normalize_key(fragment),
            mask,
        });
        self
    }

    /// Adds a pattern rewritten inside every string value.
    #[must_use]
    pub fn with_value_mask(mut self, mask: ValueMask) -> Self {
        self.value_masks.push(mask);
        self
    }

    /// Folds `other` into these rules.
    pub fn merge(&mut self, other: Self) {
        self.keys.extend(other.keys);
        self.value_masks.extend(other.value_masks);
        self.keyed_masks.extend(other.keyed_masks);
    }

    /// Returns the masked keys.
    #[must_use]
    pub const fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }
}

/// Applies [`MaskingRules`] to payloads and metadata.
///
/// # Examples
///
/// ```
/// use handoff_guard::policy::{MaskingRules, PayloadMasker};
/// use serde_json::json;
///
/// let masker = PayloadMasker::new(MaskingRules::default().with_keys(["ssn"]), "***");
/// let masked = masker.mask(&json!({"ssn": "111-22-3333", "name": "Ada"}));
/// assert_eq!(masked, json!({"ssn": "***", "name": "Ada"}));
/// ```
#[derive(Debug, Clone)]
pub struct PayloadMasker {
    rules: MaskingRules,
    token: String,
}

impl PayloadMasker {
    /// Creates a masker that substitutes `token` for masked keys.
    #[must_use]
    pub fn new(rules: MaskingRules, token: impl Into<String>) -> Self {
        Self {
            rules,
            token: token.into(),
        }
    }

    /// Returns a masked copy of `value`.
    #[must_use]
    pub fn mask(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.mask_map(map)),
            Value::Array(items) => Value::Array(items.iter().map(|item| self.mask(item)).collect()),
            Value::String(text) => Value::String(self.mask_text(text).into_owned()),
            other => other.clone(),
        }
    }

    /// Returns a masked copy of an object.
    #[must_use]
    pub fn mask_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .map(|(key, value)| {
                let normalized = normalize_key(key);
                let masked = if self.rules.keys.contains(&normalized) {
                    Value::String(self.token.clone())
                } else {
                    self.mask_keyed(&normalized, value)
                };
                (key.clone(), masked)
            })
            .collect()
    }

    fn mask_keyed(&self, key: &str, value: &Value) -> Value {
        let text = match value {
            Value::String(raw) => Cow::Borrowed(raw.as_str()),
            Value::Number(number) => Cow::Owned(number.to_string()),
            other => return self.mask(other),
        };
        let mut result = text.clone();
        for keyed in self
            .rules
            .keyed_masks
            .iter()
            .filter(|keyed| key.contains(keyed.fragment.as_str()))
        {
            result = Cow::Owned(apply(&keyed.mask, &result).into_owned());
        }
        if result == text {
            return self.mask(value);
        }
        Value::String(self.mask_text(&result).into_owned())
    }

    fn mask_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut result = Cow::Borrowed(text);
        for mask in &self.rules.value_masks {
            if mask.pattern.is_match(&result) {
                result = Cow::Owned(apply(mask, &result).into_owned());
            }
        }
        result
    }
}

fn apply<'a>(mask: &ValueMask, text: &'a str) -> Cow<'a, str> {
    mask.pattern.replace_all(text, NoExpand(&mask.replacement))
}
