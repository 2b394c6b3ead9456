// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::BTreeMap;

use peniko::color::{AlphaColor, Srgb};

/// The value of one symbol modifier or retriever parameter.
///
/// Equality and hashing are structural. Floating point payloads compare by bit pattern so
/// values can be used inside cache keys.
#[derive(Clone, Debug)]
pub enum ModifierValue {
    /// Free text.
    Text(String),
    /// A plain number.
    Number(f64),
    /// An angle in degrees, clockwise from north.
    Angle(f64),
    /// An on/off switch.
    Flag(bool),
    /// A color.
    Color(AlphaColor<Srgb>),
    /// Several values for a modifier that may appear more than once.
    List(Vec<ModifierValue>),
}

impl ModifierValue {
    /// Returns the text payload, if this is [`ModifierValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this is [`ModifierValue::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the angle in degrees, if this is [`ModifierValue::Angle`].
    pub fn as_angle(&self) -> Option<f64> {
        match self {
            Self::Angle(a) => Some(*a),
            _ => None,
        }
    }

    /// Returns the flag, if this is [`ModifierValue::Flag`].
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list items, if this is [`ModifierValue::List`].
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this value carries nothing worth displaying.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl PartialEq for ModifierValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) | (Self::Angle(a), Self::Angle(b)) => {
                a.to_bits() == b.to_bits()
            }
            (Self::Flag(a), Self::Flag(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => color_bits(a) == color_bits(b),
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ModifierValue {}

impl Hash for ModifierValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::Text(s) => s.hash(state),
            Self::Number(n) | Self::Angle(n) => n.to_bits().hash(state),
            Self::Flag(b) => b.hash(state),
            Self::Color(c) => color_bits(c).hash(state),
            Self::List(items) => items.hash(state),
        }
    }
}

fn color_bits(color: &AlphaColor<Srgb>) -> [u32; 4] {
    color.components.map(f32::to_bits)
}

impl fmt::Display for ModifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Angle(a) => write!(f, "{a}\u{b0}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Color(c) => {
                let rgba = c.to_rgba8();
                write!(f, "#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
            }
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ModifierValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for ModifierValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for ModifierValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ModifierValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<AlphaColor<Srgb>> for ModifierValue {
    fn from(value: AlphaColor<Srgb>) -> Self {
        Self::Color(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ModifierValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// An ordered set of keyed modifier values.
///
/// Used both for the modifiers a caller attaches to a symbol and for the parameters handed to an
/// icon retriever. Iteration order is the key order, so two sets with the same entries compare
/// and hash equal regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    entries: BTreeMap<String, ModifierValue>,
}

impl Modifiers {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ModifierValue>,
    ) -> Option<ModifierValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder form of [`Modifiers::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ModifierValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ModifierValue> {
        self.entries.remove(key)
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&ModifierValue> {
        self.entries.get(key)
    }

    /// Whether `key` is present, whatever its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the text value for `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ModifierValue::as_text)
    }

    /// Returns the numeric value for `key`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ModifierValue::as_number)
    }

    /// Returns the angle value for `key`, in degrees.
    pub fn angle(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ModifierValue::as_angle)
    }

    /// Returns the flag value for `key`.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ModifierValue::as_flag)
    }

    /// Copies every entry of `other` into this set, replacing existing keys.
    pub fn extend_from(&mut self, other: &Self) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModifierValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<String>, V: Into<ModifierValue>> FromIterator<(K, V)> for Modifiers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = Modifiers::new().with("a", 1.0).with("b", "text");
        let b = Modifiers::new().with("b", "text").with("a", 1.0);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_number_and_angle_are_distinct() {
        assert_ne!(ModifierValue::Number(45.0), ModifierValue::Angle(45.0));
        assert_eq!(ModifierValue::Angle(45.0), ModifierValue::Angle(45.0));
    }

    #[test]
    fn test_list_display_joins_with_spaces() {
        let value = ModifierValue::from(vec!["A", "B"]);
        assert_eq!(value.to_string(), "A B");
        assert!(ModifierValue::from("  ").is_empty());
    }
}
