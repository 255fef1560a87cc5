/*
 * Copyright (C) 2024 The Kubestate Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Conversion of free-form Kubernetes key/value maps (labels and
//! annotations) into Prometheus label pairs.
//!
//! Every derived label key is sanitized, prefixed (`label_`, `annotation_`)
//! and emitted in byte order of the original key so the output does not
//! depend on map iteration order. Keys that collapse onto the same label
//! name after sanitization are suffixed with `_conflictN`.

use std::borrow::Cow;
use std::collections::HashMap;

use super::family::Metric;

/// Allow-list entry that admits every key present on the object.
pub const LABEL_WILDCARD: &str = "*";

/// Ordered label keys with their values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelPairs {
    keys: Vec<String>,
    values: Vec<String>,
}

impl LabelPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Builds pairs from parallel key and value vectors.
    ///
    /// Panics when the vectors differ in length.
    pub fn from_parts(keys: Vec<String>, values: Vec<String>) -> Self {
        assert_eq!(
            keys.len(),
            values.len(),
            "label keys and values must have the same length"
        );
        Self { keys, values }
    }

    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut pairs = Self::with_capacity(1);
        pairs.push(key, value);
        pairs
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.keys.push(key.into());
        self.values.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys
            .iter()
            .position(|candidate| candidate == key)
            .map(|index| self.values[index].as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

impl<K, V> FromIterator<(K, V)> for LabelPairs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs = LabelPairs::new();
        for (key, value) in iter {
            pairs.push(key, value);
        }
        pairs
    }
}

/// Keys of an object's labels or annotations that may become metric labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllowList {
    Keys(Vec<String>),
    Wildcard,
}

impl Default for AllowList {
    fn default() -> Self {
        AllowList::Keys(Vec::new())
    }
}

impl AllowList {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// Interprets configured entries; a `*` anywhere turns the list into a
    /// wildcard.
    pub fn from_entries(entries: Vec<String>) -> Self {
        if entries.iter().any(|entry| entry == LABEL_WILDCARD) {
            AllowList::Wildcard
        } else {
            AllowList::Keys(entries)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AllowList::Keys(keys) if keys.is_empty())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, AllowList::Wildcard)
    }
}

/// What an attribute-derived family emits when its allow list is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyAllowList {
    /// No sample at all.
    Suppress,
    /// A single sample without derived labels, marking the object as present.
    PresenceMarker,
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_` and converts
/// camelCase boundaries to snake_case.
pub fn sanitize_label_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for ch in name.chars() {
        let ch = if ch.is_ascii_alphanumeric() || ch == '_' {
            ch
        } else {
            '_'
        };
        if ch.is_ascii_uppercase()
            && previous.is_some_and(|prev| prev.is_ascii_lowercase() || prev.is_ascii_digit())
        {
            sanitized.push('_');
        }
        sanitized.push(ch.to_ascii_lowercase());
        previous = Some(ch);
    }
    sanitized
}

fn label_name(prefix: &str, key: &str) -> String {
    format!("{prefix}_{}", sanitize_label_name(key))
}

fn conflict_suffix(label: &str, count: usize) -> String {
    format!("{label}_conflict{count}")
}

struct Conflict {
    // label keys seen so far for this name
    count: usize,
    // position of the first one, renamed once a second shows up
    initial: usize,
}

/// Converts a Kubernetes map into prefixed, collision-free label pairs.
///
/// Keys are processed in byte order. When several keys sanitize to the same
/// label name, all of them get a `_conflictN` suffix numbered in that order.
pub fn map_to_label_pairs(prefix: &str, attributes: &HashMap<String, String>) -> LabelPairs {
    let mut sorted: Vec<(&String, &String)> = attributes.iter().collect();
    sorted.sort_unstable_by(|left, right| left.0.cmp(right.0));

    let mut pairs = LabelPairs::with_capacity(sorted.len());
    let mut conflicts: HashMap<String, Conflict> = HashMap::new();

    for (key, value) in sorted {
        let base = label_name(prefix, key);
        let label_key = if let Some(conflict) = conflicts.get_mut(&base) {
            if conflict.count == 1 {
                let renamed = conflict_suffix(&pairs.keys[conflict.initial], 1);
                pairs.keys[conflict.initial] = renamed;
            }
            conflict.count += 1;
            conflict_suffix(&base, conflict.count)
        } else {
            conflicts.insert(
                base.clone(),
                Conflict {
                    count: 1,
                    initial: pairs.len(),
                },
            );
            base
        };
        pairs.push(label_key, value.as_str());
    }

    pairs
}

/// Restricts `attributes` to the keys admitted by `allow`.
pub fn filter_allowed<'a>(
    attributes: &'a HashMap<String, String>,
    allow: &AllowList,
) -> Cow<'a, HashMap<String, String>> {
    match allow {
        AllowList::Wildcard => Cow::Borrowed(attributes),
        AllowList::Keys(keys) => Cow::Owned(
            keys.iter()
                .filter_map(|key| {
                    attributes
                        .get_key_value(key)
                        .map(|(key, value)| (key.clone(), value.clone()))
                })
                .collect(),
        ),
    }
}

/// Filters `attributes` through `allow` and converts the survivors into
/// prefixed label pairs.
pub fn allowed_label_pairs(
    prefix: &str,
    attributes: &HashMap<String, String>,
    allow: &AllowList,
) -> LabelPairs {
    map_to_label_pairs(prefix, &filter_allowed(attributes, allow))
}

/// Concatenates label pairs in argument order.
pub fn merge_label_pairs(segments: &[&LabelPairs]) -> LabelPairs {
    let capacity = segments.iter().map(|segment| segment.len()).sum();
    let mut merged = LabelPairs::with_capacity(capacity);
    for segment in segments {
        merged.keys.extend(segment.keys.iter().cloned());
        merged.values.extend(segment.values.iter().cloned());
    }
    merged
}

/// Produces the single `*_labels` / `*_annotations` style sample for an
/// object, or nothing when the allow list is empty and the family
/// suppresses.
pub fn attribute_metrics(
    prefix: &str,
    attributes: &HashMap<String, String>,
    allow: &AllowList,
    on_empty: EmptyAllowList,
) -> Vec<Metric> {
    if allow.is_empty() && on_empty == EmptyAllowList::Suppress {
        return Vec::new();
    }
    vec![Metric::with_labels(
        allowed_label_pairs(prefix, attributes, allow),
        1.0,
    )]
}
