use std::collections::HashMap;

use kubestate::kubestate::metric::condition::{expand_condition, ConditionStatus};
use kubestate::kubestate::metric::labels::{
    allowed_label_pairs, filter_allowed, map_to_label_pairs, merge_label_pairs,
    sanitize_label_name, AllowList, LabelPairs,
};
use proptest::collection::{hash_map, vec};
use proptest::prelude::*;

fn attributes(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn attribute_map() -> impl Strategy<Value = HashMap<String, String>> {
    hash_map("[a-zA-Z0-9._/-]{1,12}", "[ -~]{0,8}", 0..12)
}

fn label_pairs() -> impl Strategy<Value = LabelPairs> {
    vec(("[a-z_]{1,8}", "[ -~]{0,8}"), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect::<LabelPairs>())
}

#[test]
fn colliding_keys_get_conflict_suffixes_in_key_order() {
    let pairs = map_to_label_pairs(
        "label",
        &attributes(&[("a_b", "x"), ("a-b", "y"), ("a.b", "z")]),
    );

    assert_eq!(
        pairs.keys(),
        [
            "label_a_b_conflict1",
            "label_a_b_conflict2",
            "label_a_b_conflict3"
        ]
    );
    assert_eq!(pairs.values(), ["y", "z", "x"]);
}

#[test]
fn two_colliding_keys_rewrite_the_first() {
    let pairs = map_to_label_pairs(
        "annotation",
        &attributes(&[("team.name", "a"), ("team-name", "b"), ("owner", "c")]),
    );
    assert_eq!(
        pairs.keys(),
        [
            "annotation_owner",
            "annotation_team_name_conflict1",
            "annotation_team_name_conflict2"
        ]
    );
    assert_eq!(pairs.values(), ["c", "b", "a"]);
}

#[test]
fn wildcard_passes_the_whole_map() {
    let attrs = attributes(&[("app", "foo"), ("tier", "web")]);
    assert_eq!(
        allowed_label_pairs("label", &attrs, &AllowList::Wildcard),
        map_to_label_pairs("label", &attrs)
    );
}

#[test]
fn explicit_allow_list_keeps_listed_keys_only() {
    let attrs = attributes(&[("app", "foo"), ("tier", "web")]);
    let pairs = allowed_label_pairs("label", &attrs, &AllowList::keys(["tier", "missing"]));
    assert_eq!(pairs.keys(), ["label_tier"]);
    assert_eq!(pairs.values(), ["web"]);

    assert!(allowed_label_pairs("label", &attrs, &AllowList::none()).is_empty());
}

#[test]
fn condition_expansion_orders_true_false_unknown() {
    for status in ConditionStatus::ALL {
        let metrics = expand_condition(status);
        let labels = metrics
            .iter()
            .map(|metric| metric.labels.get("status").unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["true", "false", "unknown"]);
        assert_eq!(metrics.iter().filter(|metric| metric.value == 1.0).count(), 1);
        assert_eq!(metrics.iter().filter(|metric| metric.value == 0.0).count(), 2);
    }
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(key in "\\PC{0,24}") {
        let once = sanitize_label_name(&key);
        prop_assert_eq!(sanitize_label_name(&once), once);
    }

    #[test]
    fn sanitized_names_use_label_charset(key in "\\PC{0,24}") {
        let sanitized = sanitize_label_name(&key);
        prop_assert!(sanitized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn builder_is_deterministic_and_keeps_arity(attrs in attribute_map()) {
        let mut entries = attrs.iter().collect::<Vec<_>>();
        entries.reverse();
        let rebuilt: HashMap<String, String> =
            entries.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let first = map_to_label_pairs("label", &attrs);
        let second = map_to_label_pairs("label", &rebuilt);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), attrs.len());
        prop_assert_eq!(first.values().len(), attrs.len());
    }

    #[test]
    fn filtered_keys_are_a_subset(attrs in attribute_map(), allowed in vec("[a-z.]{1,4}", 0..6)) {
        let allow = AllowList::Keys(allowed.clone());
        let filtered = filter_allowed(&attrs, &allow);
        for key in filtered.keys() {
            prop_assert!(allowed.contains(key));
            prop_assert!(attrs.contains_key(key));
        }
    }

    #[test]
    fn merge_concatenates(segments in vec(label_pairs(), 0..5)) {
        let refs = segments.iter().collect::<Vec<_>>();
        let merged = merge_label_pairs(&refs);

        let keys = segments
            .iter()
            .flat_map(|s| s.keys().iter().cloned())
            .collect::<Vec<_>>();
        let values = segments
            .iter()
            .flat_map(|s| s.values().iter().cloned())
            .collect::<Vec<_>>();
        prop_assert_eq!(merged.keys(), keys.as_slice());
        prop_assert_eq!(merged.values(), values.as_slice());
    }
}
