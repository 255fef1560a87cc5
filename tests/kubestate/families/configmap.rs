use kubestate::kubestate::families::configmap::configmap_families;
use kubestate::kubestate::k8s::configmap::ConfigMap;
use kubestate::kubestate::metric::family::Family;
use kubestate::kubestate::metric::labels::AllowList;
use serde_json::json;

fn configmap(metadata: serde_json::Value) -> ConfigMap {
    serde_json::from_value(json!({ "metadata": metadata, "data": { "key": "value" } }))
        .expect("valid configmap")
}

fn family<'a>(families: &'a [Family], name: &str) -> &'a Family {
    families
        .iter()
        .find(|family| family.name == name)
        .unwrap_or_else(|| panic!("family {name} missing"))
}

#[test]
fn unset_creation_timestamp_emits_no_created_sample() {
    let object = configmap(json!({ "name": "settings", "namespace": "ns1" }));
    let families = configmap_families(AllowList::none(), AllowList::none()).generate(&object);

    assert!(family(&families, "kube_configmap_created").is_empty());
    assert_eq!(
        family(&families, "kube_configmap_info").to_text(),
        "kube_configmap_info{namespace=\"ns1\",configmap=\"settings\"} 1\n"
    );
}

#[test]
fn non_numeric_resource_version_emits_nothing() {
    let object = configmap(json!({
        "name": "settings",
        "namespace": "ns1",
        "resourceVersion": "abcdef"
    }));
    let families = configmap_families(AllowList::none(), AllowList::none()).generate(&object);
    assert!(family(&families, "kube_configmap_metadata_resource_version").is_empty());
}

#[test]
fn numeric_resource_version_is_the_sample_value() {
    let object = configmap(json!({
        "name": "settings",
        "namespace": "ns1",
        "resourceVersion": "10596"
    }));
    let families = configmap_families(AllowList::none(), AllowList::none()).generate(&object);
    let version = family(&families, "kube_configmap_metadata_resource_version");
    assert_eq!(version.metrics.len(), 1);
    assert_eq!(version.metrics[0].value, 10596.0);
}

#[test]
fn allowed_annotations_and_labels_become_labels() {
    let object = configmap(json!({
        "name": "settings",
        "namespace": "ns1",
        "labels": { "app": "foo", "tier": "web" },
        "annotations": { "kubernetes.io/change-cause": "rollout", "ignored": "x" }
    }));
    let set = configmap_families(
        AllowList::keys(["kubernetes.io/change-cause"]),
        AllowList::Wildcard,
    );
    let families = set.generate(&object);

    assert_eq!(
        family(&families, "kube_configmap_annotations").to_text(),
        "kube_configmap_annotations{namespace=\"ns1\",configmap=\"settings\",\
         annotation_kubernetes_io_change_cause=\"rollout\"} 1\n"
    );
    assert_eq!(
        family(&families, "kube_configmap_labels").to_text(),
        "kube_configmap_labels{namespace=\"ns1\",configmap=\"settings\",\
         label_app=\"foo\",label_tier=\"web\"} 1\n"
    );
}

#[test]
fn deletion_timestamp_is_rendered_when_set() {
    let object = configmap(json!({
        "name": "settings",
        "namespace": "ns1",
        "deletionTimestamp": "2017-08-01T06:30:18Z"
    }));
    let families = configmap_families(AllowList::none(), AllowList::none()).generate(&object);
    assert_eq!(
        family(&families, "kube_configmap_deletion_timestamp").to_text(),
        "kube_configmap_deletion_timestamp{namespace=\"ns1\",configmap=\"settings\"} 1.501569018e+09\n"
    );
}

#[test]
fn headers_follow_registration_order() {
    let headers = configmap_families(AllowList::none(), AllowList::none()).headers();
    assert_eq!(headers.len(), 6);
    assert_eq!(
        headers[0],
        "# HELP kube_configmap_info [STABLE] Information about configmap.\n\
         # TYPE kube_configmap_info gauge"
    );
    assert_eq!(
        headers[5],
        "# HELP kube_configmap_metadata_resource_version \
         Resource version representing a specific version of the configmap.\n\
         # TYPE kube_configmap_metadata_resource_version gauge"
    );
}
