use std::env;

use kubestate::kubestate::config::{Config, LabelsAllowList, Options};
use kubestate::kubestate::logger::{self, LogFormat};
use kubestate::kubestate::metric::filter::{FamilyDescriptor, FamilyGeneratorFilter};
use kubestate::kubestate::metric::labels::AllowList;
use serial_test::serial;

const ALL: [Config; 6] = [
    Config::LabelsAllowList,
    Config::AnnotationsAllowList,
    Config::MetricAllowList,
    Config::MetricDenyList,
    Config::MetricOptInList,
    Config::LogFormat,
];

fn clear_env() {
    for config in ALL {
        env::remove_var(config.env_var());
    }
}

#[test]
#[serial]
fn defaults_apply_without_environment() {
    clear_env();
    let options = Options::from_env().expect("defaults parse");

    assert!(options.labels_allow_list.is_empty());
    assert!(options.annotations_allow_list.is_empty());
    assert!(options.metric_allow_list.is_empty());
    assert_eq!(options.log_format, LogFormat::Text);
    assert_eq!(options.labels_allow_list.allow_list("namespaces"), AllowList::none());
}

#[test]
#[serial]
fn reads_every_parameter() {
    clear_env();
    env::set_var(Config::LabelsAllowList.env_var(), "namespaces=[*],configmaps=[app]");
    env::set_var(Config::AnnotationsAllowList.env_var(), "configmaps=[owner]");
    env::set_var(Config::MetricDenyList.env_var(), "kube_configmap_annotations");
    env::set_var(Config::MetricOptInList.env_var(), "kube_namespace_.*");
    env::set_var(Config::LogFormat.env_var(), "json");

    let options = Options::from_env().expect("environment parses");
    clear_env();

    assert_eq!(
        options.labels_allow_list,
        LabelsAllowList::parse("configmaps=[app],namespaces=[*]").expect("valid")
    );
    assert_eq!(
        options.labels_allow_list.allow_list("namespaces"),
        AllowList::Wildcard
    );
    assert_eq!(
        options.annotations_allow_list.allow_list("configmaps"),
        AllowList::keys(["owner"])
    );
    assert_eq!(options.metric_deny_list, ["kube_configmap_annotations"]);
    assert_eq!(options.metric_opt_in_list, ["kube_namespace_.*"]);
    assert_eq!(options.log_format, LogFormat::Json);

    let filter = options.family_filter().expect("valid filter");
    assert!(!filter.test(&FamilyDescriptor {
        name: "kube_configmap_annotations",
        opt_in: false,
    }));
    assert!(filter.test(&FamilyDescriptor {
        name: "kube_namespace_created",
        opt_in: true,
    }));
}

#[test]
#[serial]
fn malformed_allow_list_names_the_variable() {
    clear_env();
    env::set_var(Config::LabelsAllowList.env_var(), "pods=[app,]");
    let err = Options::from_env().expect_err("malformed allow list");
    clear_env();

    let message = err.to_string();
    assert!(message.contains("KUBESTATE_METRIC_LABELS_ALLOWLIST"), "{message}");
    assert!(message.contains("pods=[app,]"), "{message}");
}

#[test]
#[serial]
fn unsupported_log_format_is_rejected() {
    clear_env();
    env::set_var(Config::LogFormat.env_var(), "yaml");
    let err = Options::from_env().expect_err("bad log format");
    clear_env();

    assert!(err.to_string().contains("KUBESTATE_LOG_FORMAT"));
}

#[test]
#[serial]
fn json_log_format_from_environment_is_installed() {
    clear_env();
    env::set_var(Config::LogFormat.env_var(), "json");
    let options = Options::from_env().expect("json parses");
    clear_env();

    options.init_logging();
    assert_eq!(logger::current_log_format(), LogFormat::Json);

    logger::set_log_format(LogFormat::Text);
}

#[test]
fn unset_variables_fall_back_to_defaults() {
    assert_eq!(Config::LogFormat.default_value(), "text");
    assert_eq!(Config::MetricAllowList.default_value(), "");
    assert_eq!(Config::MetricOptInList.env_var(), "KUBESTATE_METRIC_OPT_IN_LIST");
}
