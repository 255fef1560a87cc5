use kubestate::kubestate::metric::family::{format_value, Metric, MetricType};
use kubestate::kubestate::metric::filter::{
    AllowDenyList, CompositeFilter, FamilyGeneratorFilter, OptInFilter,
};
use kubestate::kubestate::metric::generator::{FamilyGenerator, FamilySet, Stability};
use kubestate::kubestate::metric::labels::LabelPairs;

struct Gadget {
    name: String,
    owner: String,
    size: f64,
}

fn gadget(name: &str, size: f64) -> Gadget {
    Gadget {
        name: name.to_string(),
        owner: "team \"blue\"".to_string(),
        size,
    }
}

fn gadget_set() -> FamilySet<Gadget> {
    FamilySet::new(
        |g: &Gadget| LabelPairs::single("gadget", g.name.clone()),
        vec![
            FamilyGenerator::new(
                "kube_gadget_size_bytes",
                "Size of the gadget.",
                MetricType::Gauge,
                Stability::Stable,
                |g: &Gadget| vec![Metric::new(g.size)],
            ),
            FamilyGenerator::new(
                "kube_gadget_owner",
                "Owner of the gadget.",
                MetricType::Gauge,
                Stability::Alpha,
                |g: &Gadget| {
                    vec![Metric::with_labels(
                        LabelPairs::single("owner", g.owner.clone()),
                        1.0,
                    )]
                },
            )
            .deprecated("2.5.0"),
            FamilyGenerator::new(
                "kube_gadget_restarts_total",
                "Restarts of the gadget.",
                MetricType::Counter,
                Stability::Alpha,
                |_: &Gadget| vec![Metric::new(3.0)],
            )
            .opt_in(),
        ],
    )
}

#[test]
fn renders_headers_and_samples_per_family() {
    let text = gadget_set().render(&gadget("g1", 1_500_000_000.0));
    assert_eq!(
        text,
        "# HELP kube_gadget_size_bytes [STABLE] Size of the gadget.\n\
         # TYPE kube_gadget_size_bytes gauge\n\
         kube_gadget_size_bytes{gadget=\"g1\"} 1.5e+09\n\
         # HELP kube_gadget_owner (Deprecated since 2.5.0) Owner of the gadget.\n\
         # TYPE kube_gadget_owner gauge\n\
         kube_gadget_owner{gadget=\"g1\",owner=\"team \\\"blue\\\"\"} 1\n\
         # HELP kube_gadget_restarts_total Restarts of the gadget.\n\
         # TYPE kube_gadget_restarts_total counter\n\
         kube_gadget_restarts_total{gadget=\"g1\"} 3\n"
    );
}

#[test]
fn identity_labels_lead_every_sample() {
    let families = gadget_set().generate(&gadget("g2", 4.0));
    assert_eq!(families.len(), 3);
    for family in &families {
        for metric in &family.metrics {
            assert_eq!(metric.labels.keys()[0], "gadget");
            assert_eq!(metric.labels.values()[0], "g2");
        }
    }
}

#[test]
fn opt_in_families_need_a_matching_pattern() {
    let set = gadget_set();
    let without = set.filtered(&OptInFilter::default());
    assert_eq!(without.len(), 2);

    let opted =
        OptInFilter::new(&["kube_gadget_restarts_.*".to_string()]).expect("valid pattern");
    assert_eq!(set.filtered(&opted).len(), 3);
}

#[test]
fn deny_list_removes_families_and_keeps_order() {
    let deny = AllowDenyList::new(&[], &["owner".to_string()]).expect("valid deny list");
    let filters: Vec<Box<dyn FamilyGeneratorFilter>> =
        vec![Box::new(deny), Box::new(OptInFilter::default())];
    let filter = CompositeFilter::new(filters);
    let set = gadget_set().filtered(&filter);

    let names = set
        .generators()
        .iter()
        .map(|generator| generator.name().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, ["kube_gadget_size_bytes"]);
}

#[test]
fn allow_list_keeps_only_matches() {
    let allow =
        AllowDenyList::new(&["^kube_gadget_size".to_string()], &[]).expect("valid allow list");
    assert!(allow.is_included("kube_gadget_size_bytes"));
    assert!(allow.is_excluded("kube_gadget_owner"));
    assert!(allow.status().contains("^kube_gadget_size"));
}

#[test]
fn deny_list_accepts_lookahead_patterns() {
    let deny = AllowDenyList::new(&[], &["^kube_gadget_(?!size_bytes).*".to_string()])
        .expect("lookahead pattern compiles");
    let set = gadget_set().filtered(&deny);

    let names = set
        .generators()
        .iter()
        .map(|generator| generator.name().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, ["kube_gadget_size_bytes"]);
}

#[test]
fn allow_and_deny_are_exclusive() {
    let result = AllowDenyList::new(&["a".to_string()], &["b".to_string()]);
    let err = result.expect_err("allow and deny together");
    assert!(err.to_string().contains("mutually exclusive"));
}

#[test]
fn invalid_patterns_are_reported() {
    let err = AllowDenyList::new(&["kube_(".to_string()], &[]).expect_err("bad regex");
    assert!(err.to_string().contains("kube_("));
}

#[test]
fn values_follow_go_shortest_format() {
    let cases = [
        (1.0, "1"),
        (0.5, "0.5"),
        (10596.0, "10596"),
        (123456.0, "123456"),
        (1_000_000.0, "1e+06"),
        (1_501_569_018.0, "1.501569018e+09"),
        (0.0001, "0.0001"),
        (0.00001, "1e-05"),
        (-2.5, "-2.5"),
        (f64::NAN, "NaN"),
        (f64::INFINITY, "+Inf"),
        (f64::NEG_INFINITY, "-Inf"),
    ];
    for (value, expected) in cases {
        assert_eq!(format_value(value), expected, "formatting {value}");
    }
}
