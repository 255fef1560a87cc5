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

use crate::kubestate::families::cluster_identity;
use crate::kubestate::families::metadata::{ANNOTATIONS_HELP, LABELS_HELP};
use crate::kubestate::k8s::namespace::{Namespace, NamespacePhase};
use crate::kubestate::metric::condition::{expand_raw_condition, ConditionStatus};
use crate::kubestate::metric::family::{bool_float, Metric, MetricType};
use crate::kubestate::metric::generator::{FamilyGenerator, FamilySet, Stability};
use crate::kubestate::metric::labels::{
    attribute_metrics, merge_label_pairs, AllowList, EmptyAllowList, LabelPairs,
};

/// Families exposed for every Namespace, identified by the `namespace`
/// label.
///
/// Unlike the generic metadata families, the label and annotation families
/// still emit a bare sample while their allow list is empty.
pub fn namespace_families(
    allow_annotations: AllowList,
    allow_labels: AllowList,
) -> FamilySet<Namespace> {
    FamilySet::new(
        cluster_identity("namespace"),
        vec![
            FamilyGenerator::new(
                "kube_namespace_created",
                "Unix creation timestamp",
                MetricType::Gauge,
                Stability::Stable,
                |namespace: &Namespace| {
                    namespace
                        .metadata
                        .creation_timestamp
                        .map(|created| Metric::new(created.timestamp() as f64))
                        .into_iter()
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_namespace_annotations",
                ANNOTATIONS_HELP,
                MetricType::Gauge,
                Stability::Alpha,
                move |namespace: &Namespace| {
                    attribute_metrics(
                        "annotation",
                        &namespace.metadata.annotations,
                        &allow_annotations,
                        EmptyAllowList::PresenceMarker,
                    )
                },
            ),
            FamilyGenerator::new(
                "kube_namespace_labels",
                LABELS_HELP,
                MetricType::Gauge,
                Stability::Stable,
                move |namespace: &Namespace| {
                    attribute_metrics(
                        "label",
                        &namespace.metadata.labels,
                        &allow_labels,
                        EmptyAllowList::PresenceMarker,
                    )
                },
            ),
            FamilyGenerator::new(
                "kube_namespace_status_phase",
                "kubernetes namespace status phase.",
                MetricType::Gauge,
                Stability::Stable,
                |namespace: &Namespace| {
                    NamespacePhase::ALL
                        .iter()
                        .map(|phase| {
                            Metric::with_labels(
                                LabelPairs::single("phase", phase.as_str()),
                                bool_float(namespace.status.phase == Some(*phase)),
                            )
                        })
                        .collect()
                },
            ),
            FamilyGenerator::new(
                "kube_namespace_status_condition",
                "The condition of a namespace.",
                MetricType::Gauge,
                Stability::Alpha,
                |namespace: &Namespace| {
                    let conditions = &namespace.status.conditions;
                    let mut metrics =
                        Vec::with_capacity(conditions.len() * ConditionStatus::ALL.len());
                    for condition in conditions {
                        let condition_label =
                            LabelPairs::single("condition", condition.condition_type.as_str());
                        for mut metric in expand_raw_condition(&condition.status) {
                            metric.labels = merge_label_pairs(&[&condition_label, &metric.labels]);
                            metrics.push(metric);
                        }
                    }
                    metrics
                },
            ),
        ],
    )
}
