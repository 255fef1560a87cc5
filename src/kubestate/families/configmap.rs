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

use crate::kubestate::families::metadata::metadata_families;
use crate::kubestate::families::namespaced_identity;
use crate::kubestate::k8s::configmap::ConfigMap;
use crate::kubestate::metric::family::{Metric, MetricType};
use crate::kubestate::metric::generator::{FamilyGenerator, FamilySet, Stability};
use crate::kubestate::metric::labels::AllowList;

/// `kube_configmap_info` followed by the metadata families, identified by
/// `namespace` and `configmap`.
pub fn configmap_families(
    allow_annotations: AllowList,
    allow_labels: AllowList,
) -> FamilySet<ConfigMap> {
    let mut generators = vec![FamilyGenerator::new(
        "kube_configmap_info",
        "Information about configmap.",
        MetricType::Gauge,
        Stability::Stable,
        |_: &ConfigMap| vec![Metric::new(1.0)],
    )];
    generators.extend(metadata_families(
        "kube_configmap",
        allow_annotations,
        allow_labels,
    ));
    FamilySet::new(namespaced_identity("configmap"), generators)
}
