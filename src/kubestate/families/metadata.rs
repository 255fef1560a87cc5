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

//! Families every resource kind derives from its object metadata.

use crate::kubestate::k8s::meta::Resource;
use crate::kubestate::metric::family::{resource_version_metric, Metric, MetricType};
use crate::kubestate::metric::generator::{FamilyGenerator, Stability};
use crate::kubestate::metric::labels::{attribute_metrics, AllowList, EmptyAllowList};

pub const ANNOTATIONS_HELP: &str = "Kubernetes annotations converted to Prometheus labels.";
pub const LABELS_HELP: &str = "Kubernetes labels converted to Prometheus labels.";
const CREATION_HELP: &str = "Unix creation timestamp";
const DELETION_HELP: &str = "Unix deletion timestamp";

/// `<prefix>_created`, `<prefix>_deletion_timestamp`, `<prefix>_annotations`,
/// `<prefix>_labels` and `<prefix>_metadata_resource_version`.
///
/// The annotation and label families emit nothing while their allow list
/// is empty. The resource-version help names the resource after the
/// prefix, e.g. `kube_configmap` gives "... version of the configmap.".
pub fn metadata_families<T>(
    prefix: &str,
    allow_annotations: AllowList,
    allow_labels: AllowList,
) -> Vec<FamilyGenerator<T>>
where
    T: Resource + 'static,
{
    vec![
        FamilyGenerator::new(
            format!("{prefix}_created"),
            CREATION_HELP,
            MetricType::Gauge,
            Stability::Stable,
            |object: &T| {
                object
                    .metadata()
                    .creation_timestamp
                    .map(|created| Metric::new(created.timestamp() as f64))
                    .into_iter()
                    .collect()
            },
        ),
        FamilyGenerator::new(
            format!("{prefix}_deletion_timestamp"),
            DELETION_HELP,
            MetricType::Gauge,
            Stability::Alpha,
            |object: &T| {
                object
                    .metadata()
                    .deletion_timestamp
                    .map(|deleted| Metric::new(deleted.timestamp() as f64))
                    .into_iter()
                    .collect()
            },
        ),
        FamilyGenerator::new(
            format!("{prefix}_annotations"),
            ANNOTATIONS_HELP,
            MetricType::Gauge,
            Stability::Alpha,
            move |object: &T| {
                attribute_metrics(
                    "annotation",
                    &object.metadata().annotations,
                    &allow_annotations,
                    EmptyAllowList::Suppress,
                )
            },
        ),
        FamilyGenerator::new(
            format!("{prefix}_labels"),
            LABELS_HELP,
            MetricType::Gauge,
            Stability::Stable,
            move |object: &T| {
                attribute_metrics(
                    "label",
                    &object.metadata().labels,
                    &allow_labels,
                    EmptyAllowList::Suppress,
                )
            },
        ),
        FamilyGenerator::new(
            format!("{prefix}_metadata_resource_version"),
            format!(
                "Resource version representing a specific version of the {}.",
                prefix.strip_prefix("kube_").unwrap_or(prefix)
            ),
            MetricType::Gauge,
            Stability::Alpha,
            |object: &T| {
                object
                    .metadata()
                    .resource_version
                    .as_deref()
                    .map(resource_version_metric)
                    .unwrap_or_default()
            },
        ),
    ]
}
