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

//! The metric-rendering engine: turns Kubernetes objects plus declarative
//! family definitions into Prometheus text exposition.
//!
//! Families follow the upstream `kube-state-metrics` conventions: names are
//! `kube_<resource>_<aspect>`, labels derived from object labels and
//! annotations are `label_<key>` / `annotation_<key>`, and identity labels
//! (`namespace`, the resource name) always come first.

pub mod condition;
pub mod family;
pub mod filter;
pub mod generator;
pub mod labels;

pub use condition::{expand_condition, expand_raw_condition, ConditionStatus};
pub use family::{bool_float, resource_version_metric, Family, Metric, MetricType};
pub use filter::{AllowDenyList, CompositeFilter, FamilyGeneratorFilter, OptInFilter};
pub use generator::{FamilyGenerator, FamilySet, Stability};
pub use labels::{AllowList, EmptyAllowList, LabelPairs};
