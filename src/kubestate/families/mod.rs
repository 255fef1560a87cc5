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

//! Family definitions per resource kind.

pub mod configmap;
pub mod metadata;
pub mod namespace;

use crate::kubestate::k8s::meta::Resource;
use crate::kubestate::metric::LabelPairs;

/// Identity labels of a namespaced object: `namespace` followed by
/// `resource_label` holding the object name.
pub fn namespaced_identity<T>(resource_label: &'static str) -> impl Fn(&T) -> LabelPairs
where
    T: Resource,
{
    move |object: &T| {
        let meta = object.metadata();
        LabelPairs::from_parts(
            vec!["namespace".to_string(), resource_label.to_string()],
            vec![
                meta.namespace_or_empty().to_string(),
                meta.name_or_empty().to_string(),
            ],
        )
    }
}

/// Identity label of a cluster-scoped object: its name under
/// `resource_label`.
pub fn cluster_identity<T>(resource_label: &'static str) -> impl Fn(&T) -> LabelPairs
where
    T: Resource,
{
    move |object: &T| LabelPairs::single(resource_label, object.metadata().name_or_empty())
}
