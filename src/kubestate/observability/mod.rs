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

//! Observability for the engine itself.
//!
//! The engine's own metrics follow the Prometheus conventions it renders for
//! others: snake_case names prefixed with `kubestate`, counters ending with
//! `_total`, durations in `_seconds`. The `resource` label carries the
//! plural resource name (`namespaces`, `configmaps`).

pub mod metrics;
pub mod tracing;
