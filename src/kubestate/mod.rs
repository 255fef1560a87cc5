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

//! Rendering engine that turns Kubernetes object state into Prometheus text
//! exposition metric families.

/// Environment-driven options and the label allow-list grammar.
pub mod config;
pub mod error;
/// Family definitions for each supported resource kind.
pub mod families;
/// Kubernetes object shapes the families are derived from.
pub mod k8s;
pub mod logger;
/// Label handling, family generators, filters and sample formatting.
pub mod metric;
pub mod observability;
/// Cached per-object renders and exposition writers.
pub mod store;
