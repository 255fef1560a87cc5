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

use super::meta::{ObjectMeta, Resource};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum NamespacePhase {
    #[default]
    Active,
    Terminating,
    /// Any phase this crate does not know; matches no phase series.
    #[serde(other)]
    Unknown,
}

impl NamespacePhase {
    /// Every phase, in exposition order.
    pub const ALL: [NamespacePhase; 2] = [NamespacePhase::Active, NamespacePhase::Terminating];

    pub fn as_str(self) -> &'static str {
        match self {
            NamespacePhase::Active => "Active",
            NamespacePhase::Terminating => "Terminating",
            NamespacePhase::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(rename = "lastTransitionTime", skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<NamespacePhase>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<NamespaceCondition>,
}

/// Cluster-scoped Namespace resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: NamespaceStatus,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Namespace".to_string()
}

impl Namespace {
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata,
            status: NamespaceStatus::default(),
        }
    }
}

impl Resource for Namespace {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
