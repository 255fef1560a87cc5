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
use std::collections::HashMap;

/// ConfigMap resource; only its metadata is observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMap {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "ConfigMap".to_string()
}

impl ConfigMap {
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata,
            data: HashMap::new(),
            immutable: None,
        }
    }
}

impl Resource for ConfigMap {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
