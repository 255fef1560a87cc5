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

use super::family::{bool_float, Metric};
use super::labels::LabelPairs;

/// Status of a Kubernetes condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    /// Every status, in exposition order.
    pub const ALL: [ConditionStatus; 3] = [
        ConditionStatus::True,
        ConditionStatus::False,
        ConditionStatus::Unknown,
    ];

    pub fn as_label(self) -> &'static str {
        match self {
            ConditionStatus::True => "true",
            ConditionStatus::False => "false",
            ConditionStatus::Unknown => "unknown",
        }
    }

    /// Reads the API's `True` / `False` / `Unknown` string. Matching is
    /// exact; any other value is not a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "True" => Some(ConditionStatus::True),
            "False" => Some(ConditionStatus::False),
            "Unknown" => Some(ConditionStatus::Unknown),
            _ => None,
        }
    }
}

/// One sample per possible status, `1` for `status` and `0` for the others,
/// so every condition always exposes a complete set of series.
pub fn expand_condition(status: ConditionStatus) -> Vec<Metric> {
    condition_series(Some(status))
}

/// Like [`expand_condition`] for a raw API value. A value that is not a
/// known status still yields all three series, each `0`.
pub fn expand_raw_condition(status: &str) -> Vec<Metric> {
    condition_series(ConditionStatus::parse(status))
}

fn condition_series(status: Option<ConditionStatus>) -> Vec<Metric> {
    ConditionStatus::ALL
        .iter()
        .map(|candidate| {
            Metric::with_labels(
                LabelPairs::single("status", candidate.as_label()),
                bool_float(Some(*candidate) == status),
            )
        })
        .collect()
}
