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

use std::fmt::{self, Write};

use super::labels::LabelPairs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Counter,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sample: its labels and value. The family name is supplied when
/// the sample is written.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    pub labels: LabelPairs,
    pub value: f64,
}

impl Metric {
    pub fn new(value: f64) -> Self {
        Self {
            labels: LabelPairs::new(),
            value,
        }
    }

    pub fn with_labels(labels: LabelPairs, value: f64) -> Self {
        Self { labels, value }
    }

    /// Appends `name{k="v",...} value\n` to `out`.
    pub fn write(&self, name: &str, out: &mut String) {
        out.push_str(name);
        if !self.labels.is_empty() {
            let mut separator = '{';
            for (key, value) in self.labels.iter() {
                out.push(separator);
                out.push_str(key);
                out.push_str("=\"");
                escape_label_value(value, out);
                out.push('"');
                separator = ',';
            }
            out.push('}');
        }
        out.push(' ');
        out.push_str(&format_value(self.value));
        out.push('\n');
    }
}

/// All samples of one metric family produced for one object.
#[derive(Clone, Debug, PartialEq)]
pub struct Family {
    pub name: String,
    pub metric_type: MetricType,
    pub metrics: Vec<Metric>,
}

impl Family {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn write(&self, out: &mut String) {
        for metric in &self.metrics {
            metric.write(&self.name, out);
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }
}

fn escape_label_value(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
}

/// Formats a sample value the way the exposition format expects: the
/// shortest representation that round-trips, switching to exponent notation
/// below 1e-4 and from 1e6 upwards (`1.5e+09`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let formatted = if value.is_sign_positive() { "+Inf" } else { "-Inf" };
        return formatted.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => return value.to_string(),
    };

    if (-4..6).contains(&exponent) {
        return value.to_string();
    }

    let mut formatted = String::with_capacity(mantissa.len() + 5);
    formatted.push_str(mantissa);
    formatted.push('e');
    formatted.push(if exponent < 0 { '-' } else { '+' });
    let _ = write!(formatted, "{:02}", exponent.unsigned_abs());
    formatted
}

pub fn bool_float(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Parses an object's resource version as a sample value. Versions are
/// opaque tokens; a non-numeric one yields no sample.
pub fn resource_version_metric(resource_version: &str) -> Vec<Metric> {
    match resource_version.parse::<f64>() {
        Ok(value) => vec![Metric::new(value)],
        Err(_) => Vec::new(),
    }
}
