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

//! Family generators and the per-resource set that composes them.
//!
//! A [`FamilyGenerator`] knows how to turn one object of type `T` into the
//! samples of a single metric family. A [`FamilySet`] owns every generator
//! registered for a resource kind together with the function deriving the
//! object's identity labels, which it prepends to every sample.

use std::fmt;
use std::sync::Arc;

use super::family::{Family, Metric, MetricType};
use super::filter::{FamilyDescriptor, FamilyGeneratorFilter};
use super::labels::{merge_label_pairs, LabelPairs};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stability {
    Alpha,
    Stable,
}

impl Stability {
    pub fn as_str(self) -> &'static str {
        match self {
            Stability::Alpha => "ALPHA",
            Stability::Stable => "STABLE",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type GenerateFn<T> = dyn Fn(&T) -> Vec<Metric> + Send + Sync;
type IdentityFn<T> = dyn Fn(&T) -> LabelPairs + Send + Sync;

pub struct FamilyGenerator<T> {
    name: String,
    help: String,
    metric_type: MetricType,
    stability: Stability,
    deprecated_version: Option<String>,
    opt_in: bool,
    generate: Arc<GenerateFn<T>>,
}

impl<T> Clone for FamilyGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            help: self.help.clone(),
            metric_type: self.metric_type,
            stability: self.stability,
            deprecated_version: self.deprecated_version.clone(),
            opt_in: self.opt_in,
            generate: Arc::clone(&self.generate),
        }
    }
}

impl<T> fmt::Debug for FamilyGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyGenerator")
            .field("name", &self.name)
            .field("metric_type", &self.metric_type)
            .field("stability", &self.stability)
            .field("deprecated_version", &self.deprecated_version)
            .field("opt_in", &self.opt_in)
            .finish()
    }
}

impl<T> FamilyGenerator<T> {
    pub fn new<F>(
        name: impl Into<String>,
        help: impl Into<String>,
        metric_type: MetricType,
        stability: Stability,
        generate: F,
    ) -> Self
    where
        F: Fn(&T) -> Vec<Metric> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            help: help.into(),
            metric_type,
            stability,
            deprecated_version: None,
            opt_in: false,
            generate: Arc::new(generate),
        }
    }

    /// Marks the family deprecated since `version`; the help text is
    /// prefixed accordingly.
    pub fn deprecated(mut self, version: impl Into<String>) -> Self {
        self.deprecated_version = Some(version.into());
        self
    }

    /// Families marked opt-in are only exposed when explicitly enabled.
    pub fn opt_in(mut self) -> Self {
        self.opt_in = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> String {
        match &self.deprecated_version {
            Some(version) => format!("(Deprecated since {version}) {}", self.help),
            None => self.help.clone(),
        }
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    pub fn is_opt_in(&self) -> bool {
        self.opt_in
    }

    pub fn descriptor(&self) -> FamilyDescriptor<'_> {
        FamilyDescriptor {
            name: &self.name,
            opt_in: self.opt_in,
        }
    }

    /// `# HELP` and `# TYPE` lines, without a trailing newline.
    pub fn header(&self) -> String {
        let help = self.help();
        let mut header = String::with_capacity(self.name.len() * 2 + help.len() + 32);
        header.push_str("# HELP ");
        header.push_str(&self.name);
        header.push(' ');
        if self.stability == Stability::Stable {
            header.push('[');
            header.push_str(self.stability.as_str());
            header.push_str("] ");
        }
        header.push_str(&help);
        header.push('\n');
        header.push_str("# TYPE ");
        header.push_str(&self.name);
        header.push(' ');
        header.push_str(self.metric_type.as_str());
        header
    }

    /// Runs the extraction function; samples carry no identity labels yet.
    pub fn generate(&self, object: &T) -> Family {
        Family {
            name: self.name.clone(),
            metric_type: self.metric_type,
            metrics: (self.generate)(object),
        }
    }
}

/// Every family generator registered for one resource kind.
pub struct FamilySet<T> {
    identity: Arc<IdentityFn<T>>,
    generators: Vec<FamilyGenerator<T>>,
}

impl<T> Clone for FamilySet<T> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            generators: self.generators.clone(),
        }
    }
}

impl<T> FamilySet<T> {
    pub fn new<F>(identity: F, generators: Vec<FamilyGenerator<T>>) -> Self
    where
        F: Fn(&T) -> LabelPairs + Send + Sync + 'static,
    {
        Self {
            identity: Arc::new(identity),
            generators,
        }
    }

    pub fn generators(&self) -> &[FamilyGenerator<T>] {
        &self.generators
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Keeps only the generators accepted by `filter`, preserving order.
    pub fn filtered(&self, filter: &dyn FamilyGeneratorFilter) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            generators: self
                .generators
                .iter()
                .filter(|generator| filter.test(&generator.descriptor()))
                .cloned()
                .collect(),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        self.generators.iter().map(FamilyGenerator::header).collect()
    }

    /// Generates one family per registered generator, in registration order,
    /// with the object's identity labels in front of every sample.
    pub fn generate(&self, object: &T) -> Vec<Family> {
        let identity = (self.identity)(object);
        self.generators
            .iter()
            .map(|generator| {
                let mut family = generator.generate(object);
                for metric in &mut family.metrics {
                    metric.labels = merge_label_pairs(&[&identity, &metric.labels]);
                }
                family
            })
            .collect()
    }

    /// Renders the object as a standalone exposition: every header followed
    /// by that family's samples.
    pub fn render(&self, object: &T) -> String {
        let mut out = String::new();
        for (header, family) in self.headers().iter().zip(self.generate(object)) {
            out.push_str(header);
            out.push('\n');
            family.write(&mut out);
        }
        out
    }
}
