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

//! Selection of which metric families are exposed at all.

use std::error::Error;
use std::fmt::{Display, Formatter};

use fancy_regex::Regex as LookaroundRegex;
use regex::Regex;

/// The parts of a family generator that filters decide on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FamilyDescriptor<'a> {
    pub name: &'a str,
    pub opt_in: bool,
}

pub trait FamilyGeneratorFilter: Send + Sync {
    fn test(&self, family: &FamilyDescriptor<'_>) -> bool;
}

#[derive(Debug)]
pub enum FilterError {
    AllowAndDeny,
    InvalidPattern {
        pattern: String,
        source: Box<dyn Error + Send + Sync>,
    },
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::AllowAndDeny => f.write_str(
                "allowlist and denylist are both set, they are mutually exclusive, only one of them can be set",
            ),
            FilterError::InvalidPattern { pattern, source } => {
                write!(f, "invalid family pattern '{pattern}': {source}")
            }
        }
    }
}

impl Error for FilterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FilterError::InvalidPattern { source, .. } => Some(source.as_ref()),
            FilterError::AllowAndDeny => None,
        }
    }
}

fn compile_patterns<R, E>(
    patterns: &[String],
    compile: fn(&str) -> Result<R, E>,
) -> Result<Vec<R>, FilterError>
where
    E: Error + Send + Sync + 'static,
{
    let mut sorted: Vec<&String> = patterns.iter().collect();
    sorted.sort();
    sorted.dedup();
    sorted
        .into_iter()
        .map(|pattern| {
            compile(pattern).map_err(|source| FilterError::InvalidPattern {
                pattern: pattern.clone(),
                source: Box::new(source),
            })
        })
        .collect()
}

/// Family names matched against an allowlist or a denylist of regexes.
///
/// With neither list set every family is included. Patterns may use
/// lookaround, e.g. `^kube_(?!configmap_info).*`.
#[derive(Clone, Debug)]
pub struct AllowDenyList {
    patterns: Vec<LookaroundRegex>,
    is_allow_list: bool,
}

impl AllowDenyList {
    pub fn new(allow: &[String], deny: &[String]) -> Result<Self, FilterError> {
        if !allow.is_empty() && !deny.is_empty() {
            return Err(FilterError::AllowAndDeny);
        }
        let is_allow_list = !allow.is_empty();
        let patterns = compile_patterns(
            if is_allow_list { allow } else { deny },
            LookaroundRegex::new,
        )?;
        Ok(Self {
            patterns,
            is_allow_list,
        })
    }

    pub fn is_included(&self, name: &str) -> bool {
        // A pattern that exceeds the backtrack limit counts as no match.
        let matched = self
            .patterns
            .iter()
            .any(|pattern| pattern.is_match(name).unwrap_or(false));
        if self.is_allow_list {
            matched
        } else {
            !matched
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        !self.is_included(name)
    }

    pub fn status(&self) -> String {
        let items = self
            .patterns
            .iter()
            .map(LookaroundRegex::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if self.is_allow_list {
            format!("Including the following lists that were on allowlist: {items}")
        } else {
            format!("Excluding the following lists that were on denylist: {items}")
        }
    }
}

impl FamilyGeneratorFilter for AllowDenyList {
    fn test(&self, family: &FamilyDescriptor<'_>) -> bool {
        self.is_included(family.name)
    }
}

/// Lets regular families through and opt-in families only when one of the
/// configured patterns matches their name.
#[derive(Clone, Debug, Default)]
pub struct OptInFilter {
    patterns: Vec<Regex>,
}

impl OptInFilter {
    pub fn new(patterns: &[String]) -> Result<Self, FilterError> {
        Ok(Self {
            patterns: compile_patterns(patterns, Regex::new)?,
        })
    }

    pub fn count(&self) -> usize {
        self.patterns.len()
    }

    pub fn status(&self) -> String {
        self.patterns
            .iter()
            .map(Regex::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FamilyGeneratorFilter for OptInFilter {
    fn test(&self, family: &FamilyDescriptor<'_>) -> bool {
        !family.opt_in || self.patterns.iter().any(|pattern| pattern.is_match(family.name))
    }
}

/// Passes a family only when every inner filter does.
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn FamilyGeneratorFilter>>,
}

impl CompositeFilter {
    pub fn new(filters: Vec<Box<dyn FamilyGeneratorFilter>>) -> Self {
        Self { filters }
    }
}

impl FamilyGeneratorFilter for CompositeFilter {
    fn test(&self, family: &FamilyDescriptor<'_>) -> bool {
        self.filters.iter().all(|filter| filter.test(family))
    }
}
