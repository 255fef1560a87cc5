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

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fmt::{self, Display};

use crate::kubestate::error::{with_context, BoxError};
use crate::kubestate::logger::{self, LogFormat};
use crate::kubestate::metric::filter::{
    AllowDenyList, CompositeFilter, FamilyGeneratorFilter, FilterError, OptInFilter,
};
use crate::kubestate::metric::labels::{AllowList, LABEL_WILDCARD};
use crate::kubestate::observability::tracing;

const COMPONENT: &str = "config";

/// Enum for supported configuration parameters
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Config {
    LabelsAllowList,
    AnnotationsAllowList,
    MetricAllowList,
    MetricDenyList,
    MetricOptInList,
    LogFormat,
}

impl Config {
    /// Returns the associated environment variable for the config parameter.
    pub fn env_var(&self) -> &'static str {
        match self {
            Config::LabelsAllowList => "KUBESTATE_METRIC_LABELS_ALLOWLIST",
            Config::AnnotationsAllowList => "KUBESTATE_METRIC_ANNOTATIONS_ALLOWLIST",
            Config::MetricAllowList => "KUBESTATE_METRIC_ALLOWLIST",
            Config::MetricDenyList => "KUBESTATE_METRIC_DENYLIST",
            Config::MetricOptInList => "KUBESTATE_METRIC_OPT_IN_LIST",
            Config::LogFormat => "KUBESTATE_LOG_FORMAT",
        }
    }

    /// Returns the value used when the environment variable is unset.
    pub fn default_value(&self) -> &'static str {
        match self {
            Config::LogFormat => "text",
            _ => "",
        }
    }

    /// Returns the effective value, either from environment or default.
    pub fn get(&self) -> String {
        env::var(self.env_var()).unwrap_or_else(|_| self.default_value().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    AllowListFormat { value: String },
    LogFormat { value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::AllowListFormat { value } => write!(
                f,
                "invalid format '{value}', expected resource=[key1,key2,keyN...],resourceN=[]"
            ),
            ConfigError::LogFormat { value } => {
                write!(f, "unsupported log format '{value}', expected text or json")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Assign,
    Open,
    Close,
    Comma,
    Word(String),
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '/' | '-')
}

fn tokenize(value: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '=' => tokens.push(Token::Assign),
            '[' => tokens.push(Token::Open),
            ']' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Comma),
            '*' => tokens.push(Token::Word(LABEL_WILDCARD.to_string())),
            c if c.is_whitespace() => {}
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

/// Per-resource keys that may be turned into labels, parsed from
/// `resource=[key1,key2],other=[*]`. The resource `*` applies to every
/// resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelsAllowList {
    entries: BTreeMap<String, Vec<String>>,
}

impl LabelsAllowList {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::AllowListFormat {
            value: value.to_string(),
        };
        let tokens = tokenize(value).ok_or_else(invalid)?;

        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut in_keys = false;
        let mut resource = String::new();
        let mut previous: Option<&Token> = None;

        for (index, token) in tokens.iter().enumerate() {
            let next = tokens.get(index + 1);
            match token {
                Token::Assign => {
                    if in_keys
                        || !matches!(previous, Some(Token::Word(_)))
                        || next != Some(&Token::Open)
                    {
                        return Err(invalid());
                    }
                }
                Token::Open => {
                    if previous != Some(&Token::Assign) {
                        return Err(invalid());
                    }
                    in_keys = true;
                }
                Token::Close => {
                    if !in_keys
                        || !matches!(previous, Some(Token::Open) | Some(Token::Word(_)))
                        || !matches!(next, None | Some(Token::Comma))
                    {
                        return Err(invalid());
                    }
                    in_keys = false;
                }
                Token::Comma => {
                    if !matches!(previous, Some(Token::Word(_)) | Some(Token::Close))
                        || !matches!(next, Some(Token::Word(_)))
                    {
                        return Err(invalid());
                    }
                }
                Token::Word(word) => {
                    if in_keys {
                        if !matches!(previous, Some(Token::Open) | Some(Token::Comma))
                            || !matches!(next, Some(Token::Comma) | Some(Token::Close))
                        {
                            return Err(invalid());
                        }
                        entries.entry(resource.clone()).or_default().push(word.clone());
                    } else {
                        if !matches!(previous, None | Some(Token::Comma))
                            || next != Some(&Token::Assign)
                        {
                            return Err(invalid());
                        }
                        resource = word.clone();
                        entries.insert(resource.clone(), Vec::new());
                    }
                }
            }
            previous = Some(token);
        }

        if in_keys || matches!(previous, Some(Token::Word(_))) {
            return Err(invalid());
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keys allowed for `resource`, including those listed under `*`.
    pub fn allow_list(&self, resource: &str) -> AllowList {
        let mut keys = Vec::new();
        for name in [resource, LABEL_WILDCARD] {
            if let Some(entry) = self.entries.get(name) {
                keys.extend(entry.iter().cloned());
            }
        }
        AllowList::from_entries(keys)
    }
}

impl Display for LabelsAllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.entries.keys().map(String::as_str).collect::<Vec<_>>();
        write!(f, "{}", names.join(","))
    }
}

fn parse_name_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Engine options resolved from the process environment.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub labels_allow_list: LabelsAllowList,
    pub annotations_allow_list: LabelsAllowList,
    pub metric_allow_list: Vec<String>,
    pub metric_deny_list: Vec<String>,
    pub metric_opt_in_list: Vec<String>,
    pub log_format: LogFormat,
}

impl Options {
    pub fn from_env() -> Result<Self, BoxError> {
        let parse_allow_list = |config: Config| {
            LabelsAllowList::parse(&config.get())
                .map_err(|err| with_context(err, format!("parsing {}", config.env_var())))
        };
        let log_format_value = Config::LogFormat.get();
        let log_format = log_format_value.parse::<LogFormat>().map_err(|_| {
            with_context(
                ConfigError::LogFormat {
                    value: log_format_value.clone(),
                },
                format!("parsing {}", Config::LogFormat.env_var()),
            )
        })?;

        Ok(Self {
            labels_allow_list: parse_allow_list(Config::LabelsAllowList)?,
            annotations_allow_list: parse_allow_list(Config::AnnotationsAllowList)?,
            metric_allow_list: parse_name_list(&Config::MetricAllowList.get()),
            metric_deny_list: parse_name_list(&Config::MetricDenyList.get()),
            metric_opt_in_list: parse_name_list(&Config::MetricOptInList.get()),
            log_format,
        })
    }

    /// Installs the configured log format and the tracing subscriber for
    /// the process.
    pub fn init_logging(&self) {
        logger::set_log_format(self.log_format);
        tracing::init();
    }

    /// Builds the family filter from the allow, deny and opt-in lists.
    pub fn family_filter(&self) -> Result<CompositeFilter, FilterError> {
        let allow_deny = AllowDenyList::new(&self.metric_allow_list, &self.metric_deny_list)?;
        let opt_in = OptInFilter::new(&self.metric_opt_in_list)?;

        if !self.metric_allow_list.is_empty() || !self.metric_deny_list.is_empty() {
            logger::log_info(
                COMPONENT,
                "Metric allow-deny list",
                &[("status", &allow_deny.status())],
            );
        }
        if opt_in.count() > 0 {
            logger::log_info(
                COMPONENT,
                "Metrics which were opted into",
                &[("status", &opt_in.status())],
            );
        }

        let filters: Vec<Box<dyn FamilyGeneratorFilter>> =
            vec![Box::new(allow_deny), Box::new(opt_in)];
        Ok(CompositeFilter::new(filters))
    }
}
