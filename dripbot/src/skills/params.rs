//! Typed command parameters.
//!
//! Each skill declares its parameters as [`ParamSpec`] values with a closed
//! [`ParamKind`] variant, a default, and an optional allow-list. The registry
//! validates specs once at construction time and coerces raw command tokens
//! into [`ParamValue`]s, so handlers never re-check shapes at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of parameter kinds a skill can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Free-form text token.
    Text,
    /// Numeric token, parsed as `f64`.
    Number,
    /// Wallet address. Shape validation is the wallet layer's job; the
    /// dispatcher only carries the token through.
    Address,
    /// URL token; must carry an http(s) scheme.
    Url,
    /// Username or handle; a leading `@` is stripped.
    Username,
}

/// A coerced parameter value, mirroring [`ParamKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Wallet address value.
    Address(String),
    /// URL value.
    Url(String),
    /// Username value.
    Username(String),
}

impl ParamValue {
    /// Get the textual form of this value, if it has one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Address(s) | Self::Url(s) | Self::Username(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Get the numeric form of this value, if it has one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Which kind this value belongs to.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Text(_) => ParamKind::Text,
            Self::Number(_) => ParamKind::Number,
            Self::Address(_) => ParamKind::Address,
            Self::Url(_) => ParamKind::Url,
            Self::Username(_) => ParamKind::Username,
        }
    }
}

impl ParamKind {
    /// Parse a raw token into a value of this kind.
    ///
    /// Returns `None` when the token does not fit the kind; the caller falls
    /// back to the parameter's default.
    #[must_use]
    pub fn parse(self, token: &str) -> Option<ParamValue> {
        match self {
            Self::Text => Some(ParamValue::Text(token.to_string())),
            Self::Number => token.parse::<f64>().ok().map(ParamValue::Number),
            Self::Address => Some(ParamValue::Address(token.to_string())),
            Self::Url => {
                if token.starts_with("http://") || token.starts_with("https://") {
                    Some(ParamValue::Url(token.to_string()))
                } else {
                    None
                }
            }
            Self::Username => Some(ParamValue::Username(
                token.strip_prefix('@').unwrap_or(token).to_string(),
            )),
        }
    }
}

/// Specification of a single skill parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Declared kind.
    pub kind: ParamKind,
    /// Value used when the token is missing or fails coercion.
    pub default: Option<ParamValue>,
    /// Allow-list of accepted textual values (lowercased). `None` accepts all.
    pub allowed: Option<Vec<String>>,
}

impl ParamSpec {
    /// A text parameter with a default.
    #[must_use]
    pub fn text(default: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Text,
            default: Some(ParamValue::Text(default.into())),
            allowed: None,
        }
    }

    /// A numeric parameter with a default.
    #[must_use]
    pub fn number(default: f64) -> Self {
        Self {
            kind: ParamKind::Number,
            default: Some(ParamValue::Number(default)),
            allowed: None,
        }
    }

    /// An address parameter with a default.
    #[must_use]
    pub fn address(default: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Address,
            default: Some(ParamValue::Address(default.into())),
            allowed: None,
        }
    }

    /// A URL parameter with no default.
    #[must_use]
    pub const fn url() -> Self {
        Self {
            kind: ParamKind::Url,
            default: None,
            allowed: None,
        }
    }

    /// A username parameter with a default.
    #[must_use]
    pub fn username(default: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Username,
            default: Some(ParamValue::Username(default.into())),
            allowed: None,
        }
    }

    /// Restrict this parameter to an allow-list of values.
    ///
    /// Entries are normalized to lowercase; comparison at dispatch time is
    /// case-insensitive.
    #[must_use]
    pub fn allow<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(
            values
                .into_iter()
                .map(|v| v.into().to_lowercase())
                .collect(),
        );
        self
    }

    /// Check whether a coerced value passes the allow-list, if any.
    #[must_use]
    pub fn allows(&self, value: &ParamValue) -> bool {
        match (&self.allowed, value.as_str()) {
            (Some(allowed), Some(s)) => allowed.iter().any(|a| a == &s.to_lowercase()),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// Coerce a raw token (or its absence) into a value.
    ///
    /// Missing tokens, tokens that fail kind parsing, and tokens rejected by
    /// the allow-list all fall back to the default. Dispatch never panics.
    #[must_use]
    pub fn coerce(&self, token: Option<&str>) -> Option<ParamValue> {
        match token {
            None => self.default.clone(),
            Some(tok) => match self.kind.parse(tok) {
                Some(value) if self.allows(&value) => Some(value),
                _ => self.default.clone(),
            },
        }
    }
}

/// Parameters parsed from a single incoming command.
///
/// Owned exclusively by the handler invocation that triggered the parse and
/// discarded when the reply has been sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedParams {
    values: BTreeMap<String, ParamValue>,
}

impl ParsedParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    /// Look up a value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Look up the textual form of a value by name.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(ParamValue::as_str)
    }

    /// Look up the numeric form of a value by name.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(ParamValue::as_number)
    }

    /// Number of parsed parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
