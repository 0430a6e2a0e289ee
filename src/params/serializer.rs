//! Rule-based parameter serialization
//!
//! A [`ParameterSerializer`] holds an ordered table of rules. The first rule
//! whose predicate accepts the value's [`ParamKind`] encodes it; a value no
//! rule accepts is an error, never coerced.

use std::fmt;
use std::sync::{Arc, RwLock};

use super::types::{ParamKind, ParamValue};
use crate::error::{Error, Result};

/// Predicate over a value's type descriptor
pub type KindPredicate = Arc<dyn Fn(&ParamKind) -> bool + Send + Sync>;

/// Encoder producing a complete query fragment for `(name, value)`.
///
/// The serializer is passed in so compound encoders can recurse.
pub type FragmentEncoder =
    Arc<dyn Fn(&ParameterSerializer, &str, &ParamValue) -> Result<String> + Send + Sync>;

/// A (type-match, encode) pair
#[derive(Clone)]
pub struct ParameterRule {
    predicate: KindPredicate,
    encode: FragmentEncoder,
}

impl ParameterRule {
    /// Create a rule from a predicate and a fragment encoder
    pub fn new<P, E>(predicate: P, encode: E) -> Self
    where
        P: Fn(&ParamKind) -> bool + Send + Sync + 'static,
        E: Fn(&ParameterSerializer, &str, &ParamValue) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            encode: Arc::new(encode),
        }
    }

    /// Create a rule matching one exact kind, emitting `name=<encoded value>`
    pub fn for_kind<E>(kind: ParamKind, encode_value: E) -> Self
    where
        E: Fn(&ParamValue) -> Result<String> + Send + Sync + 'static,
    {
        Self::new(
            move |k| *k == kind,
            move |_, name, value| Ok(format!("{name}={}", encode_value(value)?)),
        )
    }

    /// Whether this rule handles values of `kind`
    pub fn matches(&self, kind: &ParamKind) -> bool {
        (self.predicate)(kind)
    }
}

impl fmt::Debug for ParameterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterRule").finish_non_exhaustive()
    }
}

/// Ordered rule table turning named values into query fragments.
///
/// Rules can be added while the serializer is shared; a serialization in
/// progress keeps using the table it started with.
pub struct ParameterSerializer {
    rules: RwLock<Arc<Vec<ParameterRule>>>,
}

impl ParameterSerializer {
    /// Create a serializer with the default rules
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Create a serializer with no rules at all
    pub fn empty() -> Self {
        Self::with_rules(Vec::new())
    }

    /// Create a serializer with an explicit rule table
    pub fn with_rules(rules: Vec<ParameterRule>) -> Self {
        Self {
            rules: RwLock::new(Arc::new(rules)),
        }
    }

    /// Append a rule, evaluated after all existing rules
    pub fn register(&self, rule: ParameterRule) {
        self.update(|rules| rules.push(rule));
    }

    /// Insert a rule ahead of all existing rules
    pub fn register_first(&self, rule: ParameterRule) {
        self.update(|rules| rules.insert(0, rule));
    }

    /// Append an exact-kind rule emitting `name=<encoded value>`
    pub fn register_kind<E>(&self, kind: ParamKind, encode_value: E)
    where
        E: Fn(&ParamValue) -> Result<String> + Send + Sync + 'static,
    {
        self.register(ParameterRule::for_kind(kind, encode_value));
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether no rules are registered
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Serialize one named value into a query fragment
    pub fn serialize(&self, name: &str, value: &ParamValue) -> Result<String> {
        let kind = value.kind();
        let rules = self.snapshot();
        match rules.iter().find(|rule| rule.matches(&kind)) {
            Some(rule) => (rule.encode)(self, name, value),
            None => Err(Error::unknown_type(name, kind.to_string())),
        }
    }

    /// Serialize a whole parameter set into a query string (without `?`).
    ///
    /// Names are escaped before any rule sees them. Fragments are joined
    /// with `&`; empty fragments (empty sequences) are dropped.
    pub fn serialize_all<'a, I>(&self, params: I) -> Result<String>
    where
        I: IntoIterator<Item = (&'a String, &'a ParamValue)>,
    {
        let mut fragments = Vec::new();
        for (name, value) in params {
            let fragment = self.serialize(&query_escape(name), value)?;
            if !fragment.is_empty() {
                fragments.push(fragment);
            }
        }
        Ok(fragments.join("&"))
    }

    fn snapshot(&self) -> Arc<Vec<ParameterRule>> {
        let guard = self
            .rules
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    fn update(&self, f: impl FnOnce(&mut Vec<ParameterRule>)) {
        let mut guard = self
            .rules
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(Arc::make_mut(&mut *guard));
    }
}

impl Default for ParameterSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParameterSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSerializer")
            .field("rules", &self.len())
            .finish()
    }
}

/// Percent-encode a query component (spaces become `+`)
pub fn query_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// The built-in rule table, in precedence order
pub fn default_rules() -> Vec<ParameterRule> {
    vec![
        ParameterRule::for_kind(ParamKind::String, |value| {
            Ok(query_escape(value.as_str().unwrap_or_default()))
        }),
        ParameterRule::new(
            |kind| *kind == ParamKind::Sequence,
            |serializer, name, value| {
                let ParamValue::Sequence(items) = value else {
                    return Err(Error::unknown_type(name, value.kind().to_string()));
                };
                let element_name = format!("{name}[]");
                let fragments = items
                    .iter()
                    .map(|item| serializer.serialize(&element_name, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(fragments.join("&"))
            },
        ),
        ParameterRule::for_kind(ParamKind::DateTime, |value| match value {
            ParamValue::DateTime(at) => Ok(at.format("%Y-%m-%d").to_string()),
            other => Err(Error::unknown_type("", other.kind().to_string())),
        }),
        ParameterRule::new(ParamKind::is_string_like, |_, name, value| {
            let escaped = query_escape(value.as_str().unwrap_or_default());
            Ok(format!("{name}={escaped}"))
        }),
        ParameterRule::new(ParamKind::is_numeric, |_, name, value| match value {
            ParamValue::Integer(n) => Ok(format!("{name}={n}")),
            ParamValue::Float(x) => Ok(format!("{name}={}", query_escape(&x.to_string()))),
            other => Err(Error::unknown_type(name, other.kind().to_string())),
        }),
        ParameterRule::for_kind(ParamKind::Bool, |value| match value {
            ParamValue::Bool(flag) => Ok(flag.to_string()),
            other => Err(Error::unknown_type("", other.kind().to_string())),
        }),
    ]
}
