use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;
use tracing::debug;

/// Separator for string-valued parameters: `name=value`
pub const STRING_SEPARATOR: &str = "=";
/// Separator for typed parameters: `count:=1`, `enabled:=true`
pub const TYPED_SEPARATOR: &str = ":=";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("malformed parameter '{token}': expected key=value or key:=value")]
    MalformedToken { token: String },

    #[error("parameter '{token}' conflicts with existing value at '{path}'")]
    ConflictingPath { token: String, path: String },

    #[error(
        "parameter '{token}' has invalid typed value '{value}': \
         expected true, false or an integer"
    )]
    InvalidTypedValue { token: String, value: String },
}

/// Leaf value of a parameter tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamScalar {
    String(String),
    Bool(bool),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamNode {
    Scalar(ParamScalar),
    Object(ParamTree),
}

/// Nested key/value structure built from command-line parameter tokens.
///
/// Keys keep first-insertion order so the serialized body follows the order
/// the user typed them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamTree {
    entries: Vec<(String, ParamNode)>,
}

impl ParamTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses tokens in order into a fresh tree.
    ///
    /// # Errors
    /// * `MalformedToken` - a token has no `=` or an empty key segment
    /// * `ConflictingPath` - an intermediate key already holds a scalar
    /// * `InvalidTypedValue` - a `:=` value is neither a boolean nor an integer
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ParamError> {
        let mut tree = Self::new();
        for token in tokens {
            tree.insert_token(token.as_ref())?;
        }
        Ok(tree)
    }

    /// Applies a single token on top of the current tree.
    pub fn insert_token(&mut self, token: &str) -> Result<(), ParamError> {
        let (key, raw_value, separator) = split_token(token)?;

        let path: Vec<&str> = key.split('.').collect();
        let malformed = || ParamError::MalformedToken {
            token: token.to_string(),
        };
        if path.iter().any(|segment| segment.is_empty()) {
            return Err(malformed());
        }
        let Some((last, parents)) = path.split_last() else {
            return Err(malformed());
        };

        let value = interpret_value(token, raw_value, separator)?;
        debug!(token, separator, "parsed parameter");

        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            current = current.child_object(segment).ok_or_else(|| ParamError::ConflictingPath {
                token: token.to_string(),
                path: path[..=depth].join("."),
            })?;
        }

        current.set(last, ParamNode::Scalar(value));
        Ok(())
    }

    /// Serializes the tree as a JSON object
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn set(&mut self, key: &str, node: ParamNode) {
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((key.to_string(), node)),
        }
    }

    /// Returns the nested object under `key`, creating it when absent.
    /// `None` means `key` is bound to a scalar.
    fn child_object(&mut self, key: &str) -> Option<&mut ParamTree> {
        let index = match self.entries.iter().position(|(existing, _)| existing == key) {
            Some(index) => index,
            None => {
                self.entries
                    .push((key.to_string(), ParamNode::Object(ParamTree::new())));
                self.entries.len() - 1
            }
        };

        match &mut self.entries[index].1 {
            ParamNode::Object(tree) => Some(tree),
            ParamNode::Scalar(_) => None,
        }
    }
}

/// Picks the separator and splits on its first occurrence.
///
/// Only the prefix up to the first `=` is inspected for `:=`, so a string
/// value that itself contains `:=` (`x=blabla:=1`) still splits on `=`.
fn split_token(token: &str) -> Result<(&str, &str, &'static str), ParamError> {
    let first_eq = token.find('=').ok_or_else(|| ParamError::MalformedToken {
        token: token.to_string(),
    })?;

    let separator = if token[..=first_eq].contains(TYPED_SEPARATOR) {
        TYPED_SEPARATOR
    } else {
        STRING_SEPARATOR
    };

    let (key, value) = token
        .split_once(separator)
        .ok_or_else(|| ParamError::MalformedToken {
            token: token.to_string(),
        })?;

    Ok((key, value, separator))
}

fn interpret_value(token: &str, raw: &str, separator: &str) -> Result<ParamScalar, ParamError> {
    if separator == STRING_SEPARATOR {
        return Ok(ParamScalar::String(raw.to_string()));
    }

    match raw {
        "true" => Ok(ParamScalar::Bool(true)),
        "false" => Ok(ParamScalar::Bool(false)),
        other => other
            .parse::<i64>()
            .map(ParamScalar::Int)
            .map_err(|_| ParamError::InvalidTypedValue {
                token: token.to_string(),
                value: other.to_string(),
            }),
    }
}

impl Serialize for ParamTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl Serialize for ParamNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamNode::Scalar(ParamScalar::String(value)) => serializer.serialize_str(value),
            ParamNode::Scalar(ParamScalar::Bool(value)) => serializer.serialize_bool(*value),
            ParamNode::Scalar(ParamScalar::Int(value)) => serializer.serialize_i64(*value),
            ParamNode::Object(tree) => tree.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_json(tokens: &[&str]) -> String {
        ParamTree::parse(tokens).unwrap().to_json().unwrap()
    }

    #[test]
    fn single_string_param() {
        assert_eq!(params_json(&["x=hey"]), r#"{"x":"hey"}"#);
    }

    #[test]
    fn string_and_typed_params() {
        assert_eq!(params_json(&["x=hey", "y:=1"]), r#"{"x":"hey","y":1}"#);
        assert_eq!(params_json(&["x=hey", "y:=true"]), r#"{"x":"hey","y":true}"#);
        assert_eq!(params_json(&["flag:=false"]), r#"{"flag":false}"#);
        assert_eq!(params_json(&["n:=-42"]), r#"{"n":-42}"#);
    }

    #[test]
    fn nested_params() {
        assert_eq!(
            params_json(&["x=cool", "y.one:=1", "y.two=hello"]),
            r#"{"x":"cool","y":{"one":1,"two":"hello"}}"#
        );
    }

    #[test]
    fn deeply_nested_params() {
        assert_eq!(params_json(&["x.y.z.a:=1"]), r#"{"x":{"y":{"z":{"a":1}}}}"#);
    }

    #[test]
    fn string_value_containing_typed_separator() {
        assert_eq!(params_json(&["x=blabla:=1"]), r#"{"x":"blabla:=1"}"#);
    }

    #[test]
    fn string_value_keeps_everything_after_first_separator() {
        assert_eq!(params_json(&["q=a=b"]), r#"{"q":"a=b"}"#);
        assert_eq!(params_json(&["empty="]), r#"{"empty":""}"#);
    }

    #[test]
    fn last_token_wins_on_same_key() {
        assert_eq!(params_json(&["x=1", "x:=2"]), r#"{"x":2}"#);
        assert_eq!(params_json(&["y.a=1", "y=flat"]), r#"{"y":"flat"}"#);
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = ParamTree::parse(&["nothing"]).unwrap_err();
        assert_eq!(
            err,
            ParamError::MalformedToken {
                token: "nothing".into()
            }
        );
    }

    #[test]
    fn empty_key_segment_is_malformed() {
        for token in ["=v", "a..b=v", ".a=v", "a.=v"] {
            assert!(
                matches!(ParamTree::parse(&[token]), Err(ParamError::MalformedToken { .. })),
                "{token} should be malformed"
            );
        }
    }

    #[test]
    fn invalid_typed_value() {
        let err = ParamTree::parse(&["x:=maybe"]).unwrap_err();
        assert_eq!(
            err,
            ParamError::InvalidTypedValue {
                token: "x:=maybe".into(),
                value: "maybe".into()
            }
        );
        assert!(ParamTree::parse(&["x:=1.5"]).is_err());
        assert!(ParamTree::parse(&["x:=TRUE"]).is_err());
    }

    #[test]
    fn scalar_in_the_middle_of_a_path_conflicts() {
        let err = ParamTree::parse(&["a.b=1", "a.b.c=2"]).unwrap_err();
        assert_eq!(
            err,
            ParamError::ConflictingPath {
                token: "a.b.c=2".into(),
                path: "a.b".into()
            }
        );
    }

    #[test]
    fn empty_token_list_is_empty_object() {
        let tree = ParamTree::parse::<&str>(&[]).unwrap();
        assert_eq!(tree, ParamTree::new());
        assert_eq!(tree.to_json().unwrap(), "{}");
    }
}
