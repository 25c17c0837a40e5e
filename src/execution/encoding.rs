//! Deterministic query-string encoding.
//!
//! Structured parameters encode bracket-style: scalars as `k=v`, lists as
//! `k[0]=v0&k[1]=v1`, nested maps as `k[sub]=v`, recursively. Pairs keep
//! their insertion order and nothing iterates a hash map, so equal inputs
//! always produce byte-identical query strings.

/// One structured parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
    Map(Vec<(String, ParamValue)>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered structured query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping insertion order.
    pub fn push(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode into a query string (without the leading `?`).
    pub fn encode(&self) -> String {
        let mut parts = Vec::new();
        for (key, value) in &self.pairs {
            encode_into(&mut parts, urlencoding::encode(key).as_ref(), value);
        }
        parts.join("&")
    }
}

fn encode_into(parts: &mut Vec<String>, key: &str, value: &ParamValue) {
    match value {
        ParamValue::String(s) => parts.push(format!("{key}={}", urlencoding::encode(s))),
        ParamValue::Int(i) => parts.push(format!("{key}={i}")),
        ParamValue::Float(x) => parts.push(format!("{key}={x}")),
        ParamValue::Bool(b) => parts.push(format!("{key}={b}")),
        ParamValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                encode_into(parts, &format!("{key}[{index}]"), item);
            }
        }
        ParamValue::Map(entries) => {
            for (sub, item) in entries {
                encode_into(parts, &format!("{key}[{}]", urlencoding::encode(sub)), item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_encode_in_insertion_order() {
        let params = QueryParams::new()
            .push("page", 2)
            .push("status", "pending")
            .push("include_drafts", true);
        assert_eq!(params.encode(), "page=2&status=pending&include_drafts=true");
    }

    #[test]
    fn lists_encode_with_indices() {
        let params = QueryParams::new().push("channels", vec!["x", "linkedin"]);
        assert_eq!(params.encode(), "channels[0]=x&channels[1]=linkedin");
    }

    #[test]
    fn nested_maps_encode_bracket_style() {
        let params = QueryParams::new().push(
            "filter",
            ParamValue::Map(vec![
                ("topic".to_string(), "launch".into()),
                ("week".to_string(), 32.into()),
            ]),
        );
        assert_eq!(params.encode(), "filter[topic]=launch&filter[week]=32");
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        let params = QueryParams::new().push("q", "a b&c=d");
        assert_eq!(params.encode(), "q=a%20b%26c%3Dd");
    }

    #[test]
    fn equal_inputs_encode_byte_identically() {
        let build = || {
            QueryParams::new()
                .push("topic", "spring launch")
                .push("channels", vec!["x", "blog"])
                .push(
                    "range",
                    ParamValue::Map(vec![
                        ("from".to_string(), "2025-01-01".into()),
                        ("to".to_string(), "2025-02-01".into()),
                    ]),
                )
        };
        assert_eq!(build().encode(), build().encode());
    }

    #[test]
    fn empty_params_are_detectable() {
        assert!(QueryParams::new().is_empty());
        assert!(!QueryParams::new().push("a", 1).is_empty());
    }
}
