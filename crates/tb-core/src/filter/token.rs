//! # Filter Token Codec
//!
//! One filter travels inside a single query-string value shaped as
//! `value1.value2~operator~multi`: dot-joined raw values, then an optional
//! comparison operator, then an optional multi marker. Parsing is
//! best-effort by policy; malformed input degrades, it never errors.

/// Parsed form of one filter token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedToken {
    pub values: Vec<String>,
    pub operator: Option<String>,
    pub is_multi: bool,
}

/// Encodes a filter's values, comparison operator and multi flag into the
/// delimited wire form. Never emits a trailing `~` when both operator and
/// multi marker are absent. When the multi marker is present but the
/// operator is not, an empty operator slot keeps the marker in segment
/// three where the decoder expects it.
pub fn encode(values: &[String], operator: Option<&str>, is_multi: bool) -> String {
    let mut token = values.join(".");

    match operator {
        Some(op) if !op.is_empty() => {
            token.push('~');
            token.push_str(op);
        }
        _ if is_multi => token.push('~'),
        _ => {}
    }

    if is_multi {
        token.push_str("~multi");
    }

    token
}

/// Decodes a token back into values, operator and multi flag.
///
/// Splits on `~` into at most three segments, then splits the value blob on
/// `.`, dropping empty strings. Missing segments default to absent/false;
/// an empty token yields an empty filter.
pub fn decode(raw: &str) -> DecodedToken {
    let mut parts = raw.splitn(3, '~');

    let values = parts
        .next()
        .unwrap_or_default()
        .split('.')
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    let operator = parts.next().filter(|op| !op.is_empty()).map(str::to_string);

    let is_multi = parts.next().is_some_and(|m| !m.is_empty());

    DecodedToken { values, operator, is_multi }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vals(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn encode_plain_values_has_no_trailing_delimiter() {
        assert_eq!(encode(&vals(&["kick"]), None, false), "kick");
        assert_eq!(encode(&vals(&["a", "b"]), None, false), "a.b");
    }

    #[test]
    fn encode_with_operator_and_multi() {
        assert_eq!(encode(&vals(&["al"]), Some("contains"), true), "al~contains~multi");
        assert_eq!(
            encode(&vals(&["draft", "published"]), Some("eq"), true),
            "draft.published~eq~multi"
        );
    }

    #[test]
    fn encode_multi_without_operator_keeps_marker_in_third_slot() {
        let token = encode(&vals(&["x"]), None, true);
        assert_eq!(token, "x~~multi");
        assert_eq!(
            decode(&token),
            DecodedToken { values: vals(&["x"]), operator: None, is_multi: true }
        );
    }

    #[test]
    fn decode_is_inverse_of_encode() {
        for op in [None, Some("eq"), Some("notEq"), Some("contains")] {
            for is_multi in [false, true] {
                let values = vals(&["draft", "published"]);
                let token = encode(&values, op, is_multi);
                let decoded = decode(&token);
                assert_eq!(decoded.values, values);
                assert_eq!(decoded.operator.as_deref(), op);
                assert_eq!(decoded.is_multi, is_multi);
            }
        }
    }

    #[test]
    fn decode_degrades_on_malformed_input() {
        assert_eq!(decode(""), DecodedToken::default());
        assert_eq!(decode("~~"), DecodedToken::default());
        assert_eq!(
            decode("..a..b."),
            DecodedToken { values: vals(&["a", "b"]), operator: None, is_multi: false }
        );
        // Empty third segment is not a multi marker.
        assert_eq!(
            decode("a~eq~"),
            DecodedToken { values: vals(&["a"]), operator: Some("eq".into()), is_multi: false }
        );
    }
}
