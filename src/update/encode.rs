//! Encoding replacement values as single YAML scalar tokens.

use crate::update::errors::UpdateError;

/// Characters a plain scalar may carry in block context but not reliably
/// inside a flow collection.
const FLOW_UNSAFE: &[char] = &[',', '[', ']', '{', '}', ':', '#'];

/// Encode `value` as the smallest YAML scalar that reads back as the same
/// string, e.g. `nginx` stays plain while `1.25` becomes `'1.25'`.
///
/// Values the encoder would emit as a multi-line block scalar are written as a
/// single-line double-quoted scalar instead, so the token can replace a value
/// at any indentation.
pub fn encode_scalar(field: &str, value: &str) -> Result<String, UpdateError> {
    let encoded = serde_yaml::to_string(value).map_err(|err| UpdateError::Encoding {
        field: field.to_string(),
        message: err.to_string(),
    })?;
    let token = encoded.strip_suffix('\n').unwrap_or(&encoded);

    if token.contains('\n') {
        return double_quoted(field, value);
    }
    Ok(token.to_string())
}

/// Adjust an encoded token for use inside a flow mapping or flow sequence,
/// where a plain scalar must not contain flow indicators or `:`.
pub fn encode_for_flow(field: &str, value: &str, token: &str) -> Result<String, UpdateError> {
    let quoted = token.starts_with('"') || token.starts_with('\'');
    if !quoted && token.contains(FLOW_UNSAFE) {
        return double_quoted(field, value);
    }
    Ok(token.to_string())
}

/// JSON string syntax is a valid YAML double-quoted scalar.
fn double_quoted(field: &str, value: &str) -> Result<String, UpdateError> {
    serde_json::to_string(value).map_err(|err| UpdateError::Encoding {
        field: field.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &str) -> String {
        encode_scalar("field", value).unwrap()
    }

    #[test]
    fn plain_strings_stay_plain() {
        assert_eq!(encode("xxx"), "xxx");
        assert_eq!(encode("registry.example.com/nginx"), "registry.example.com/nginx");
        assert_eq!(encode("a foo"), "a foo");
    }

    #[test]
    fn ambiguous_strings_are_quoted() {
        for value in ["1", "1.25", "true", "null", "~", ""] {
            let token = encode(value);
            assert!(
                token.starts_with('\'') || token.starts_with('"'),
                "{value:?} encoded as {token}"
            );
        }
    }

    #[test]
    fn indicator_strings_are_quoted() {
        for value in ["a: b", "- item", "# comment", "*alias", "&anchor", "x #y"] {
            let token = encode(value);
            assert!(
                token.starts_with('\'') || token.starts_with('"'),
                "{value:?} encoded as {token}"
            );
        }
    }

    #[test]
    fn multi_line_values_become_double_quoted() {
        assert_eq!(encode("one\ntwo"), "\"one\\ntwo\"");
    }

    #[test]
    fn encoded_tokens_round_trip() {
        for value in ["xxx", "1", "a: b", "one\ntwo", "quote's", "say \"hi\"", "naïve ☕"] {
            let token = encode(value);
            let parsed: String = serde_yaml::from_str(&token).unwrap();
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn flow_context_quotes_flow_indicators() {
        assert_eq!(encode_for_flow("field", "a,b", "a,b").unwrap(), "\"a,b\"");
        assert_eq!(encode_for_flow("field", "{x}", "{x}").unwrap(), "\"{x}\"");

        let token = encode_for_flow("field", "a,b", &encode("a,b")).unwrap();
        assert!(token.starts_with('"') || token.starts_with('\''));
        assert_eq!(encode_for_flow("field", "a:b", "a:b").unwrap(), "\"a:b\"");
        assert_eq!(encode_for_flow("field", "plain", "plain").unwrap(), "plain");
        assert_eq!(encode_for_flow("field", "1", "'1'").unwrap(), "'1'");
    }
}
