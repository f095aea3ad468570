//! 필드 단위 관용 역직렬화.
//!
//! `#[serde(default, deserialize_with = "...")]`로 붙여 쓴다. 타입이 맞지 않는
//! 필드는 에러 대신 `None`(또는 `false`)이 되고, 나머지 필드는 그대로 살아남는다.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// 문자열만 받는다
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            debug!("문자열이 아닌 필드 무시: {other}");
            None
        }
    })
}

/// 문자열 또는 숫자 (숫자는 그대로 텍스트로)
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        other => {
            debug!("텍스트가 아닌 필드 무시: {other}");
            None
        }
    })
}

/// 참/거짓 판정 (빈 문자열, `0`, `null`은 거짓)
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
