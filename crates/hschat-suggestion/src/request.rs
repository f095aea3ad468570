//! 제안 요청.
//!
//! 사용자 선호 입력 → `get_suggestions` 이벤트.

use serde_json::{Map, Value};

/// 선호 입력 파싱
///
/// `budget=economique, categorie=sucré` 형태면 JSON 객체로,
/// 그 외 자유 텍스트는 문자열 그대로 보낸다.
pub fn parse_preferences(input: &str) -> Value {
    let input = input.trim();
    if input.is_empty() {
        return Value::Object(Map::new());
    }

    let pairs: Option<Map<String, Value>> = input
        .split(',')
        .map(|part| {
            let (key, value) = part.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), Value::String(value.trim().to_string())))
        })
        .collect();

    pairs.map_or_else(|| Value::String(input.to_string()), Value::Object)
}
