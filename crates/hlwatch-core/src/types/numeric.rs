//! 관대한 숫자 파싱 유틸리티.
//!
//! 업스트림 API는 같은 필드를 JSON 숫자, 숫자 문자열, `{"value": ...}` 형태의
//! 매핑, 또는 단일 원소 배열로 보낼 수 있습니다. 이 모듈은 그 모든 형태를
//! 하나의 타입으로 흡수하고, "필드가 존재하고 유효했는지"를 값과 함께
//! 보존합니다. 기본값 대체는 호출부에서 명시적으로 수행합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// 관대하게 파싱되는 숫자 필드.
///
/// 역직렬화는 실패하지 않습니다. 값이 없거나 해석 불가능하면 `None`을
/// 담고, 호출부가 `or`/`or_zero`로 기본값을 결정합니다. `is_present`는
/// "명시적 0"과 "기본값으로 대체된 0"을 구분할 때 사용합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LenientDecimal(Option<Decimal>);

impl LenientDecimal {
    /// 유효한 값을 담은 필드를 생성합니다.
    pub fn new(value: Decimal) -> Self {
        Self(Some(value))
    }

    /// 비어 있는 필드를 생성합니다.
    pub fn missing() -> Self {
        Self(None)
    }

    /// 파싱된 값을 반환합니다.
    pub fn value(&self) -> Option<Decimal> {
        self.0
    }

    /// 값이 존재하고 유효했는지 확인합니다.
    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// 값이 없으면 주어진 기본값을 반환합니다.
    pub fn or(&self, default: Decimal) -> Decimal {
        self.0.unwrap_or(default)
    }

    /// 값이 없으면 0을 반환합니다.
    pub fn or_zero(&self) -> Decimal {
        self.0.unwrap_or(Decimal::ZERO)
    }
}

impl From<Decimal> for LenientDecimal {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for LenientDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self(coerce_decimal(&raw)))
    }
}

/// JSON 값을 Decimal로 해석합니다.
///
/// 허용 형태:
/// - 숫자: `1.5`
/// - 숫자 문자열: `"1.5"` (지수 표기 포함)
/// - `value` 필드를 가진 매핑: `{"type": "cross", "value": 20}`
/// - 단일 원소 배열: `[1.5]` (첫 원소만 사용)
///
/// 해석할 수 없으면 `None`을 반환합니다.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => parse_decimal_str(s.trim()),
        Value::Object(map) => map.get("value").and_then(coerce_decimal),
        Value::Array(items) => items.first().and_then(coerce_decimal),
        _ => None,
    }
}

/// 일반 표기와 지수 표기를 모두 허용하는 문자열 파싱.
fn parse_decimal_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default)]
        field: LenientDecimal,
    }

    fn parse(v: Value) -> LenientDecimal {
        serde_json::from_value::<Probe>(json!({ "field": v }))
            .unwrap()
            .field
    }

    #[test]
    fn test_accepts_number() {
        assert_eq!(parse(json!(1.5)).value(), Some(dec!(1.5)));
        assert_eq!(parse(json!(-3)).value(), Some(dec!(-3)));
    }

    #[test]
    fn test_accepts_numeric_string() {
        assert_eq!(parse(json!("60000")).value(), Some(dec!(60000)));
        assert_eq!(parse(json!(" 1.25 ")).value(), Some(dec!(1.25)));
        assert_eq!(parse(json!("2e3")).value(), Some(dec!(2000)));
    }

    #[test]
    fn test_accepts_value_mapping() {
        let v = parse(json!({"type": "cross", "value": 20}));
        assert_eq!(v.value(), Some(dec!(20)));

        let nested = parse(json!({"value": "2.5"}));
        assert_eq!(nested.value(), Some(dec!(2.5)));
    }

    #[test]
    fn test_accepts_singleton_array() {
        assert_eq!(parse(json!(["1.5", "9"])).value(), Some(dec!(1.5)));
        assert_eq!(parse(json!([])).value(), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse(json!("not a number")).value(), None);
        assert_eq!(parse(json!(null)).value(), None);
        assert_eq!(parse(json!(true)).value(), None);
        assert_eq!(parse(json!({"other": 1})).value(), None);
    }

    #[test]
    fn test_missing_field_is_absent() {
        let probe: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(!probe.field.is_present());
        assert_eq!(probe.field.or_zero(), Decimal::ZERO);
        assert_eq!(probe.field.or(dec!(1)), dec!(1));
    }

    #[test]
    fn test_explicit_zero_is_present() {
        let zero = parse(json!("0.0"));
        assert!(zero.is_present());
        assert_eq!(zero.or(dec!(1)), Decimal::ZERO);
    }
}
