//! 상품 제안 모델.
//!
//! 서버 `suggestions` 이벤트로 수신하는 상품 목록. 모든 메타데이터 필드는
//! 누락될 수 있으며, 기본값은 표시 시점에 프레젠터가 채운다.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::lenient;

/// 제안 상품 한 건
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSuggestion {
    /// 상품 메타데이터 (없을 수 있음)
    #[serde(default)]
    pub metadata: Option<ProductMetadata>,
}

/// 상품 메타데이터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: Option<String>,
    /// 가격 (숫자 또는 숫자 문자열)
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_tier")]
    pub price_tier: Option<PriceTier>,
}

fn lenient_tier<'de, D>(deserializer: D) -> Result<Option<PriceTier>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::string(deserializer)?.map(PriceTier::from))
}

/// 가격대
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PriceTier {
    /// 저가 (기본값)
    #[default]
    Economic,
    /// 중간
    Standard,
    /// 고가
    Premium,
    /// 알 수 없는 라벨 (원문 유지)
    Other(String),
}

impl PriceTier {
    /// 배지에 표시할 라벨
    pub fn label(&self) -> &str {
        match self {
            PriceTier::Economic => "économique",
            PriceTier::Standard => "standard",
            PriceTier::Premium => "premium",
            PriceTier::Other(raw) => raw,
        }
    }
}

impl From<String> for PriceTier {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "économique" | "economique" | "economic" => PriceTier::Economic,
            "standard" => PriceTier::Standard,
            "premium" => PriceTier::Premium,
            _ => PriceTier::Other(raw),
        }
    }
}

impl From<PriceTier> for String {
    fn from(tier: PriceTier) -> Self {
        tier.label().to_string()
    }
}
