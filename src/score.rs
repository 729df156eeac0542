//! Deterministic radar scoring for a fusion route.
//!
//! Cheap local heuristics over the serialized route: its length drives
//! novelty and a few keywords bump brand fit, feasibility and risk.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const BRAND_KEYWORD: &str = "品牌";
const VALIDATION_KEYWORD: &str = "验证";
const RISK_KEYWORD: &str = "风险";

#[derive(Deserialize, Debug, Default)]
pub struct ScoreRequest {
    #[serde(default)]
    pub route: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Radar {
    pub novelty: u32,
    pub brand_fit: u32,
    pub feasibility: u32,
    pub cost: u32,
    pub risk: u32,
}

#[derive(Serialize, Debug)]
pub struct ScoreResponse {
    pub radar: Radar,
}

// null, false, 0 and "" all score like an empty route
fn is_blank(route: &Value) -> bool {
    match route {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn score_route(route: &Value) -> Radar {
    let text = if is_blank(route) {
        "\"\"".to_string()
    } else {
        route.to_string()
    };
    // length in UTF-16 units, as browsers count it
    let length = text.encode_utf16().count() as u32;
    let bump = |keyword: &str, by: u32| if text.contains(keyword) { by } else { 0 };

    Radar {
        novelty: (1 + length % 5).min(5),
        brand_fit: 3 + bump(BRAND_KEYWORD, 1),
        feasibility: 3 + bump(VALIDATION_KEYWORD, 1),
        cost: 3,
        risk: 2 + bump(RISK_KEYWORD, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_route_gets_baseline() {
        let baseline = Radar {
            novelty: 3,
            brand_fit: 3,
            feasibility: 3,
            cost: 3,
            risk: 2,
        };
        for route in [Value::Null, json!(""), json!(false), json!(0)] {
            assert_eq!(score_route(&route), baseline, "{route}");
        }
    }

    #[test]
    fn keywords_bump_their_axes() {
        let radar = score_route(&json!("品牌验证风险"));
        assert_eq!(radar.brand_fit, 4);
        assert_eq!(radar.feasibility, 4);
        assert_eq!(radar.risk, 4);
        assert_eq!(radar.cost, 3);
        // "\"品牌验证风险\"" is 8 units long
        assert_eq!(radar.novelty, 4);
    }

    #[test]
    fn novelty_follows_serialized_length() {
        assert_eq!(score_route(&json!("abc")).novelty, 1);
        assert_eq!(score_route(&json!("abcd")).novelty, 2);
        assert_eq!(score_route(&json!(["x"])).novelty, 1);
    }
}
