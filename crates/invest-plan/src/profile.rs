//! Customer profile and its prompt bindings

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Rendered for any field the customer left out
pub const NOT_PROVIDED: &str = "not provided";

/// What the planner knows about the customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerProfile {
    pub customer_name: Option<String>,
    pub age: Option<u32>,
    pub income: Option<f64>,
    pub occupation: Option<String>,
    pub budget_usd: Option<f64>,
    pub time_horizon_weeks: Option<u32>,
    pub risk_level: Option<String>,
    pub asset_preference: Option<String>,
    pub liquidity: Option<String>,
}

fn or_not_provided<T: Serialize>(value: Option<&T>) -> Value {
    value.map_or_else(|| json!(NOT_PROVIDED), |v| json!(v))
}

impl CustomerProfile {
    /// Template bindings for the profile plus `date` and `day` of `today`
    pub fn bindings(&self, today: NaiveDate) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("customer_name".into(), or_not_provided(self.customer_name.as_ref()));
        map.insert("age".into(), or_not_provided(self.age.as_ref()));
        map.insert("income".into(), or_not_provided(self.income.as_ref()));
        map.insert("occupation".into(), or_not_provided(self.occupation.as_ref()));
        map.insert("budget_usd".into(), or_not_provided(self.budget_usd.as_ref()));
        map.insert(
            "time_horizon_weeks".into(),
            or_not_provided(self.time_horizon_weeks.as_ref()),
        );
        map.insert("risk_level".into(), or_not_provided(self.risk_level.as_ref()));
        map.insert(
            "asset_preference".into(),
            or_not_provided(self.asset_preference.as_ref()),
        );
        map.insert("liquidity".into(), or_not_provided(self.liquidity.as_ref()));
        map.insert("date".into(), json!(today.format("%Y-%m-%d").to_string()));
        map.insert("day".into(), json!(today.format("%A").to_string()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_render_not_provided() {
        let profile = CustomerProfile {
            customer_name: Some("Ada".into()),
            age: Some(36),
            ..CustomerProfile::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        let bindings = profile.bindings(today);

        assert_eq!(bindings["customer_name"], "Ada");
        assert_eq!(bindings["age"], 36);
        assert_eq!(bindings["income"], NOT_PROVIDED);
        assert_eq!(bindings["liquidity"], NOT_PROVIDED);
        assert_eq!(bindings["date"], "2024-11-20");
        assert_eq!(bindings["day"], "Wednesday");
    }

    #[test]
    fn test_profile_from_partial_json() {
        let profile: CustomerProfile =
            serde_json::from_value(json!({ "budget_usd": 5000.0, "risk_level": "low" })).unwrap();
        assert_eq!(profile.budget_usd, Some(5000.0));
        assert!(profile.occupation.is_none());
    }
}
