use serde::{Deserialize, Serialize};

/// Opaque ID types for readability
pub type RestaurantId = String;
pub type SessionId = String;

/// Milliseconds since the Unix epoch
pub type TimestampMs = i64;

pub const WEEK_IN_MS: i64 = 7 * 24 * 60 * 60 * 1000;

pub const DEFAULT_COOLDOWN_WEEKS: f64 = 2.0;

/// Restaurant names are trimmed and must be 1..=MAX_NAME_CHARS characters
pub const MAX_NAME_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub blacklisted: bool,
    /// When this restaurant was last picked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected_date: Option<TimestampMs>,
}

/// The single shared document. Read and written wholesale on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerState {
    /// Insertion order is display order
    pub restaurants: Vec<Restaurant>,
    pub cooldown_weeks: f64,
    /// Session that last supplied the activation secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_by: Option<SessionId>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            restaurants: Vec::new(),
            cooldown_weeks: DEFAULT_COOLDOWN_WEEKS,
            activated_by: None,
        }
    }
}

/// Partial document accepted by `PUT /api/state`.
///
/// Absent fields keep the stored value. Invalid values are also ignored
/// server-side, so this type is only used by clients building a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurants: Option<Vec<Restaurant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_weeks: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_by: Option<SessionId>,
}

/// Result of a successful pick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickOutcome {
    pub picked: Restaurant,
    pub state: ServerState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_shape() {
        let json = serde_json::to_value(ServerState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "restaurants": [], "cooldownWeeks": 2.0 })
        );
    }

    #[test]
    fn test_restaurant_uses_camel_case() {
        let restaurant = Restaurant {
            id: "r1".to_string(),
            name: "Pho 99".to_string(),
            blacklisted: false,
            last_selected_date: Some(1_700_000_000_000),
        };
        let json = serde_json::to_value(&restaurant).unwrap();
        assert_eq!(json["lastSelectedDate"], 1_700_000_000_000i64);
        assert!(json.get("last_selected_date").is_none());
    }

    #[test]
    fn test_patch_omits_absent_fields() {
        let patch = StatePatch {
            cooldown_weeks: Some(3.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "cooldownWeeks": 3.0 }));
    }
}
