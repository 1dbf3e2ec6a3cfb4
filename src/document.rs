//! Normalization and in-memory mutation of the shared document.
//!
//! Every document that crosses the store boundary goes through [`normalize`]
//! (raw JSON) or [`sanitize`] (typed), so malformed fields never propagate.
//! Both are idempotent.

use crate::types::*;
use serde_json::Value;
use std::collections::HashSet;

/// Rejections for user-supplied values on mutating operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Restaurant name must not be empty")]
    EmptyName,

    #[error("Restaurant name must be at most {} characters", MAX_NAME_CHARS)]
    NameTooLong,

    #[error("Cooldown must be a positive number of weeks")]
    InvalidCooldown,
}

/// Build a well-formed document from arbitrary JSON.
///
/// - non-array `restaurants` becomes empty
/// - entries without a string `id` and `name` are dropped, as are repeated ids
/// - `blacklisted` is coerced to a boolean, `lastSelectedDate` kept only if numeric
/// - `cooldownWeeks` falls back to 2 unless it is a positive finite number
/// - `activatedBy` kept only if it is a string
pub fn normalize(raw: &Value) -> ServerState {
    ServerState {
        restaurants: raw
            .get("restaurants")
            .map(normalize_restaurants)
            .unwrap_or_default(),
        cooldown_weeks: raw
            .get("cooldownWeeks")
            .and_then(coerce_cooldown)
            .unwrap_or(DEFAULT_COOLDOWN_WEEKS),
        activated_by: raw
            .get("activatedBy")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Field-level shallow merge of a partial document over `current`.
///
/// Each of `restaurants`, `cooldownWeeks` and `activatedBy` independently
/// keeps the current value when absent or invalid in `patch`. A patch that
/// is not a JSON object changes nothing.
pub fn merge(current: ServerState, patch: &Value) -> ServerState {
    let restaurants = match patch.get("restaurants") {
        Some(list) if list.is_array() => normalize_restaurants(list),
        _ => current.restaurants,
    };

    let cooldown_weeks = patch
        .get("cooldownWeeks")
        .and_then(coerce_cooldown)
        .unwrap_or(current.cooldown_weeks);

    let activated_by = match patch.get("activatedBy").and_then(Value::as_str) {
        Some(session) => Some(session.to_string()),
        None => current.activated_by,
    };

    sanitize(ServerState {
        restaurants,
        cooldown_weeks,
        activated_by,
    })
}

/// Re-establish document invariants on an already typed document
pub fn sanitize(mut doc: ServerState) -> ServerState {
    let mut seen = HashSet::new();
    doc.restaurants.retain(|r| seen.insert(r.id.clone()));
    if !is_valid_cooldown(doc.cooldown_weeks) {
        doc.cooldown_weeks = DEFAULT_COOLDOWN_WEEKS;
    }
    doc
}

fn normalize_restaurants(raw: &Value) -> Vec<Restaurant> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(normalize_restaurant)
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}

fn normalize_restaurant(raw: &Value) -> Option<Restaurant> {
    let id = raw.get("id")?.as_str()?;
    let name = raw.get("name")?.as_str()?;

    Some(Restaurant {
        id: id.to_string(),
        name: name.to_string(),
        blacklisted: raw.get("blacklisted").is_some_and(is_truthy),
        last_selected_date: raw.get("lastSelectedDate").and_then(coerce_timestamp),
    })
}

/// Loose truthiness, matching what browser clients send for checkboxes
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whole milliseconds are the canonical form. Fractions are truncated toward
/// zero and values outside the i64 range clamp to its bounds, so a stamp
/// beyond `i64::MAX` stays cooling down and one below `i64::MIN` is eligible.
fn coerce_timestamp(value: &Value) -> Option<TimestampMs> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    let ms = value.as_f64().filter(|f| f.is_finite())?.trunc();
    Some(if ms >= TimestampMs::MAX as f64 {
        TimestampMs::MAX
    } else if ms <= TimestampMs::MIN as f64 {
        TimestampMs::MIN
    } else {
        ms as TimestampMs
    })
}

fn coerce_cooldown(value: &Value) -> Option<f64> {
    let weeks = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    is_valid_cooldown(weeks).then_some(weeks)
}

fn is_valid_cooldown(weeks: f64) -> bool {
    weeks.is_finite() && weeks > 0.0
}

/// Trim and validate a user-supplied restaurant name
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong);
    }
    Ok(trimmed.to_string())
}

impl ServerState {
    pub fn find(&self, id: &str) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Restaurant> {
        self.restaurants.iter_mut().find(|r| r.id == id)
    }

    /// Append a new restaurant with a fresh id
    pub fn add_restaurant(&mut self, name: &str) -> Result<Restaurant, ValidationError> {
        let restaurant = Restaurant {
            id: ulid::Ulid::new().to_string(),
            name: validate_name(name)?,
            blacklisted: false,
            last_selected_date: None,
        };
        self.restaurants.push(restaurant.clone());
        Ok(restaurant)
    }

    pub fn remove_restaurant(&mut self, id: &str) -> Option<Restaurant> {
        let index = self.restaurants.iter().position(|r| r.id == id)?;
        Some(self.restaurants.remove(index))
    }

    pub fn toggle_blacklist(&mut self, id: &str) -> Option<&Restaurant> {
        let restaurant = self.find_mut(id)?;
        restaurant.blacklisted = !restaurant.blacklisted;
        Some(restaurant)
    }

    /// Make a restaurant immediately eligible again
    pub fn reset_cooldown(&mut self, id: &str) -> Option<&Restaurant> {
        let restaurant = self.find_mut(id)?;
        restaurant.last_selected_date = None;
        Some(restaurant)
    }

    /// Remove every restaurant whose id is listed. Returns how many were removed.
    pub fn bulk_delete(&mut self, ids: &[RestaurantId]) -> usize {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.restaurants.len();
        self.restaurants.retain(|r| !doomed.contains(r.id.as_str()));
        before - self.restaurants.len()
    }

    /// Applies retroactively to every existing stamp
    pub fn set_cooldown_weeks(&mut self, weeks: f64) -> Result<(), ValidationError> {
        if !is_valid_cooldown(weeks) {
            return Err(ValidationError::InvalidCooldown);
        }
        self.cooldown_weeks = weeks;
        Ok(())
    }
}
