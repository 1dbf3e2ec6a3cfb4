//! Cooldown-aware random selection.
//!
//! Eligibility is recomputed from scratch on every call. The cooldown window
//! is always derived from the document's current `cooldown_weeks`, so changing
//! the setting applies retroactively to every existing stamp.

use crate::types::*;
use rand::Rng;

/// A single eligible option is never auto-picked
pub const MIN_PICK_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Need at least {} eligible restaurants to pick, found {eligible}", MIN_PICK_OPTIONS)]
    InsufficientOptions { eligible: usize },
}

/// Length of the cooldown window in milliseconds
pub fn cooldown_window_ms(cooldown_weeks: f64) -> f64 {
    cooldown_weeks * WEEK_IN_MS as f64
}

/// Whether a restaurant may be picked at `now`.
///
/// The window boundary is exclusive: a restaurant stamped at `t` becomes
/// eligible only once `now - t` strictly exceeds the window. Elapsed time is
/// computed in f64 so stamps anywhere in the i64 range cannot overflow; a
/// stamp in the future is still cooling down.
pub fn is_eligible(restaurant: &Restaurant, cooldown_weeks: f64, now: TimestampMs) -> bool {
    if restaurant.blacklisted {
        return false;
    }
    match restaurant.last_selected_date {
        None => true,
        Some(stamp) => elapsed_ms(now, stamp) > cooldown_window_ms(cooldown_weeks),
    }
}

fn elapsed_ms(now: TimestampMs, stamp: TimestampMs) -> f64 {
    now as f64 - stamp as f64
}

/// Every restaurant that is not blacklisted and not cooling down, in list order
pub fn select_eligible(
    restaurants: &[Restaurant],
    cooldown_weeks: f64,
    now: TimestampMs,
) -> Vec<&Restaurant> {
    restaurants
        .iter()
        .filter(|r| is_eligible(r, cooldown_weeks, now))
        .collect()
}

/// Uniformly pick one of `eligible`
pub fn pick<'a, R: Rng>(
    eligible: &[&'a Restaurant],
    rng: &mut R,
) -> Result<&'a Restaurant, SelectionError> {
    if eligible.len() < MIN_PICK_OPTIONS {
        return Err(SelectionError::InsufficientOptions {
            eligible: eligible.len(),
        });
    }
    let index = rng.random_range(0..eligible.len());
    Ok(eligible[index])
}

/// Pick from the document and stamp the chosen restaurant with `now`.
///
/// On failure the document is left untouched. On success the caller must
/// persist `doc`.
pub fn pick_and_stamp<R: Rng>(
    doc: &mut ServerState,
    now: TimestampMs,
    rng: &mut R,
) -> Result<Restaurant, SelectionError> {
    let chosen_id = {
        let eligible = select_eligible(&doc.restaurants, doc.cooldown_weeks, now);
        pick(&eligible, rng)?.id.clone()
    };

    let chosen = doc
        .restaurants
        .iter_mut()
        .find(|r| r.id == chosen_id)
        .ok_or(SelectionError::InsufficientOptions { eligible: 0 })?;
    chosen.last_selected_date = Some(now);
    Ok(chosen.clone())
}
