//! Forward migration of persisted saves.
//!
//! Saves written by any earlier version are upgraded additively:
//!
//! 1. The blob must be a JSON object with a numeric `money` and an array
//!    `inventory`; anything else is rejected.
//! 2. The inventory is rebuilt from the current catalog, carrying over
//!    only each saved item's `owned` flag. Talents are rebuilt from the
//!    current tree the same way, carrying over `unlocked`.
//! 3. Every other field is read individually. Fractional counters are
//!    rounded to the nearest integer. Missing or unreadable fields take
//!    their defaults; history entries that no longer parse are dropped one
//!    by one.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use vetlogic_engine::{GameRules, initial_state};
use vetlogic_types::{
    CaseHistoryItem, Equipment, GameState, TalentNode, default_catalog, default_talents,
};

use crate::error::MigrationError;

/// Rebuild a [`GameState`] from a persisted blob.
pub fn migrate(raw: &str, rules: &GameRules) -> Result<GameState, MigrationError> {
    let value: Value = serde_json::from_str(raw)?;
    let obj = value
        .as_object()
        .ok_or(MigrationError::Shape("save is not an object"))?;
    if !obj.get("money").is_some_and(Value::is_number) {
        return Err(MigrationError::Shape("money is not a number"));
    }
    let Some(Value::Array(saved_inventory)) = obj.get("inventory") else {
        return Err(MigrationError::Shape("inventory is not an array"));
    };

    let defaults = initial_state(rules);
    let max_energy = number(obj, "maxEnergy").unwrap_or(defaults.max_energy);
    let energy = number(obj, "energy")
        .unwrap_or(defaults.energy)
        .min(max_energy);

    Ok(GameState {
        money: number(obj, "money").unwrap_or(defaults.money),
        reputation: number(obj, "reputation").unwrap_or(defaults.reputation),
        experience: number(obj, "experience").unwrap_or(defaults.experience),
        rank: field(obj, "rank").unwrap_or(defaults.rank),
        energy,
        max_energy,
        inventory: merge_inventory(saved_inventory),
        total_patients_treated: number(obj, "totalPatientsTreated")
            .unwrap_or(defaults.total_patients_treated),
        case_history: case_history(obj),
        skill_points: number(obj, "skillPoints").unwrap_or(defaults.skill_points),
        talents: match obj.get("talents") {
            Some(Value::Array(saved)) => merge_talents(saved),
            _ => defaults.talents,
        },
        milestones: field(obj, "milestones").unwrap_or(defaults.milestones),
    })
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(field = key, error = %e, "unreadable save field, using default");
            None
        }
    }
}

/// Largest magnitude a fractional counter may have and still be rounded
/// into an integer exactly.
const MAX_ROUNDED: f64 = 9.0e15;

/// A numeric field; fractional values are rounded.
fn number<T>(obj: &Map<String, Value>, key: &str) -> Option<T>
where
    T: DeserializeOwned + TryFrom<i64>,
{
    let value = obj.get(key)?;
    if !value.is_f64() {
        return field(obj, key);
    }
    let rounded = value
        .as_f64()
        .filter(|f| f.is_finite() && f.abs() <= MAX_ROUNDED)
        .map(f64::round);
    // Bounded by MAX_ROUNDED above.
    #[allow(clippy::cast_possible_truncation)]
    let whole = rounded.map(|f| f as i64);
    let converted = whole.and_then(|n| T::try_from(n).ok());
    if converted.is_none() {
        tracing::warn!(field = key, value = %value, "unreadable save number, using default");
    }
    converted
}

fn find_by_id<'a>(saved: &'a [Value], id: &str) -> Option<&'a Value> {
    saved
        .iter()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(id))
}

fn saved_flag(saved: &[Value], id: &str, flag: &str) -> Option<bool> {
    find_by_id(saved, id).map(|item| item.get(flag).and_then(Value::as_bool).unwrap_or(false))
}

/// Current catalog with `owned` carried over from the saved inventory.
pub fn merge_inventory(saved: &[Value]) -> Vec<Equipment> {
    default_catalog()
        .into_iter()
        .map(|mut item| {
            if let Some(owned) = saved_flag(saved, &item.id, "owned") {
                item.owned = owned;
            }
            item
        })
        .collect()
}

/// Current talent tree with `unlocked` carried over from the saved list.
pub fn merge_talents(saved: &[Value]) -> Vec<TalentNode> {
    default_talents()
        .into_iter()
        .map(|mut node| {
            if let Some(unlocked) = saved_flag(saved, &node.id, "unlocked") {
                node.unlocked = unlocked;
            }
            node
        })
        .collect()
}

fn case_history(obj: &Map<String, Value>) -> Vec<CaseHistoryItem> {
    let Some(Value::Array(items)) = obj.get("caseHistory") else {
        return Vec::new();
    };
    let parsed: Vec<CaseHistoryItem> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    if parsed.len() < items.len() {
        tracing::warn!(
            dropped = items.len().saturating_sub(parsed.len()),
            "dropped unreadable case history entries"
        );
    }
    parsed
}
