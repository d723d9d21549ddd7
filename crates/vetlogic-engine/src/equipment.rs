//! Equipment purchases and case data gating.
//!
//! A clinical case is shown to the player with every field whose unlock
//! key is not provided by owned equipment blanked out. Fields without a
//! gate (signalment, history, physical exam) are always visible.

use std::collections::BTreeSet;

use vetlogic_types::{ClinicalCase, Equipment, GameState, Imaging};

use crate::error::EngineError;

/// Unlock key for temperature, pulse and respiration.
pub const PARAM_TPR: &str = "tpr";
/// Unlock key for the Wood's lamp exam.
pub const PARAM_WOODS_LAMP: &str = "woodsLamp";
/// Unlock key for blood pressure.
pub const PARAM_BP: &str = "bp";
/// Unlock key for the CBC panel.
pub const PARAM_CBC: &str = "cbc";
/// Unlock key for the chemistry panel.
pub const PARAM_CHEM: &str = "chem";
/// Unlock key for blood gas.
pub const PARAM_BLOOD_GAS: &str = "bloodGas";
/// Unlock key for radiographs.
pub const PARAM_XRAY: &str = "xray";
/// Unlock key for ultrasound.
pub const PARAM_USG: &str = "usg";

/// Every case data key revealed by owned equipment.
pub fn unlocked_params(inventory: &[Equipment]) -> BTreeSet<&str> {
    inventory
        .iter()
        .filter(|e| e.owned)
        .flat_map(|e| e.unlocks_params.iter().map(String::as_str))
        .collect()
}

/// Price after a percentage adjustment, never below zero.
pub fn adjusted_price(cost: i64, price_percent: i32) -> i64 {
    let delta = cost
        .saturating_mul(i64::from(price_percent))
        .checked_div(100)
        .unwrap_or(0);
    cost.saturating_add(delta).max(0)
}

/// Buy `id`, deducting its adjusted price and marking it owned.
pub fn purchase(state: GameState, id: &str, price_percent: i32) -> Result<GameState, EngineError> {
    let item = state
        .inventory
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| EngineError::UnknownEquipment(id.to_owned()))?;
    if item.owned {
        return Err(EngineError::AlreadyOwned(id.to_owned()));
    }
    let price = adjusted_price(item.cost, price_percent);
    if state.money < price {
        return Err(EngineError::InsufficientFunds {
            required: price,
            available: state.money,
        });
    }
    let money = state
        .money
        .checked_sub(price)
        .ok_or_else(|| EngineError::ArithmeticOverflow {
            context: format!("purchase of {id}"),
        })?;
    let inventory = state
        .inventory
        .into_iter()
        .map(|mut e| {
            if e.id == id {
                e.owned = true;
            }
            e
        })
        .collect();
    tracing::info!(equipment = id, price, money, "equipment purchased");
    Ok(GameState {
        money,
        inventory,
        ..state
    })
}

/// The case as the player sees it with the given inventory.
pub fn reveal_case(case: &ClinicalCase, inventory: &[Equipment]) -> ClinicalCase {
    let params = unlocked_params(inventory);
    let has = |p: &str| params.contains(p);
    let mut view = case.clone();

    if !has(PARAM_TPR) {
        view.tpr = None;
    } else if !has(PARAM_BP)
        && let Some(tpr) = view.tpr.as_mut()
    {
        tpr.bp = None;
    }
    if !has(PARAM_WOODS_LAMP) {
        view.physical_exam.woods_lamp = None;
    }
    if !has(PARAM_CBC) {
        view.cbc = None;
        view.cbc_summary = None;
    }
    if !has(PARAM_CHEM) {
        view.chem = None;
        view.chem_summary = None;
    }
    if !has(PARAM_BLOOD_GAS) {
        view.blood_gas = None;
    }
    if !has(PARAM_XRAY) {
        view.xray_summary = None;
    }
    if let Some(imaging) = view.imaging.take() {
        let gated = Imaging {
            xray_description: imaging.xray_description.filter(|_| has(PARAM_XRAY)),
            usg_description: imaging.usg_description.filter(|_| has(PARAM_USG)),
        };
        view.imaging = (!gated.is_empty()).then_some(gated);
    }
    view
}
