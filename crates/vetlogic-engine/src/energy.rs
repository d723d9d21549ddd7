//! Energy spending and regeneration.

use vetlogic_types::GameState;

use crate::error::EngineError;

/// Energy after one regeneration tick, clamped to `max`.
pub const fn regenerate(energy: u32, max: u32, amount: u32) -> u32 {
    let next = energy.saturating_add(amount);
    if next > max { max } else { next }
}

/// Whether `energy` covers `cost`.
pub const fn can_afford(energy: u32, cost: u32) -> Result<(), EngineError> {
    if energy < cost {
        Err(EngineError::InsufficientEnergy {
            required: cost,
            available: energy,
        })
    } else {
        Ok(())
    }
}

/// Deduct `cost` energy.
pub fn spend(state: GameState, cost: u32) -> Result<GameState, EngineError> {
    can_afford(state.energy, cost)?;
    Ok(GameState {
        energy: state.energy.saturating_sub(cost),
        ..state
    })
}
