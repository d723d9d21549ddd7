//! Talent tree: prerequisite-gated unlocks and aggregated bonuses.
//!
//! The persisted form is a flat list of [`TalentNode`]s with string
//! prerequisite edges. [`TalentTree`] turns that into an arena keyed by id,
//! checked at load time that every edge resolves and that the edges form
//! a forest. Unlocking is pure: it returns a new tree and the remaining
//! skill points.

use std::collections::BTreeMap;

use vetlogic_types::{EffectKind, GameState, TalentNode};

use crate::error::EngineError;

/// Whether `node` can be unlocked with `skill_points` given the rest of
/// the tree.
///
/// True iff the node is locked, affordable, and its prerequisite (if any)
/// is present in `all` and unlocked.
pub fn can_unlock(node: &TalentNode, all: &[TalentNode], skill_points: u32) -> bool {
    if node.unlocked || skill_points < node.cost {
        return false;
    }
    node.prerequisite.as_ref().is_none_or(|pre| {
        all.iter()
            .find(|candidate| &candidate.id == pre)
            .is_some_and(|candidate| candidate.unlocked)
    })
}

/// Validated id-to-node arena preserving display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentTree {
    order: Vec<String>,
    nodes: BTreeMap<String, TalentNode>,
}

impl TalentTree {
    /// Build and validate a tree.
    ///
    /// Rejects duplicate ids, prerequisites naming unknown nodes, and
    /// prerequisite cycles.
    pub fn from_nodes(list: Vec<TalentNode>) -> Result<Self, EngineError> {
        let mut order = Vec::with_capacity(list.len());
        let mut nodes = BTreeMap::new();
        for node in list {
            if nodes.contains_key(&node.id) {
                return Err(EngineError::InvalidTalentTree(format!(
                    "duplicate id {}",
                    node.id
                )));
            }
            order.push(node.id.clone());
            nodes.insert(node.id.clone(), node);
        }

        for node in nodes.values() {
            if let Some(pre) = &node.prerequisite
                && !nodes.contains_key(pre)
            {
                return Err(EngineError::InvalidTalentTree(format!(
                    "{} requires unknown {pre}",
                    node.id
                )));
            }
        }

        // Each node has at most one parent, so a chain longer than the
        // node count must revisit a node.
        for start in nodes.keys() {
            let mut cursor = nodes.get(start).and_then(|n| n.prerequisite.as_ref());
            let mut steps = 0_usize;
            while let Some(id) = cursor {
                steps = steps.saturating_add(1);
                if id == start || steps > nodes.len() {
                    return Err(EngineError::InvalidTalentTree(format!(
                        "prerequisite cycle through {start}"
                    )));
                }
                cursor = nodes.get(id).and_then(|n| n.prerequisite.as_ref());
            }
        }

        Ok(Self { order, nodes })
    }

    fn check_unlock(&self, id: &str, skill_points: u32) -> Result<&TalentNode, EngineError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| EngineError::UnknownTalent(id.to_owned()))?;
        let locked = |reason: String| EngineError::TalentLocked {
            id: id.to_owned(),
            reason,
        };
        if node.unlocked {
            return Err(locked("already unlocked".to_owned()));
        }
        if skill_points < node.cost {
            return Err(locked(format!(
                "needs {} skill points, have {skill_points}",
                node.cost
            )));
        }
        if let Some(pre) = &node.prerequisite
            && !self.nodes.get(pre).is_some_and(|p| p.unlocked)
        {
            return Err(locked(format!("prerequisite {pre} is locked")));
        }
        Ok(node)
    }

    /// Unlock `id`, returning the new tree and the skill points left.
    pub fn unlock(&self, id: &str, skill_points: u32) -> Result<(Self, u32), EngineError> {
        let node = self.check_unlock(id, skill_points)?;
        let remaining =
            skill_points
                .checked_sub(node.cost)
                .ok_or_else(|| EngineError::ArithmeticOverflow {
                    context: format!("skill points for {id}"),
                })?;
        let mut next = self.clone();
        if let Some(entry) = next.nodes.get_mut(id) {
            entry.unlocked = true;
        }
        Ok((next, remaining))
    }

    /// Consume the tree back into its display-ordered list.
    pub fn into_nodes(mut self) -> Vec<TalentNode> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.remove(id))
            .collect()
    }
}

/// Unlock a talent on a whole game state.
pub fn unlock_talent(state: GameState, id: &str) -> Result<GameState, EngineError> {
    let tree = TalentTree::from_nodes(state.talents.clone())?;
    let (tree, skill_points) = tree.unlock(id, state.skill_points)?;
    tracing::info!(talent = id, skill_points, "talent unlocked");
    Ok(GameState {
        talents: tree.into_nodes(),
        skill_points,
        ..state
    })
}

// ---------------------------------------------------------------------------
// Bonuses
// ---------------------------------------------------------------------------

/// Aggregated numeric effects of unlocked talents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TalentBonuses {
    /// Percentage added to experience gains.
    pub xp_percent: u32,
    /// Percentage added to reputation gains.
    pub reputation_percent: u32,
    /// Percentage of clinical income paid as a tip.
    pub tip_percent: u32,
    /// Minimum score for the tip.
    pub tip_min_score: u32,
    /// Percentage change on equipment prices. Negative is a discount.
    pub price_percent: i32,
}

impl TalentBonuses {
    /// Sum the effects of the unlocked nodes among `nodes`.
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a TalentNode>) -> Self {
        let mut bonuses = Self::default();
        for node in nodes.into_iter().filter(|n| n.unlocked) {
            let effect = &node.effect;
            let positive = u32::try_from(effect.value).unwrap_or(0);
            match effect.kind {
                EffectKind::XpBonus => {
                    bonuses.xp_percent = bonuses.xp_percent.saturating_add(positive);
                }
                EffectKind::RepBonus => {
                    bonuses.reputation_percent =
                        bonuses.reputation_percent.saturating_add(positive);
                }
                EffectKind::MoneyBonus => {
                    bonuses.price_percent = bonuses.price_percent.saturating_add(effect.value);
                }
                EffectKind::TipBonus => {
                    let min_score = match effect.condition.as_deref() {
                        None => Some(0),
                        Some(condition) => parse_score_condition(condition),
                    };
                    if let Some(min_score) = min_score {
                        bonuses.tip_percent = bonuses.tip_percent.saturating_add(positive);
                        bonuses.tip_min_score = bonuses.tip_min_score.max(min_score);
                    } else {
                        tracing::warn!(talent = %node.id, condition = ?effect.condition, "unrecognised talent condition");
                    }
                }
                EffectKind::Hint | EffectKind::Tolerance | EffectKind::Unlock => {}
            }
        }
        bonuses
    }
}

/// Parse a `score>=N` condition.
pub fn parse_score_condition(condition: &str) -> Option<u32> {
    let compact: String = condition.chars().filter(|c| !c.is_whitespace()).collect();
    compact.strip_prefix("score>=")?.parse().ok()
}
