//! Enumeration types for the VetLogic game.
//!
//! Ranks, talent branches and effect kinds, and the exam question type.
//! Ranks serialize under their upper-case identifiers but still accept the
//! Chinese display labels written by older saves.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// A player's career tier.
///
/// Ranks are totally ordered; the derived `Ord` follows declaration order,
/// so `Rank::Student < Rank::Chief`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Rank {
    /// 兽医学生. Starting rank.
    #[serde(rename = "STUDENT", alias = "兽医学生")]
    Student,
    /// 实习医生.
    #[serde(rename = "INTERN", alias = "实习医生")]
    Intern,
    /// 住院医师.
    #[serde(rename = "RESIDENT", alias = "住院医师")]
    Resident,
    /// 专科医师.
    #[serde(rename = "SPECIALIST", alias = "专科医师")]
    Specialist,
    /// 主任医师. Terminal rank.
    #[serde(rename = "CHIEF", alias = "主任医师")]
    Chief,
}

impl Rank {
    /// Every rank in ladder order.
    pub const ALL: [Self; 5] = [
        Self::Student,
        Self::Intern,
        Self::Resident,
        Self::Specialist,
        Self::Chief,
    ];

    /// The rank one tier above this one, or `None` at the terminal rank.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Student => Some(Self::Intern),
            Self::Intern => Some(Self::Resident),
            Self::Resident => Some(Self::Specialist),
            Self::Specialist => Some(Self::Chief),
            Self::Chief => None,
        }
    }

    /// The in-game display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "兽医学生",
            Self::Intern => "实习医生",
            Self::Resident => "住院医师",
            Self::Specialist => "专科医师",
            Self::Chief => "主任医师",
        }
    }

    /// Case difficulty (1 to 5) targeted at this rank.
    pub const fn difficulty(self) -> u32 {
        match self {
            Self::Student => 1,
            Self::Intern => 2,
            Self::Resident => 3,
            Self::Specialist => 4,
            Self::Chief => 5,
        }
    }

    /// Upper-case identifier used on the wire.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Intern => "INTERN",
            Self::Resident => "RESIDENT",
            Self::Specialist => "SPECIALIST",
            Self::Chief => "CHIEF",
        }
    }
}

impl core::fmt::Display for Rank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Talents
// ---------------------------------------------------------------------------

/// The branch of the talent tree a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TalentBranch {
    /// Diagnosis and treatment skills.
    Clinical,
    /// Clinic business skills.
    Management,
    /// Study and research skills.
    Academic,
}

/// What a talent does once unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EffectKind {
    /// Percentage bonus on experience gains.
    XpBonus,
    /// Percentage change on equipment prices (negative is a discount).
    MoneyBonus,
    /// Percentage bonus on reputation gains.
    RepBonus,
    /// Extra diagnostic hints shown during a case.
    Hint,
    /// Evaluation tolerance granted to the player.
    Tolerance,
    /// Unlocks extra content slots.
    Unlock,
    /// Percentage tip on clinical income, usually conditional on score.
    TipBonus,
}

// ---------------------------------------------------------------------------
// Exam questions
// ---------------------------------------------------------------------------

/// Whether a question expects one option or a set of options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum QuestionType {
    /// Exactly one correct option.
    Single,
    /// Several correct options, graded by set equality.
    Multiple,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_order_follows_ladder() {
        assert!(Rank::Student < Rank::Intern);
        assert!(Rank::Specialist < Rank::Chief);
        assert_eq!(Rank::Specialist.next(), Some(Rank::Chief));
        assert_eq!(Rank::Chief.next(), None);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn rank_accepts_legacy_labels() {
        let rank: Rank = serde_json::from_str("\"住院医师\"").unwrap();
        assert_eq!(rank, Rank::Resident);
        assert_eq!(serde_json::to_string(&rank).unwrap(), "\"RESIDENT\"");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn effect_kind_uses_snake_case() {
        let kind: EffectKind = serde_json::from_str("\"tip_bonus\"").unwrap();
        assert_eq!(kind, EffectKind::TipBonus);
    }
}
