//! Milestone tracking and skill point awards.
//!
//! Every correct case counts toward the cure milestones; a correct case
//! with a perfect score also counts toward the perfect milestones. Each
//! threshold awards skill points exactly once, tracked in the
//! `*_milestones` lists of [`MilestoneProgress`].

use serde::Serialize;
use vetlogic_types::MilestoneProgress;

use crate::config::MilestoneRules;

/// Result of recording one case outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneUpdate {
    /// Updated counters.
    pub progress: MilestoneProgress,
    /// Skill points earned by thresholds newly crossed.
    pub skill_points: u32,
    /// Thresholds newly crossed, cure thresholds first.
    pub reached: Vec<u32>,
}

fn award(count: u32, thresholds: &[u32], awarded: &mut Vec<u32>, reached: &mut Vec<u32>) {
    for threshold in thresholds {
        if count >= *threshold && !awarded.contains(threshold) {
            awarded.push(*threshold);
            reached.push(*threshold);
        }
    }
}

/// Record a completed case and award any newly crossed milestones.
pub fn record_case(
    progress: &MilestoneProgress,
    rules: &MilestoneRules,
    is_correct: bool,
    score: u32,
) -> MilestoneUpdate {
    let mut next = progress.clone();
    let mut reached = Vec::new();

    if is_correct {
        next.total_cured = next.total_cured.saturating_add(1);
        award(
            next.total_cured,
            &rules.cure_thresholds,
            &mut next.cured_milestones,
            &mut reached,
        );
        if score >= rules.perfect_score {
            next.perfect_scores = next.perfect_scores.saturating_add(1);
            award(
                next.perfect_scores,
                &rules.perfect_thresholds,
                &mut next.perfect_milestones,
                &mut reached,
            );
        }
    }

    let count = u32::try_from(reached.len()).unwrap_or(u32::MAX);
    let skill_points = count.saturating_mul(rules.skill_points_per_milestone);
    if skill_points > 0 {
        tracing::info!(?reached, skill_points, "milestones reached");
    }

    MilestoneUpdate {
        progress: next,
        skill_points,
        reached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenth_cure_awards_once() {
        let rules = MilestoneRules::default();
        let progress = MilestoneProgress {
            total_cured: 9,
            ..MilestoneProgress::default()
        };
        let first = record_case(&progress, &rules, true, 70);
        assert_eq!(first.progress.total_cured, 10);
        assert_eq!(first.skill_points, 2);
        assert_eq!(first.reached, vec![10]);

        let second = record_case(&first.progress, &rules, true, 70);
        assert_eq!(second.skill_points, 0);
        assert_eq!(second.progress.cured_milestones, vec![10]);
    }

    #[test]
    fn failure_counts_nothing() {
        let rules = MilestoneRules::default();
        let update = record_case(&MilestoneProgress::default(), &rules, false, 100);
        assert_eq!(update.progress, MilestoneProgress::default());
        assert_eq!(update.skill_points, 0);
    }

    #[test]
    fn perfect_scores_tracked_separately() {
        let rules = MilestoneRules::default();
        let progress = MilestoneProgress {
            total_cured: 24,
            perfect_scores: 4,
            cured_milestones: vec![10],
            perfect_milestones: Vec::new(),
        };
        let update = record_case(&progress, &rules, true, 100);
        assert_eq!(update.reached, vec![25, 5]);
        assert_eq!(update.skill_points, 4);
        assert_eq!(update.progress.perfect_milestones, vec![5]);
    }

    #[test]
    fn missed_thresholds_are_caught_up() {
        // A save migrated with counters but no award list.
        let rules = MilestoneRules::default();
        let progress = MilestoneProgress {
            total_cured: 30,
            ..MilestoneProgress::default()
        };
        let update = record_case(&progress, &rules, true, 50);
        assert_eq!(update.reached, vec![10, 25]);
    }
}
