//! Talent tree nodes and the default tree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EffectKind, TalentBranch};

/// The passive effect granted by an unlocked talent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TalentEffect {
    /// Kind of bonus.
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Magnitude. Percentages for bonus kinds, counts otherwise.
    pub value: i32,
    /// Optional activation condition, e.g. `score>=90`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A node in the prerequisite-gated talent tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TalentNode {
    /// Unique node key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Branch of the tree.
    pub branch: TalentBranch,
    /// Display ordering within the branch.
    pub tier: u32,
    /// Skill point cost.
    pub cost: u32,
    /// Whether the node has been unlocked. One-way.
    pub unlocked: bool,
    /// Id of the node that must be unlocked first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<String>,
    /// Effect once unlocked.
    pub effect: TalentEffect,
}

struct NodeDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    branch: TalentBranch,
    tier: u32,
    cost: u32,
    prerequisite: Option<&'static str>,
    kind: EffectKind,
    value: i32,
    condition: Option<&'static str>,
}

const TREE: &[NodeDef] = &[
    NodeDef {
        id: "clinical_t1_observation",
        name: "敏锐观察",
        description: "检查时自动高亮异常关键词",
        branch: TalentBranch::Clinical,
        tier: 1,
        cost: 1,
        prerequisite: None,
        kind: EffectKind::Hint,
        value: 1,
        condition: None,
    },
    NodeDef {
        id: "clinical_t4_healing",
        name: "妙手回春",
        description: "治疗评分容错 +10%",
        branch: TalentBranch::Clinical,
        tier: 4,
        cost: 3,
        prerequisite: Some("clinical_t1_observation"),
        kind: EffectKind::Tolerance,
        value: 10,
        condition: None,
    },
    NodeDef {
        id: "clinical_t5_specialist",
        name: "专科圣手",
        description: "解锁疑难杂症 (XP ×2)",
        branch: TalentBranch::Clinical,
        tier: 5,
        cost: 5,
        prerequisite: Some("clinical_t4_healing"),
        kind: EffectKind::Unlock,
        value: 2,
        condition: None,
    },
    NodeDef {
        id: "mgmt_t1_affinity",
        name: "亲和力",
        description: "诊断准确率 ≥90% 时获得小费 (+10% 诊费)",
        branch: TalentBranch::Management,
        tier: 1,
        cost: 1,
        prerequisite: None,
        kind: EffectKind::TipBonus,
        value: 10,
        condition: Some("score>=90"),
    },
    NodeDef {
        id: "mgmt_t3_negotiation",
        name: "商业谈判",
        description: "设备价格 -10%",
        branch: TalentBranch::Management,
        tier: 3,
        cost: 3,
        prerequisite: Some("mgmt_t1_affinity"),
        kind: EffectKind::MoneyBonus,
        value: -10,
        condition: None,
    },
    NodeDef {
        id: "mgmt_t4_starDirector",
        name: "明星院长",
        description: "声望获取 +20%",
        branch: TalentBranch::Management,
        tier: 4,
        cost: 3,
        prerequisite: Some("mgmt_t3_negotiation"),
        kind: EffectKind::RepBonus,
        value: 20,
        condition: None,
    },
    NodeDef {
        id: "mgmt_t5_franchise",
        name: "连锁巨头",
        description: "解锁分院系统",
        branch: TalentBranch::Management,
        tier: 5,
        cost: 5,
        prerequisite: Some("mgmt_t4_starDirector"),
        kind: EffectKind::Unlock,
        value: 1,
        condition: None,
    },
    NodeDef {
        id: "academic_t1_scholar",
        name: "学霸",
        description: "XP 获取 +10%",
        branch: TalentBranch::Academic,
        tier: 1,
        cost: 1,
        prerequisite: None,
        kind: EffectKind::XpBonus,
        value: 10,
        condition: None,
    },
    NodeDef {
        id: "academic_t2_research",
        name: "文献检索",
        description: "消耗精力获取疾病类别提示",
        branch: TalentBranch::Academic,
        tier: 2,
        cost: 2,
        prerequisite: Some("academic_t1_scholar"),
        kind: EffectKind::Hint,
        value: 1,
        condition: None,
    },
    NodeDef {
        id: "academic_t3_teaching",
        name: "教学相长",
        description: "助手经验 +50%",
        branch: TalentBranch::Academic,
        tier: 3,
        cost: 3,
        prerequisite: Some("academic_t2_research"),
        kind: EffectKind::XpBonus,
        value: 50,
        condition: None,
    },
];

/// Build the default talent tree with every node locked.
pub fn default_talents() -> Vec<TalentNode> {
    TREE.iter()
        .map(|def| TalentNode {
            id: def.id.to_owned(),
            name: def.name.to_owned(),
            description: def.description.to_owned(),
            branch: def.branch,
            tier: def.tier,
            cost: def.cost,
            unlocked: false,
            prerequisite: def.prerequisite.map(str::to_owned),
            effect: TalentEffect {
                kind: def.kind,
                value: def.value,
                condition: def.condition.map(str::to_owned),
            },
        })
        .collect()
}
