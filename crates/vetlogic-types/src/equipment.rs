//! Clinic equipment and the default catalog.
//!
//! Each item reveals a set of clinical case fields (its `unlocks_params`)
//! once owned. `basic_kit` is the only item owned from the start.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of the equipment every new clinic owns.
pub const BASIC_KIT_ID: &str = "basic_kit";

/// A purchasable piece of clinic equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Equipment {
    /// Unique catalog key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Purchase price.
    pub cost: i64,
    /// Income multiplier shown to the player.
    pub income_multiplier: f64,
    /// Whether the clinic owns this item. Only ever flips from false to true.
    pub owned: bool,
    /// Display icon.
    pub icon: String,
    /// Case data keys revealed by this item.
    pub unlocks_params: Vec<String>,
}

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    cost: i64,
    income_multiplier: f64,
    icon: &'static str,
    unlocks: &'static [&'static str],
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: BASIC_KIT_ID,
        name: "基础诊疗包",
        description: "含听诊器、体温计。解锁TPR数据。",
        cost: 0,
        income_multiplier: 1.0,
        icon: "🩺",
        unlocks: &["tpr"],
    },
    CatalogEntry {
        id: "woods_lamp",
        name: "伍德氏灯",
        description: "检测猫癣（犬小孢子菌）等真菌感染。",
        cost: 500,
        income_multiplier: 1.05,
        icon: "🔦",
        unlocks: &["woodsLamp"],
    },
    CatalogEntry {
        id: "ophthalmoscope",
        name: "检眼镜套装",
        description: "专业的眼科检查设备，用于观察眼底病变。",
        cost: 800,
        income_multiplier: 1.1,
        icon: "👁️",
        unlocks: &["eye_exam"],
    },
    CatalogEntry {
        id: "microscope",
        name: "高倍显微镜",
        description: "用于皮肤刮片、耳道分泌物及细胞学检查。",
        cost: 1200,
        income_multiplier: 1.15,
        icon: "🔬",
        unlocks: &["microscope"],
    },
    CatalogEntry {
        id: "bp_monitor",
        name: "多普勒血压计",
        description: "测量收缩压，评估休克或高血压风险。",
        cost: 1500,
        income_multiplier: 1.15,
        icon: "💓",
        unlocks: &["bp"],
    },
    CatalogEntry {
        id: "hematology",
        name: "全自动血球仪",
        description: "检测白细胞、红细胞、血小板。判断感染/贫血。",
        cost: 2500,
        income_multiplier: 1.25,
        icon: "🩸",
        unlocks: &["cbc"],
    },
    CatalogEntry {
        id: "biochem",
        name: "生化分析仪",
        description: "检测肝肾功能、血糖、蛋白离子。",
        cost: 3800,
        income_multiplier: 1.35,
        icon: "🧪",
        unlocks: &["chem"],
    },
    CatalogEntry {
        id: "dental_unit",
        name: "牙科工作站",
        description: "超声洁牙与抛光，治疗牙周疾病。",
        cost: 5500,
        income_multiplier: 1.4,
        icon: "🦷",
        unlocks: &["dental"],
    },
    CatalogEntry {
        id: "blood_gas",
        name: "血气分析仪",
        description: "检测 pH、电解质、血氧，用于急救与麻醉监护。",
        cost: 6000,
        income_multiplier: 1.45,
        icon: "📊",
        unlocks: &["bloodGas"],
    },
    CatalogEntry {
        id: "xray_digital",
        name: "DR 数字X光机",
        description: "高清晰度骨骼与胸腹影像。",
        cost: 8500,
        income_multiplier: 1.5,
        icon: "🦴",
        unlocks: &["xray"],
    },
    CatalogEntry {
        id: "usg_doppler",
        name: "多普勒彩超",
        description: "腹腔器官结构与血流评估。",
        cost: 15000,
        income_multiplier: 1.8,
        icon: "🖥️",
        unlocks: &["usg"],
    },
    CatalogEntry {
        id: "endoscope",
        name: "电子内窥镜",
        description: "用于食道、胃肠异物取出及微创检查。",
        cost: 22000,
        income_multiplier: 2.0,
        icon: "🔦",
        unlocks: &["endo"],
    },
    CatalogEntry {
        id: "ct_scan",
        name: "兽用 CT",
        description: "顶级影像设备，用于神经学与复杂骨科诊断。",
        cost: 150_000,
        income_multiplier: 3.0,
        icon: "☢️",
        unlocks: &["ct"],
    },
];

/// Build the default equipment catalog, in display order.
///
/// Only [`BASIC_KIT_ID`] is owned.
pub fn default_catalog() -> Vec<Equipment> {
    CATALOG
        .iter()
        .map(|entry| Equipment {
            id: entry.id.to_owned(),
            name: entry.name.to_owned(),
            description: entry.description.to_owned(),
            cost: entry.cost,
            income_multiplier: entry.income_multiplier,
            owned: entry.id == BASIC_KIT_ID,
            icon: entry.icon.to_owned(),
            unlocks_params: entry.unlocks.iter().map(|p| (*p).to_owned()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn only_basic_kit_owned() {
        let catalog = default_catalog();
        let owned: Vec<&str> = catalog
            .iter()
            .filter(|e| e.owned)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(owned, vec![BASIC_KIT_ID]);
    }

    #[test]
    fn ids_are_unique() {
        let catalog = default_catalog();
        let ids: BTreeSet<&str> = catalog.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert_eq!(catalog.len(), 13);
    }

    #[test]
    fn serializes_camel_case() {
        let catalog = default_catalog();
        let json = serde_json::to_value(catalog.first()).ok();
        let has_key = json
            .as_ref()
            .and_then(|v| v.get("unlocksParams"))
            .is_some();
        assert!(has_key);
    }
}
