// ==========================================
// MUD 世界数据导入器 - 领域类型定义
// ==========================================
// 职责: 数据层级 (系统/自定义) 与导入阶段
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 数据层级 (Data Tier)
// ==========================================
// 同一记录类型内共享 key 空间的两类数据来源
// 落库字段: system_data (1 = 系统, 0 = 自定义)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataTier {
    System, // 系统内置数据
    #[default]
    Custom, // 用户/策划自定义数据
}

impl DataTier {
    pub fn is_system(self) -> bool {
        matches!(self, DataTier::System)
    }

    /// 由 system_data 标志构造
    pub fn from_system_flag(system_data: bool) -> Self {
        if system_data {
            DataTier::System
        } else {
            DataTier::Custom
        }
    }
}

impl fmt::Display for DataTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTier::System => write!(f, "SYSTEM"),
            DataTier::Custom => write!(f, "CUSTOM"),
        }
    }
}

// ==========================================
// 导入阶段 (Data Phase)
// ==========================================
// 批量导入按阶段顺序执行: 后续阶段可能引用前面阶段写入的记录
// 派生 Ord: 声明顺序即导入顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataPhase {
    BasicData,             // 基础数据
    ObjectsData,           // 主体对象
    ObjectsAdditionalData, // 对象附加数据
    OtherData,             // 其他数据
    EventAdditionalData,   // 事件附加数据
}

impl DataPhase {
    pub const ALL: [DataPhase; 5] = [
        DataPhase::BasicData,
        DataPhase::ObjectsData,
        DataPhase::ObjectsAdditionalData,
        DataPhase::OtherData,
        DataPhase::EventAdditionalData,
    ];
}

impl fmt::Display for DataPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataPhase::BasicData => write!(f, "basic_data"),
            DataPhase::ObjectsData => write!(f, "objects_data"),
            DataPhase::ObjectsAdditionalData => write!(f, "objects_additional_data"),
            DataPhase::OtherData => write!(f, "other_data"),
            DataPhase::EventAdditionalData => write!(f, "event_additional_data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_flag() {
        assert_eq!(DataTier::from_system_flag(true), DataTier::System);
        assert_eq!(DataTier::from_system_flag(false), DataTier::Custom);
        assert_eq!(DataTier::default(), DataTier::Custom);
    }

    #[test]
    fn test_phase_order_matches_declaration() {
        let mut phases = DataPhase::ALL.to_vec();
        phases.reverse();
        phases.sort();
        assert_eq!(phases, DataPhase::ALL.to_vec());
    }

    #[test]
    fn test_phase_serde_name() {
        let json = serde_json::to_string(&DataPhase::ObjectsAdditionalData).unwrap();
        assert_eq!(json, "\"objects_additional_data\"");
    }
}
