// ==========================================
// MUD 世界数据导入器 - 记录类型目录
// ==========================================
// 职责: 按阶段分组的有序记录类型列表
// 约束: 批量导入严格按阶段顺序、阶段内按声明顺序执行
// ==========================================

use crate::domain::DataPhase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPhase {
    pub phase: DataPhase,
    #[serde(default)]
    pub kinds: Vec<String>,
}

// ==========================================
// KindCatalog
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCatalog {
    #[serde(default)]
    pub phases: Vec<CatalogPhase>,
}

impl KindCatalog {
    pub fn empty() -> Self {
        Self { phases: Vec::new() }
    }

    /// 追加记录类型到指定阶段
    pub fn with_kind(mut self, phase: DataPhase, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        match self.phases.iter_mut().find(|p| p.phase == phase) {
            Some(entry) => entry.kinds.push(kind),
            None => self.phases.push(CatalogPhase {
                phase,
                kinds: vec![kind],
            }),
        }
        self
    }

    /// 指定阶段的记录类型
    pub fn kinds_in(&self, phase: DataPhase) -> Vec<&str> {
        self.phases
            .iter()
            .filter(|p| p.phase == phase)
            .flat_map(|p| p.kinds.iter().map(String::as_str))
            .collect()
    }

    /// 全部记录类型（阶段顺序 → 声明顺序）
    ///
    /// 配置文件中阶段的书写顺序不影响结果
    pub fn ordered_kinds(&self) -> Vec<&str> {
        DataPhase::ALL
            .iter()
            .flat_map(|phase| self.kinds_in(*phase))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.phases.iter().map(|p| p.kinds.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn phase(phase: DataPhase, kinds: &[&str]) -> CatalogPhase {
    CatalogPhase {
        phase,
        kinds: kinds.iter().map(|k| k.to_string()).collect(),
    }
}

impl Default for KindCatalog {
    /// 内置世界数据目录
    fn default() -> Self {
        Self {
            phases: vec![
                phase(
                    DataPhase::BasicData,
                    &[
                        "game_settings",
                        "client_settings",
                        "class_categories",
                        "typeclasses",
                        "equipment_types",
                        "equipment_positions",
                        "character_careers",
                        "quest_objective_types",
                        "event_types",
                        "event_trigger_types",
                        "quest_dependency_types",
                        "image_resources",
                        "icon_resources",
                    ],
                ),
                phase(
                    DataPhase::ObjectsData,
                    &[
                        "world_rooms",
                        "world_exits",
                        "world_objects",
                        "world_npcs",
                        "object_creators",
                        "common_objects",
                        "equipments",
                        "character_models",
                        "common_characters",
                        "skills",
                        "quests",
                    ],
                ),
                phase(
                    DataPhase::ObjectsAdditionalData,
                    &[
                        "exit_locks",
                        "creator_loot_list",
                        "character_loot_list",
                        "quest_reward_list",
                        "default_objects",
                        "default_skills",
                        "npc_dialogues",
                        "quest_objectives",
                        "quest_dependencies",
                        "career_equipments",
                    ],
                ),
                phase(
                    DataPhase::OtherData,
                    &[
                        "dialogues",
                        "dialogue_relations",
                        "dialogue_sentences",
                        "dialogue_quest_dependencies",
                        "system_localized_strings",
                        "custom_localized_strings",
                        "event_data",
                    ],
                ),
                phase(
                    DataPhase::EventAdditionalData,
                    &["event_attacks", "event_dialogues"],
                ),
            ],
        }
    }
}
