use serde::{Deserialize, Serialize};
use crate::models::characters::JourneyPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubplotType {
    /// B 线：爱情、盟友、导师
    Relationship,
    AntagonistPov,
    /// 主角的内心冲突
    InternalConflict,
    ProfessionalMission,
    Investigation,
    Family,
    Rivalry,
    RedemptionOrRevenge,
    ThematicDebate,
    ComicRunner,
    Backstory,
    WorldOrInstitution,
    SideQuest,
}

impl SubplotType {
    /// 能对主线产生冲击的副线类型
    pub fn is_impactful(&self) -> bool {
        matches!(
            self,
            SubplotType::Relationship | SubplotType::InternalConflict | SubplotType::AntagonistPov
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubplotBeat {
    /// 副线内的顺序
    pub order: u32,
    pub summary: String,
    /// 状态或关系如何变化
    #[serde(rename = "outChange", default, skip_serializing_if = "Option::is_none")]
    pub out_change: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subplot {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub subplot_type: SubplotType,
    #[serde(default)]
    pub purpose: String,
    #[serde(rename = "dominantActs", default)]
    pub dominant_acts: Vec<JourneyPhase>,
    #[serde(rename = "charactersInvolved", default)]
    pub characters_involved: Vec<u64>,
    /// 关联的转折点顺序号
    #[serde(rename = "linkedTurningPoints", default)]
    pub linked_turning_points: Vec<u32>,
    #[serde(default)]
    pub beats: Vec<SubplotBeat>,
}

impl Subplot {
    pub fn new(title: impl Into<String>, subplot_type: SubplotType) -> Self {
        Subplot {
            id: 0,
            title: title.into(),
            subplot_type,
            purpose: String::new(),
            dominant_acts: Vec::new(),
            characters_involved: Vec::new(),
            linked_turning_points: Vec::new(),
            beats: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_wire_fields() {
        let json = r#"{
            "id": 3,
            "title": "B-Story",
            "type": "RELATIONSHIP",
            "purpose": "Carry the theme of trust",
            "dominantActs": ["ACT_I", "ACT_II"],
            "charactersInvolved": [1, 2],
            "linkedTurningPoints": [1, 3],
            "beats": [{ "order": 1, "summary": "They meet.", "outChange": "Trust begins." }]
        }"#;
        let s: Subplot = serde_json::from_str(json).unwrap();
        assert_eq!(s.subplot_type, SubplotType::Relationship);
        assert_eq!(s.characters_involved, vec![1, 2]);
        assert_eq!(s.beats[0].out_change.as_deref(), Some("Trust begins."));
        assert!(s.subplot_type.is_impactful());
        assert!(!SubplotType::SideQuest.is_impactful());
    }
}
