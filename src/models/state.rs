use std::fmt;
use serde::{Deserialize, Serialize};

/// 工作流阶段。`Init` 是 S1 之前的哨兵状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateId {
    #[serde(rename = "INIT")]
    Init,
    #[serde(rename = "S1_SYNOPSIS")]
    Synopsis,
    #[serde(rename = "S2_TREATMENT")]
    Treatment,
    #[serde(rename = "S3_TURNING_POINTS")]
    TurningPoints,
    #[serde(rename = "S4_CHARACTERS")]
    Characters,
    #[serde(rename = "S5_SUBPLOTS")]
    Subplots,
    #[serde(rename = "S6_KEY_SCENES")]
    KeyScenes,
    #[serde(rename = "S7_ALL_SCENES")]
    AllScenes,
    #[serde(rename = "S8_FORMATTED_DRAFT")]
    FormattedDraft,
    #[serde(rename = "S9_REVIEW")]
    Review,
    #[serde(rename = "S10_EXPORTS")]
    Exports,
}

impl StateId {
    /// 十个阶段，按顺序（不含哨兵）
    pub const STAGES: [StateId; 10] = [
        StateId::Synopsis,
        StateId::Treatment,
        StateId::TurningPoints,
        StateId::Characters,
        StateId::Subplots,
        StateId::KeyScenes,
        StateId::AllScenes,
        StateId::FormattedDraft,
        StateId::Review,
        StateId::Exports,
    ];

    /// 阶段序号：Init 为 0，S1..S10 为 1..10
    pub fn index(&self) -> usize {
        match self {
            StateId::Init => 0,
            StateId::Synopsis => 1,
            StateId::Treatment => 2,
            StateId::TurningPoints => 3,
            StateId::Characters => 4,
            StateId::Subplots => 5,
            StateId::KeyScenes => 6,
            StateId::AllScenes => 7,
            StateId::FormattedDraft => 8,
            StateId::Review => 9,
            StateId::Exports => 10,
        }
    }

    pub fn from_index(index: usize) -> Option<StateId> {
        match index {
            0 => Some(StateId::Init),
            i => StateId::STAGES.get(i - 1).copied(),
        }
    }

    pub fn next(&self) -> Option<StateId> {
        StateId::from_index(self.index() + 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateId::Init => "INIT",
            StateId::Synopsis => "S1_SYNOPSIS",
            StateId::Treatment => "S2_TREATMENT",
            StateId::TurningPoints => "S3_TURNING_POINTS",
            StateId::Characters => "S4_CHARACTERS",
            StateId::Subplots => "S5_SUBPLOTS",
            StateId::KeyScenes => "S6_KEY_SCENES",
            StateId::AllScenes => "S7_ALL_SCENES",
            StateId::FormattedDraft => "S8_FORMATTED_DRAFT",
            StateId::Review => "S9_REVIEW",
            StateId::Exports => "S10_EXPORTS",
        }
    }

    /// 解析阶段名，接受完整名称（S3_TURNING_POINTS）或简写（S3）
    pub fn parse(name: &str) -> Option<StateId> {
        let upper = name.trim().to_uppercase();
        if upper == "INIT" {
            return Some(StateId::Init);
        }
        StateId::STAGES.iter().copied().find(|s| {
            let full = s.as_str();
            full == upper || full.split('_').next() == Some(upper.as_str())
        })
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for StateId {
    fn default() -> Self {
        StateId::Synopsis
    }
}
