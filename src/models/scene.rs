use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneStatus {
    Planned,
    Outlined,
    Drafted,
    Approved,
}

/// 场景标题的内外景标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "EXT")]
    Ext,
    #[serde(rename = "INT/EXT")]
    IntExt,
}

impl Heading {
    pub fn as_str(&self) -> &'static str {
        match self {
            Heading::Int => "INT",
            Heading::Ext => "EXT",
            Heading::IntExt => "INT/EXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayPart {
    Day,
    Night,
    Dawn,
    Dusk,
}

impl DayPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayPart::Day => "DAY",
            DayPart::Night => "NIGHT",
            DayPart::Dawn => "DAWN",
            DayPart::Dusk => "DUSK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub id: u64,
    /// 叙事位置，从 1 开始且连续
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub title: String,
    /// 是否关键场景
    #[serde(default)]
    pub is_key: bool,
    /// 关联的转折点顺序号（1..5）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_turning_point: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<Heading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<DayPart>,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// 出场角色 id
    #[serde(default)]
    pub characters: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SceneStatus>,
    /// 本场的 Fountain 源文本
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_text: Option<String>,
}

impl Scene {
    pub fn new(heading: Heading, location: impl Into<String>, time_of_day: DayPart, synopsis: impl Into<String>) -> Self {
        Scene {
            id: 0,
            order: 0,
            title: String::new(),
            is_key: false,
            linked_turning_point: None,
            heading: Some(heading),
            location: Some(location.into()),
            time_of_day: Some(time_of_day),
            synopsis: synopsis.into(),
            goal: None,
            conflict: None,
            outcome: None,
            characters: Vec::new(),
            status: None,
            formatted_text: None,
        }
    }

    pub fn key_for(mut self, turning_point: u32) -> Self {
        self.is_key = true;
        self.linked_turning_point = Some(turning_point);
        self
    }

    pub fn heading_str(&self) -> Option<&'static str> {
        self.heading.as_ref().map(Heading::as_str)
    }

    pub fn time_of_day_str(&self) -> Option<&'static str> {
        self.time_of_day.as_ref().map(DayPart::as_str)
    }

    /// 非空的 Fountain 文本
    pub fn authored_text(&self) -> Option<&str> {
        self.formatted_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// 按 order 升序排列的场景副本
pub fn sorted_by_order(scenes: &[Scene]) -> Vec<Scene> {
    let mut sorted = scenes.to_vec();
    sorted.sort_by_key(|s| s.order);
    sorted
}
