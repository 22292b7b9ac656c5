use serde::{Deserialize, Serialize};

/// 五个固定的结构节拍
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurningPointType {
    IncitingIncident,
    #[serde(rename = "PLOT_POINT_1")]
    PlotPoint1,
    Midpoint,
    #[serde(rename = "PLOT_POINT_2")]
    PlotPoint2,
    Climax,
}

impl TurningPointType {
    /// 按时间线排列的节拍
    pub const ORDERED: [TurningPointType; 5] = [
        TurningPointType::IncitingIncident,
        TurningPointType::PlotPoint1,
        TurningPointType::Midpoint,
        TurningPointType::PlotPoint2,
        TurningPointType::Climax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TurningPointType::IncitingIncident => "INCITING_INCIDENT",
            TurningPointType::PlotPoint1 => "PLOT_POINT_1",
            TurningPointType::Midpoint => "MIDPOINT",
            TurningPointType::PlotPoint2 => "PLOT_POINT_2",
            TurningPointType::Climax => "CLIMAX",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TurningPointType::IncitingIncident => "Inciting Incident",
            TurningPointType::PlotPoint1 => "Plot Point 1",
            TurningPointType::Midpoint => "Midpoint",
            TurningPointType::PlotPoint2 => "Plot Point 2",
            TurningPointType::Climax => "Climax",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurningPoint {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub tp_type: TurningPointType,
    #[serde(default)]
    pub summary: String,
    /// 时间线顺序 1..5
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_scene_id: Option<u64>,
}

impl TurningPoint {
    pub fn new(tp_type: TurningPointType, order: u32, summary: impl Into<String>) -> Self {
        TurningPoint {
            id: 0,
            tp_type,
            summary: summary.into(),
            order,
            candidate_scene_id: None,
        }
    }
}
