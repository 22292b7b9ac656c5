use serde::{Deserialize, Serialize};

/// 结构角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructuralRole {
    Protagonist,
    Deuteragonist,
    Tritagonist,
    Antagonist,
    AntagonistLieutenant,
    Supporting,
    Cameo,
}

impl StructuralRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructuralRole::Protagonist => "PROTAGONIST",
            StructuralRole::Deuteragonist => "DEUTERAGONIST",
            StructuralRole::Tritagonist => "TRITAGONIST",
            StructuralRole::Antagonist => "ANTAGONIST",
            StructuralRole::AntagonistLieutenant => "ANTAGONIST_LIEUTENANT",
            StructuralRole::Supporting => "SUPPORTING",
            StructuralRole::Cameo => "CAMEO",
        }
    }
}

/// 原型（戏剧功能，可随阶段变化）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Archetype {
    Hero,
    Mentor,
    Herald,
    ThresholdGuardian,
    Ally,
    Trickster,
    Shapeshifter,
    Shadow,
    Seer,
    Tempter,
    Confidant,
    Reason,
    Emotion,
    ImpactCharacter,
}

/// 旅程阶段，按幕划分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JourneyPhase {
    #[serde(rename = "ACT_I")]
    ActI,
    #[serde(rename = "ACT_II")]
    ActII,
    #[serde(rename = "ACT_III")]
    ActIII,
}

impl JourneyPhase {
    pub const ALL: [JourneyPhase; 3] = [JourneyPhase::ActI, JourneyPhase::ActII, JourneyPhase::ActIII];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeBeat {
    pub phase: JourneyPhase,
    pub archetype: Archetype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub structural_role: StructuralRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flaw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub archetype_timeline: Vec<ArchetypeBeat>,
}

impl Character {
    pub fn new(name: impl Into<String>, structural_role: StructuralRole) -> Self {
        Character {
            id: 0,
            name: name.into(),
            structural_role,
            goal: None,
            need: None,
            flaw: None,
            arc_summary: None,
            bio: None,
            tags: Vec::new(),
            archetype_timeline: Vec::new(),
        }
    }

    /// 按阶段顺序生成原型时间线
    pub fn with_timeline(mut self, archetypes: &[Archetype]) -> Self {
        self.archetype_timeline = JourneyPhase::ALL
            .iter()
            .zip(archetypes.iter())
            .map(|(phase, archetype)| ArchetypeBeat {
                phase: *phase,
                archetype: *archetype,
                notes: None,
            })
            .collect();
        self
    }
}

/// 有向关系类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    AllyOf,
    RivalOf,
    NemesisOf,
    MentorOf,
    MenteeOf,
    ProtectorOf,
    WardOf,
    BossOf,
    ReportOf,
    CommanderOf,
    SubordinateOf,
    TeammateOf,
    CoConspiratorOf,
    RomanticPartnerOf,
    ExPartnerOf,
    CrushOn,
    SpouseOf,
    ParentOf,
    ChildOf,
    SiblingOf,
    InformantOf,
    SaboteurOf,
    FoilTo,
}

/// 角色之间的有向边，strength/trust/secrecy 取值 0..1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub id: u64,
    /// 起点
    pub a_id: u64,
    /// 终点
    pub b_id: u64,
    pub kind: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrecy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Relationship {
    pub fn new(a_id: u64, b_id: u64, kind: RelationKind) -> Self {
        Relationship {
            id: 0,
            a_id,
            b_id,
            kind,
            strength: None,
            trust: None,
            secrecy: None,
            notes: None,
        }
    }

    /// 把数值属性限制在 [0, 1]
    pub fn clamped(mut self) -> Self {
        let clamp = |v: Option<f64>| v.map(|x| if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) });
        self.strength = clamp(self.strength);
        self.trust = clamp(self.trust);
        self.secrecy = clamp(self.secrecy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_attributes_are_clamped() {
        let mut r = Relationship::new(1, 2, RelationKind::MentorOf);
        r.strength = Some(1.7);
        r.trust = Some(-0.2);
        r.secrecy = Some(0.5);
        let r = r.clamped();
        assert_eq!(r.strength, Some(1.0));
        assert_eq!(r.trust, Some(0.0));
        assert_eq!(r.secrecy, Some(0.5));
    }

    #[test]
    fn enum_wire_names() {
        let json = serde_json::to_string(&StructuralRole::AntagonistLieutenant).unwrap();
        assert_eq!(json, "\"ANTAGONIST_LIEUTENANT\"");
        let json = serde_json::to_string(&JourneyPhase::ActIII).unwrap();
        assert_eq!(json, "\"ACT_III\"");
        let kind: RelationKind = serde_json::from_str("\"CO_CONSPIRATOR_OF\"").unwrap();
        assert_eq!(kind, RelationKind::CoConspiratorOf);
    }
}
