use serde::{Deserialize, Serialize};

/// 解析后的剧本段落（解析器的输出单元）
///
/// 每个变体只携带与之相关的字段。`DualDialogue` 的左右两侧只允许
/// 角色名、括号提示和对白，由 [`DialoguePart`] 在类型层面保证。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Paragraph {
    #[serde(rename = "Scene Heading")]
    SceneHeading {
        text: String,
        /// 原文中手写的 `#n#` 编号；导出时的 `[#n]` 编号与它无关
        #[serde(rename = "sceneNumber", default, skip_serializing_if = "Option::is_none")]
        scene_number: Option<String>,
    },
    Action { text: String },
    Character { character: String },
    Parenthetical { text: String },
    Dialogue { dialogue: String },
    Transition { text: String },
    DualDialogue {
        left: Vec<DialoguePart>,
        right: Vec<DialoguePart>,
    },
}

/// 双对白一侧的组成部分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DialoguePart {
    Character { character: String },
    Parenthetical { text: String },
    Dialogue { dialogue: String },
}

/// 段落类型（不带数据），用于按类型分派和穷尽性检查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParagraphKind {
    SceneHeading,
    Action,
    Character,
    Parenthetical,
    Dialogue,
    Transition,
    DualDialogue,
}

impl ParagraphKind {
    pub const ALL: [ParagraphKind; 7] = [
        ParagraphKind::SceneHeading,
        ParagraphKind::Action,
        ParagraphKind::Character,
        ParagraphKind::Parenthetical,
        ParagraphKind::Dialogue,
        ParagraphKind::Transition,
        ParagraphKind::DualDialogue,
    ];

    /// FDX 中使用的段落类型名
    pub fn as_str(&self) -> &'static str {
        match self {
            ParagraphKind::SceneHeading => "Scene Heading",
            ParagraphKind::Action => "Action",
            ParagraphKind::Character => "Character",
            ParagraphKind::Parenthetical => "Parenthetical",
            ParagraphKind::Dialogue => "Dialogue",
            ParagraphKind::Transition => "Transition",
            ParagraphKind::DualDialogue => "DualDialogue",
        }
    }
}

impl Paragraph {
    pub fn scene_heading(text: impl Into<String>) -> Self {
        Paragraph::SceneHeading {
            text: text.into(),
            scene_number: None,
        }
    }

    pub fn kind(&self) -> ParagraphKind {
        match self {
            Paragraph::SceneHeading { .. } => ParagraphKind::SceneHeading,
            Paragraph::Action { .. } => ParagraphKind::Action,
            Paragraph::Character { .. } => ParagraphKind::Character,
            Paragraph::Parenthetical { .. } => ParagraphKind::Parenthetical,
            Paragraph::Dialogue { .. } => ParagraphKind::Dialogue,
            Paragraph::Transition { .. } => ParagraphKind::Transition,
            Paragraph::DualDialogue { .. } => ParagraphKind::DualDialogue,
        }
    }

    pub fn is_type(&self, kinds: &[ParagraphKind]) -> bool {
        kinds.contains(&self.kind())
    }

    /// 段落的主要文本（双对白没有单独的文本）
    pub fn text(&self) -> Option<&str> {
        match self {
            Paragraph::SceneHeading { text, .. }
            | Paragraph::Action { text }
            | Paragraph::Parenthetical { text }
            | Paragraph::Transition { text } => Some(text),
            Paragraph::Character { character } => Some(character),
            Paragraph::Dialogue { dialogue } => Some(dialogue),
            Paragraph::DualDialogue { .. } => None,
        }
    }
}

impl DialoguePart {
    pub fn kind(&self) -> ParagraphKind {
        match self {
            DialoguePart::Character { .. } => ParagraphKind::Character,
            DialoguePart::Parenthetical { .. } => ParagraphKind::Parenthetical,
            DialoguePart::Dialogue { .. } => ParagraphKind::Dialogue,
        }
    }
}

impl From<DialoguePart> for Paragraph {
    fn from(part: DialoguePart) -> Self {
        match part {
            DialoguePart::Character { character } => Paragraph::Character { character },
            DialoguePart::Parenthetical { text } => Paragraph::Parenthetical { text },
            DialoguePart::Dialogue { dialogue } => Paragraph::Dialogue { dialogue },
        }
    }
}
