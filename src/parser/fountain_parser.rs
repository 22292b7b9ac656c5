use serde::Serialize;
use crate::models::{DialoguePart, Paragraph};
use crate::parser::text_processor::{normalize, split_blocks};
use crate::utils::fountain_constants::BLOCK_REGEX;
use crate::utils::FountainConstants;

/// 一个对白块：角色名、括号提示、对白正文，三者都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogueBlock {
    pub character: Option<String>,
    pub parenthetical: Option<String>,
    pub dialogue: Option<String>,
}

impl DialogueBlock {
    /// 按 角色名 → 括号提示 → 对白 的固定顺序展开，空字段跳过
    pub fn parts(&self) -> Vec<DialoguePart> {
        let mut parts = Vec::with_capacity(3);
        if let Some(c) = self.character.as_deref().filter(|c| !c.trim().is_empty()) {
            parts.push(DialoguePart::Character { character: c.to_uppercase() });
        }
        if let Some(p) = self.parenthetical.as_deref().filter(|p| !p.trim().is_empty()) {
            parts.push(DialoguePart::Parenthetical { text: p.to_string() });
        }
        if let Some(d) = self.dialogue.as_deref().filter(|d| !d.trim().is_empty()) {
            parts.push(DialoguePart::Dialogue { dialogue: d.to_string() });
        }
        parts
    }
}

/// 词法阶段识别出的 Fountain 元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FountainElement {
    TitleEntry { key: String, value: String },
    SceneHeading { text: String, scene_number: Option<String> },
    Action { text: String },
    Transition { text: String },
    Dialogue(DialogueBlock),
    DualDialogue { left: DialogueBlock, right: DialogueBlock },
    Character { text: String },
    Parenthetical { text: String },
    Lyrics { text: String },
    Centered { text: String },
    Synopsis { text: String },
    Section { depth: usize, text: String },
    Note { text: String },
    PageBreak,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseOutput {
    /// 标题页键值（键为小写）
    pub title_page: Vec<(String, String)>,
    pub elements: Vec<FountainElement>,
    pub paragraphs: Vec<Paragraph>,
}

impl ParseOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_value(&self, key: &str) -> Option<&str> {
        self.title_page
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

pub struct FountainParser {
    elements: Vec<FountainElement>,
    title_page: Vec<(String, String)>,
}

impl Default for FountainParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FountainParser {
    pub fn new() -> Self {
        FountainParser {
            elements: Vec::new(),
            title_page: Vec::new(),
        }
    }

    /// 解析Fountain格式文本
    ///
    /// 解析不会失败：无法识别的内容降级为动作段落，空内容被丢弃。
    pub fn parse(&mut self, script: &str) -> ParseOutput {
        self.elements.clear();
        self.title_page.clear();

        let text = normalize(script);
        let blocks = split_blocks(&text);
        for (i, block) in blocks.iter().enumerate() {
            // 标题页只可能出现在第一个块
            if i == 0 && self.process_title_page(block) {
                continue;
            }
            self.process_block(block);
        }

        let elements = std::mem::take(&mut self.elements);
        let paragraphs = to_paragraphs(&elements);
        log::debug!(
            "解析完成: {} 个块, {} 个元素, {} 个段落",
            blocks.len(),
            elements.len(),
            paragraphs.len()
        );

        ParseOutput {
            title_page: std::mem::take(&mut self.title_page),
            elements,
            paragraphs,
        }
    }

    fn push(&mut self, element: FountainElement) {
        self.elements.push(element);
    }

    // 处理标题页块
    fn process_title_page(&mut self, lines: &[&str]) -> bool {
        if !BLOCK_REGEX["title_page"].is_match(lines[0]) {
            return false;
        }
        let mut entries: Vec<(String, String)> = Vec::new();
        for line in lines {
            if let Some(caps) = BLOCK_REGEX["title_page"].captures(line) {
                let key = caps[1].to_lowercase();
                let value = caps[2].trim().to_string();
                entries.push((key, value));
                continue;
            }
            // 缩进的续行或未知行都并入上一项
            let extra = BLOCK_REGEX["title_continuation"]
                .captures(line)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_else(|| line.trim().to_string());
            if let Some((_, value)) = entries.last_mut() {
                if value.is_empty() {
                    *value = extra;
                } else {
                    value.push('\n');
                    value.push_str(&extra);
                }
            }
        }
        for (key, value) in &entries {
            self.push(FountainElement::TitleEntry {
                key: key.clone(),
                value: value.clone(),
            });
        }
        self.title_page.extend(entries);
        true
    }

    fn process_block(&mut self, mut lines: &[&str]) {
        // 场景标题、章节、概要、分页符只占一行，余下的行按新块处理
        while let Some(element) = lines.first().and_then(|l| self.match_leading_line(l)) {
            self.push(element);
            lines = &lines[1..];
        }
        let Some(first) = lines.first() else {
            return;
        };

        if lines.len() == 1 {
            if let Some(element) = self.match_single_line(first) {
                self.push(element);
                return;
            }
        }

        if lines.iter().all(|l| BLOCK_REGEX["lyric"].is_match(l)) {
            let text = lines
                .iter()
                .filter_map(|l| BLOCK_REGEX["lyric"].captures(l).map(|c| c[1].to_string()))
                .collect::<Vec<_>>()
                .join("\n");
            self.push(FountainElement::Lyrics { text });
            return;
        }

        let joined = lines.join("\n");
        if let Some(caps) = BLOCK_REGEX["note"].captures(&joined) {
            self.push(FountainElement::Note { text: caps[1].trim().to_string() });
            return;
        }

        if self.process_dialogue(lines) {
            return;
        }

        // 其余都是动作，去掉强制动作的 ! 前缀
        let text = lines
            .iter()
            .map(|l| match BLOCK_REGEX["action_force"].captures(l) {
                Some(caps) => format!("{}{}", &caps[1], &caps[2]),
                None => l.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.push(FountainElement::Action { text });
    }

    fn match_leading_line(&self, line: &str) -> Option<FountainElement> {
        if let Some(text) = scene_heading_text(line) {
            let (text, scene_number) = split_scene_number(&text);
            return Some(FountainElement::SceneHeading { text, scene_number });
        }
        if BLOCK_REGEX["page_break"].is_match(line) {
            return Some(FountainElement::PageBreak);
        }
        if let Some(caps) = BLOCK_REGEX["section"].captures(line) {
            return Some(FountainElement::Section {
                depth: caps[1].len(),
                text: caps[2].trim().to_string(),
            });
        }
        if let Some(caps) = BLOCK_REGEX["synopsis"].captures(line) {
            return Some(FountainElement::Synopsis { text: caps[1].trim().to_string() });
        }
        None
    }

    fn match_single_line(&self, line: &str) -> Option<FountainElement> {
        let trimmed = line.trim();
        if let Some(caps) = BLOCK_REGEX["centered"].captures(line) {
            return Some(FountainElement::Centered { text: caps[1].to_string() });
        }
        if FountainConstants::fixed_transitions().contains(&trimmed)
            || BLOCK_REGEX["transition_to"].is_match(line)
        {
            return Some(FountainElement::Transition { text: trimmed.to_string() });
        }
        if let Some(caps) = BLOCK_REGEX["transition_forced"].captures(line) {
            return Some(FountainElement::Transition { text: caps[1].trim().to_string() });
        }
        if BLOCK_REGEX["parenthetical"].is_match(line) {
            return Some(FountainElement::Parenthetical { text: trimmed.to_string() });
        }
        if let Some(name) = trimmed.strip_prefix('@') {
            return Some(FountainElement::Character { text: name.trim().to_string() });
        }
        None
    }

    // 处理对白块：首行为角色名，且至少还有一行
    fn process_dialogue(&mut self, lines: &[&str]) -> bool {
        if lines.len() < 2 || lines[1].trim_start().starts_with('!') {
            return false;
        }
        let Some(caps) = BLOCK_REGEX["character"].captures(lines[0]) else {
            return false;
        };
        let name = caps[1].trim().trim_start_matches('@').trim().to_string();
        let is_dual = caps.get(2).is_some();
        let blocks = dialogue_blocks(name, &lines[1..]);

        if is_dual {
            if let Some(left) = self.pop_previous_dialogue() {
                let right = merge_blocks(blocks);
                self.push(FountainElement::DualDialogue { left, right });
                return true;
            }
        }
        for block in blocks {
            self.push(FountainElement::Dialogue(block));
        }
        true
    }

    /// 取出紧邻的上一段对白（含其续段）作为双对白左侧
    fn pop_previous_dialogue(&mut self) -> Option<DialogueBlock> {
        let mut popped = Vec::new();
        while let Some(FountainElement::Dialogue(block)) = self.elements.last() {
            let has_speaker = block.character.is_some();
            if let Some(FountainElement::Dialogue(block)) = self.elements.pop() {
                popped.push(block);
            }
            if has_speaker {
                break;
            }
        }
        if popped.is_empty() {
            return None;
        }
        popped.reverse();
        Some(merge_blocks(popped))
    }
}

fn scene_heading_text(line: &str) -> Option<String> {
    let trimmed = line.trim();
    // 强制场景标题：以单个 . 开头
    if let Some(rest) = trimmed.strip_prefix('.') {
        if !rest.is_empty() && !rest.starts_with('.') {
            return Some(rest.trim().to_string());
        }
        return None;
    }
    BLOCK_REGEX["scene_heading"]
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
}

fn split_scene_number(text: &str) -> (String, Option<String>) {
    match BLOCK_REGEX["scene_number"].captures(text) {
        Some(caps) => {
            let number = caps[1].to_string();
            let start = caps.get(0).map(|m| m.start()).unwrap_or(text.len());
            (text[..start].trim().to_string(), Some(number))
        }
        None => (text.to_string(), None),
    }
}

fn dialogue_blocks(character: String, body: &[&str]) -> Vec<DialogueBlock> {
    let mut blocks = Vec::new();
    let mut current = DialogueBlock {
        character: Some(character),
        ..Default::default()
    };
    let mut lines: Vec<&str> = Vec::new();

    for line in body {
        let text = line.trim();
        if BLOCK_REGEX["parenthetical"].is_match(text) {
            if lines.is_empty() && current.parenthetical.is_none() {
                current.parenthetical = Some(text.to_string());
                continue;
            }
            // 对白中间的括号提示开启一个无角色名的续段
            if !lines.is_empty() {
                current.dialogue = Some(lines.join("\n"));
                lines.clear();
            }
            blocks.push(std::mem::replace(
                &mut current,
                DialogueBlock {
                    parenthetical: Some(text.to_string()),
                    ..Default::default()
                },
            ));
        } else {
            lines.push(text);
        }
    }
    if !lines.is_empty() {
        current.dialogue = Some(lines.join("\n"));
    }
    blocks.push(current);
    blocks
}

// 多个对白续段合并为一段，后续括号提示并入对白正文
fn merge_blocks(blocks: Vec<DialogueBlock>) -> DialogueBlock {
    let mut iter = blocks.into_iter();
    let Some(mut merged) = iter.next() else {
        return DialogueBlock::default();
    };
    let mut body: Vec<String> = merged.dialogue.take().into_iter().collect();
    for block in iter {
        body.extend(block.parenthetical);
        body.extend(block.dialogue);
    }
    if !body.is_empty() {
        merged.dialogue = Some(body.join("\n"));
    }
    merged
}

fn non_empty_action(text: &str) -> Option<Paragraph> {
    if text.trim().is_empty() {
        None
    } else {
        Some(Paragraph::Action { text: text.to_string() })
    }
}

/// 元素 → 段落
pub fn to_paragraphs(elements: &[FountainElement]) -> Vec<Paragraph> {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            // 场景标题总是输出，即使为空
            FountainElement::SceneHeading { text, scene_number } => {
                out.push(Paragraph::SceneHeading {
                    text: text.to_uppercase(),
                    scene_number: scene_number.clone(),
                });
            }
            FountainElement::Action { text } => out.extend(non_empty_action(text)),
            FountainElement::Transition { text } => {
                if !text.trim().is_empty() {
                    out.push(Paragraph::Transition { text: text.to_uppercase() });
                }
            }
            FountainElement::Dialogue(block) => {
                out.extend(block.parts().into_iter().map(Paragraph::from));
            }
            FountainElement::DualDialogue { left, right } => {
                out.push(Paragraph::DualDialogue {
                    left: left.parts(),
                    right: right.parts(),
                });
            }
            FountainElement::Character { text } => {
                if !text.trim().is_empty() {
                    out.push(Paragraph::Character { character: text.to_uppercase() });
                }
            }
            FountainElement::Parenthetical { text } => {
                if !text.trim().is_empty() {
                    out.push(Paragraph::Parenthetical { text: text.clone() });
                }
            }
            FountainElement::TitleEntry { value: text, .. }
            | FountainElement::Lyrics { text }
            | FountainElement::Centered { text }
            | FountainElement::Synopsis { text }
            | FountainElement::Section { text, .. }
            | FountainElement::Note { text } => out.extend(non_empty_action(text)),
            FountainElement::PageBreak => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(src: &str) -> Vec<FountainElement> {
        FountainParser::new().parse(src).elements
    }

    #[test]
    fn heading_followed_by_action_in_same_block() {
        let els = elements("INT. HOUSE - DAY #12A#\nThe door creaks.");
        assert_eq!(
            els,
            vec![
                FountainElement::SceneHeading {
                    text: "INT. HOUSE - DAY".to_string(),
                    scene_number: Some("12A".to_string()),
                },
                FountainElement::Action { text: "The door creaks.".to_string() },
            ]
        );
    }

    #[test]
    fn forced_heading_but_not_ellipsis() {
        let els = elements(".FLASHBACK\n\n...and then");
        assert!(matches!(&els[0], FountainElement::SceneHeading { text, .. } if text == "FLASHBACK"));
        assert!(matches!(&els[1], FountainElement::Action { .. }));
    }

    #[test]
    fn title_page_only_in_first_block() {
        let out = FountainParser::new().parse("Title: Heist\nAuthor:\n    Jo Doe\n\nTitle: not a title page");
        assert_eq!(out.title_value("title"), Some("Heist"));
        assert_eq!(out.title_value("author"), Some("Jo Doe"));
        assert_eq!(out.title_page.len(), 2);
        assert!(matches!(out.elements.last(), Some(FountainElement::Action { .. })));
    }

    #[test]
    fn mid_dialogue_parenthetical_starts_continuation() {
        let els = elements("MARA\n(quiet)\nStay here.\n(beat)\nPlease.");
        assert_eq!(els.len(), 2);
        assert_eq!(
            els[1],
            FountainElement::Dialogue(DialogueBlock {
                character: None,
                parenthetical: Some("(beat)".to_string()),
                dialogue: Some("Please.".to_string()),
            })
        );
    }

    #[test]
    fn caret_without_previous_dialogue_is_plain_dialogue() {
        let els = elements("Some action.\n\nDIEGO ^\nHi.");
        assert!(matches!(&els[1], FountainElement::Dialogue(b) if b.character.as_deref() == Some("DIEGO")));
    }

    #[test]
    fn page_break_and_boneyard_dropped() {
        let out = FountainParser::new().parse("===\n\n/* cut */\n\nAction.");
        assert_eq!(out.paragraphs, vec![Paragraph::Action { text: "Action.".to_string() }]);
    }
}
