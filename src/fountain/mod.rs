pub mod slugline;
pub mod compiler;

pub use slugline::{make_slugline, scene_slugline};
pub use compiler::{compile_fountain, title_header};

use crate::models::scene::sorted_by_order;
use crate::models::{Paragraph, ParagraphKind, Scene};
use crate::parser;

/// FDX 和 PDF 渲染用的场景源文本：作者原文，否则标题行加梗概
pub fn scene_source(scene: &Scene) -> String {
    match scene.authored_text() {
        Some(text) => text.to_string(),
        None => format!("{}\n\n{}", scene_slugline(scene), scene.synopsis),
    }
}

/// 场景标题后追加编号
pub fn numbered_heading(text: &str, number: usize) -> String {
    format!("{} [#{}]", text, number)
}

/// 已编号、已解析的场景
///
/// 编号只在渲染时附加到 `heading_index` 指向的段落上，解析结果本身不变。
#[derive(Debug, Clone)]
pub struct NumberedScene {
    /// 按排序后位置计的 1 起编号
    pub number: usize,
    pub slugline: String,
    pub paragraphs: Vec<Paragraph>,
    /// 第一个场景标题段落的位置
    pub heading_index: Option<usize>,
}

impl NumberedScene {
    /// 该段落要附加的编号
    pub fn number_for(&self, index: usize) -> Option<usize> {
        (self.heading_index == Some(index)).then_some(self.number)
    }
}

/// 排序、解析并编号所有场景
pub fn numbered_scenes(scenes: &[Scene]) -> Vec<NumberedScene> {
    sorted_by_order(scenes)
        .iter()
        .enumerate()
        .map(|(i, scene)| {
            let paragraphs = parser::parse(&scene_source(scene));
            let heading_index = paragraphs
                .iter()
                .position(|p| p.kind() == ParagraphKind::SceneHeading);
            NumberedScene {
                number: i + 1,
                slugline: scene_slugline(scene),
                paragraphs,
                heading_index,
            }
        })
        .collect()
}
