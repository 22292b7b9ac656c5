pub mod fountain_parser;
pub mod text_processor;

pub use fountain_parser::{DialogueBlock, FountainElement, FountainParser, ParseOutput};
pub use text_processor::{normalize, trimmed_len, trimmed_len_opt, word_count};

use crate::models::Paragraph;

/// 文本 → 段落序列，顺序与源文本行序一致
pub fn parse(text: &str) -> Vec<Paragraph> {
    FountainParser::new().parse(text).paragraphs
}
