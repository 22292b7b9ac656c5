use std::collections::HashMap;
use lazy_static::lazy_static;
use regex::Regex;

pub struct FountainConstants;

impl FountainConstants {
    /// 以句号结尾的固定转场
    pub fn fixed_transitions() -> &'static [&'static str] {
        &["FADE OUT.", "FADE TO BLACK.", "CUT TO BLACK."]
    }
}

lazy_static! {
    // 块级元素正则，均作用于单行
    pub static ref BLOCK_REGEX: HashMap<&'static str, Regex> = {
        let mut map = HashMap::new();
        map.insert("title_page", Regex::new(r"(?i)^\s*(title|credit|author[s]?|source|notes|draft date|date|contact(?: info)?|copyright|revision)\s*:\s*(.*)$").unwrap());
        map.insert("title_continuation", Regex::new(r"^(?: {3,}|\t)\s*(.*)$").unwrap());
        map.insert("scene_heading", Regex::new(r"(?i)^\s*((?:\*{0,3}_?)?(?:int|ext|est|int\.?/ext|i\.?/e)[. ].+)$").unwrap());
        map.insert("scene_number", Regex::new(r"\s*#([\w.\-]+)#\s*$").unwrap());
        map.insert("centered", Regex::new(r"^\s*>\s*(.+?)\s*<\s*$").unwrap());
        map.insert("transition_to", Regex::new(r"^\s*([^\p{Ll}]+ TO:)\s*$").unwrap());
        map.insert("transition_forced", Regex::new(r"^\s*>\s*(.+)$").unwrap());
        map.insert("character", Regex::new(r"^\s*((?:\p{Lu}[^\p{Ll}\r\n@^]*)|(?:@[^\r\n^]+))(\s*\^)?\s*$").unwrap());
        map.insert("parenthetical", Regex::new(r"^\s*(\(.+\)|（.+）)\s*$").unwrap());
        map.insert("section", Regex::new(r"^\s*(#+)\s*(.*)$").unwrap());
        map.insert("synopsis", Regex::new(r"^\s*=\s*(.*)$").unwrap());
        map.insert("page_break", Regex::new(r"^\s*={3,}\s*$").unwrap());
        map.insert("note", Regex::new(r"^\s*\[\[([\s\S]*)\]\]\s*$").unwrap());
        map.insert("lyric", Regex::new(r"^\s*~\s*(.*)$").unwrap());
        map.insert("action_force", Regex::new(r"^(\s*)!(.*)$").unwrap());
        map
    };

    // 文本预处理正则
    pub static ref CLEAN_REGEX: HashMap<&'static str, Regex> = {
        let mut map = HashMap::new();
        map.insert("boneyard", Regex::new(r"(?s)/\*.*?\*/").unwrap());
        map.insert("line_ending", Regex::new(r"\r\n?").unwrap());
        map
    };
}
