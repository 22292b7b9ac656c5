use unicode_segmentation::UnicodeSegmentation;
use crate::utils::fountain_constants::CLEAN_REGEX;

/// 统一换行符、去掉 boneyard 注释、制表符换成四个空格
pub fn normalize(script: &str) -> String {
    let text = CLEAN_REGEX["line_ending"].replace_all(script, "\n");
    let text = CLEAN_REGEX["boneyard"].replace_all(&text, "");
    text.replace('\t', "    ")
}

/// 按空行切分文本块，块内保留原始行
pub fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// 去掉首尾空白后的字形簇数量
pub fn trimmed_len(text: &str) -> usize {
    text.trim().graphemes(true).count()
}

/// 可选文本的长度，None 视为 0
pub fn trimmed_len_opt(text: Option<&str>) -> usize {
    text.map(trimmed_len).unwrap_or(0)
}

/// 以空白分隔的单词数
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
