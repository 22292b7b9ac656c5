pub mod fountain_constants;

pub use fountain_constants::FountainConstants;

/// 文件名中不允许出现的字符替换为下划线
pub fn sanitize_file_stem(stem: &str) -> String {
    stem.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
