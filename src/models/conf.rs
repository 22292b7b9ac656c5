use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// 字体文件名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFiles {
    pub regular: String,
    pub bold: String,
    /// 斜体可缺省，缺省时斜体退回常规字体
    pub italic: Option<String>,
}

impl Default for FontFiles {
    fn default() -> Self {
        FontFiles {
            regular: "CourierPrime-Regular.ttf".to_string(),
            bold: "CourierPrime-Bold.ttf".to_string(),
            italic: Some("CourierPrime-Italic.ttf".to_string()),
        }
    }
}

/// 导出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    /// 剧本没有标题时使用的标题
    pub untitled_title: String,
    /// 导出文件名的兜底名
    pub file_stem_fallback: String,
    pub credit: String,
    pub author: String,
    /// 字体目录，为空时直接使用内置 Courier
    pub font_dir: Option<PathBuf>,
    pub font_files: FontFiles,
    /// 双对白不展平，遇到时报错
    pub strict_dual_dialogue: bool,
    /// 是否在每页右上角打印页码
    pub show_page_numbers: bool,
    /// 是否在场景标题后追加 [#n]
    pub number_scenes: bool,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            untitled_title: "Untitled Screenplay".to_string(),
            file_stem_fallback: "screenplay".to_string(),
            credit: "Written by".to_string(),
            author: "Author".to_string(),
            font_dir: None,
            font_files: FontFiles::default(),
            strict_dual_dialogue: false,
            show_page_numbers: true,
            number_scenes: true,
        }
    }
}

impl Conf {
    /// 从 JSON 文件读取配置，缺失字段取默认值
    pub fn from_json_file(path: &Path) -> std::io::Result<Conf> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// 标题为空串时使用兜底标题；只含空白的标题照常显示
    pub fn display_title<'a>(&'a self, title: &'a str) -> &'a str {
        if title.is_empty() {
            &self.untitled_title
        } else {
            title
        }
    }
}
