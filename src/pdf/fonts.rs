use std::fmt::Debug;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use crate::models::FontFiles;

/// 内置回退字体
pub const BUILTIN_COURIER: &str = "Courier";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

impl FontFace {
    /// 页面资源中的字体名
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Italic => "F3",
        }
    }
}

/// 字体加载错误类型
#[derive(Error, Debug)]
pub enum FontLoadError {
    #[error("读取字体失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("不是 TrueType 字体: {0}")]
    InvalidFont(String),
}

/// 一个字重对应的字体程序
#[derive(Debug, Clone, PartialEq)]
pub enum FontProgram {
    /// 嵌入的 TrueType 数据
    Embedded { name: String, data: Vec<u8> },
    /// PDF 标准 14 字体
    Builtin(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontSet {
    pub regular: FontProgram,
    pub bold: FontProgram,
    pub italic: FontProgram,
}

impl FontSet {
    /// 三个字重都用内置 Courier
    pub fn builtin() -> Self {
        FontSet {
            regular: FontProgram::Builtin(BUILTIN_COURIER),
            bold: FontProgram::Builtin(BUILTIN_COURIER),
            italic: FontProgram::Builtin(BUILTIN_COURIER),
        }
    }

    pub fn get(&self, face: FontFace) -> &FontProgram {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.regular, FontProgram::Builtin(_))
    }
}

/// 字体来源
#[async_trait]
pub trait FontSource: Send + Sync + Debug {
    async fn fetch(&self, file_name: &str) -> std::io::Result<Vec<u8>>;
}

/// 从本地目录读取字体
#[derive(Debug, Clone)]
pub struct DirFontSource {
    dir: PathBuf,
}

impl DirFontSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        DirFontSource { dir: dir.as_ref().to_path_buf() }
    }
}

#[async_trait]
impl FontSource for DirFontSource {
    async fn fetch(&self, file_name: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.dir.join(file_name)).await
    }
}

// TrueType 文件头：0x00010000 或 "true"
fn is_truetype(data: &[u8]) -> bool {
    data.len() > 12 && (data[..4] == [0x00, 0x01, 0x00, 0x00] || &data[..4] == b"true")
}

fn embedded(file_name: &str, data: Vec<u8>) -> Result<FontProgram, FontLoadError> {
    if !is_truetype(&data) {
        return Err(FontLoadError::InvalidFont(file_name.to_string()));
    }
    let name = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .replace(' ', "");
    Ok(FontProgram::Embedded { name, data })
}

async fn try_load(source: &dyn FontSource, files: &FontFiles) -> Result<FontSet, FontLoadError> {
    let italic = async {
        match &files.italic {
            Some(file) => source.fetch(file).await.ok(),
            None => None,
        }
    };
    let (regular, bold, italic) = tokio::join!(
        source.fetch(&files.regular),
        source.fetch(&files.bold),
        italic
    );
    let regular = embedded(&files.regular, regular?)?;
    let bold = embedded(&files.bold, bold?)?;
    // 斜体取不到时用常规字体
    let italic = match (italic, &files.italic) {
        (Some(data), Some(file)) => embedded(file, data)?,
        _ => regular.clone(),
    };
    Ok(FontSet { regular, bold, italic })
}

/// 加载嵌入字体；任何失败都回退到内置 Courier
pub async fn load_fonts(source: Option<&dyn FontSource>, files: &FontFiles) -> FontSet {
    let Some(source) = source else {
        log::debug!("未配置字体来源，使用内置 Courier");
        return FontSet::builtin();
    };
    match try_load(source, files).await {
        Ok(set) => set,
        Err(e) => {
            log::warn!("字体加载失败，回退到内置 Courier: {}", e);
            FontSet::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct MapSource(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl FontSource for MapSource {
        async fn fetch(&self, file_name: &str) -> std::io::Result<Vec<u8>> {
            self.0
                .get(file_name)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, file_name.to_string()))
        }
    }

    fn fake_ttf() -> Vec<u8> {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(&[0u8; 32]);
        data
    }

    #[tokio::test]
    async fn missing_font_falls_back_to_courier() {
        let source = MapSource::default();
        let set = load_fonts(Some(&source), &FontFiles::default()).await;
        assert_eq!(set, FontSet::builtin());
        assert_eq!(load_fonts(None, &FontFiles::default()).await, FontSet::builtin());
    }

    #[tokio::test]
    async fn missing_italic_reuses_regular() {
        let files = FontFiles::default();
        let mut map = HashMap::new();
        map.insert(files.regular.clone(), fake_ttf());
        map.insert(files.bold.clone(), fake_ttf());
        let set = load_fonts(Some(&MapSource(map)), &files).await;
        assert!(!set.is_builtin());
        assert_eq!(set.italic, set.regular);
        assert!(matches!(&set.bold, FontProgram::Embedded { name, .. } if name == "CourierPrime-Bold"));
    }

    #[tokio::test]
    async fn invalid_font_data_falls_back() {
        let files = FontFiles::default();
        let mut map = HashMap::new();
        map.insert(files.regular.clone(), b"<html>not found</html>".to_vec());
        map.insert(files.bold.clone(), fake_ttf());
        let set = load_fonts(Some(&MapSource(map)), &files).await;
        assert!(set.is_builtin());
    }
}
