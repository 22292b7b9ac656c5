//! 导出接口
//!
//! 把各个渲染器包装成统一的产物（文件名 + 字节），供命令行和外部调用方使用

use std::io::{Cursor, Write};
use std::path::Path;
use serde::Serialize;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};
use crate::fdx::{build_fdx, FdxError};
use crate::fountain::compile_fountain;
use crate::markdown;
use crate::models::{Conf, Screenplay};
use crate::parser::{FountainParser, ParseOutput};
use crate::pdf::{self, FontSource, PdfError};
use crate::utils::sanitize_file_stem;

/// 导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF导出失败: {0}")]
    Pdf(#[from] PdfError),

    #[error("FDX导出失败: {0}")]
    Fdx(#[from] FdxError),

    #[error("打包失败: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Fountain,
    Fdx,
    Pdf,
    BeatSheet,
    CharacterBios,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Fountain,
        ExportFormat::Fdx,
        ExportFormat::Pdf,
        ExportFormat::BeatSheet,
        ExportFormat::CharacterBios,
    ];

    /// 文件名中标题之后的部分
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ExportFormat::Fountain => ".fountain",
            ExportFormat::Fdx => ".fdx",
            ExportFormat::Pdf => ".pdf",
            ExportFormat::BeatSheet => "-beats.md",
            ExportFormat::CharacterBios => "-characters.md",
        }
    }

    pub fn parse(name: &str) -> Option<ExportFormat> {
        match name.trim().to_lowercase().as_str() {
            "fountain" => Some(ExportFormat::Fountain),
            "fdx" => Some(ExportFormat::Fdx),
            "pdf" => Some(ExportFormat::Pdf),
            "beats" | "beat_sheet" | "beat-sheet" => Some(ExportFormat::BeatSheet),
            "characters" | "bios" | "character_bios" | "character-bios" => Some(ExportFormat::CharacterBios),
            _ => None,
        }
    }
}

/// 一个导出产物
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 写文件类接口的结果
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ExportReport {
    fn ok(message: impl Into<String>) -> Self {
        ExportReport { success: true, message: message.into(), file_path: None, data: None }
    }

    fn failed(message: impl Into<String>) -> Self {
        ExportReport { success: false, message: message.into(), file_path: None, data: None }
    }
}

/// 导出前的质量概览
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSnapshot {
    pub scenes: usize,
    /// 草稿不少于 40 字的场景数
    pub drafted: usize,
    pub keys: usize,
}

pub fn snapshot(screenplay: &Screenplay) -> ExportSnapshot {
    let scenes = &screenplay.scenes;
    ExportSnapshot {
        scenes: scenes.len(),
        drafted: scenes
            .iter()
            .filter(|s| crate::parser::trimmed_len_opt(s.formatted_text.as_deref()) >= 40)
            .count(),
        keys: scenes.iter().filter(|s| s.is_key).count(),
    }
}

/// 建议的文件名：`<标题|screenplay><后缀>`
pub fn file_name(screenplay: &Screenplay, format: ExportFormat, conf: &Conf) -> String {
    let stem = sanitize_file_stem(&screenplay.title);
    let stem = if stem.is_empty() { conf.file_stem_fallback.clone() } else { stem };
    format!("{}{}", stem, format.file_suffix())
}

/// 渲染单个格式
pub async fn render(screenplay: &Screenplay, format: ExportFormat, conf: &Conf) -> ExportResult<Artifact> {
    let scenes = &screenplay.scenes;
    let bytes = match format {
        ExportFormat::Fountain => compile_fountain(screenplay, scenes, conf).into_bytes(),
        ExportFormat::Fdx => build_fdx(screenplay, scenes, conf)?.into_bytes(),
        ExportFormat::Pdf => {
            let source = pdf::font_source(conf);
            let fonts = source.as_ref().map(|s| s as &dyn FontSource);
            pdf::export_pdf(screenplay, scenes, conf, fonts).await?
        }
        ExportFormat::BeatSheet => markdown::beat_sheet(screenplay).into_bytes(),
        ExportFormat::CharacterBios => markdown::character_bios(screenplay).into_bytes(),
    };
    Ok(Artifact {
        format,
        file_name: file_name(screenplay, format, conf),
        bytes,
    })
}

/// 所有格式打成一个 zip
pub async fn export_bundle(screenplay: &Screenplay, conf: &Conf) -> ExportResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for format in ExportFormat::ALL {
        let artifact = render(screenplay, format, conf).await?;
        zip.start_file(artifact.file_name.as_str(), options)?;
        zip.write_all(&artifact.bytes)?;
    }
    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    log::info!("导出包完成: {} 字节", bytes.len());
    Ok(bytes)
}

/// 导出包的文件名
pub fn bundle_file_name(screenplay: &Screenplay, conf: &Conf) -> String {
    let stem = sanitize_file_stem(&screenplay.title);
    let stem = if stem.is_empty() { conf.file_stem_fallback.as_str() } else { stem.as_str() };
    format!("{}-exports.zip", stem)
}

/// 导出到目录，文件名取建议文件名
pub async fn export_to_dir(
    screenplay: &Screenplay,
    format: ExportFormat,
    dir: &Path,
    conf: &Conf,
) -> ExportReport {
    let result = async {
        let artifact = render(screenplay, format, conf).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&artifact.file_name);
        tokio::fs::write(&path, &artifact.bytes).await?;
        Ok::<_, ExportError>(path)
    }
    .await;

    match result {
        Ok(path) => {
            log::info!("已导出 {}", path.display());
            ExportReport {
                file_path: Some(path.display().to_string()),
                ..ExportReport::ok("导出成功")
            }
        }
        Err(e) => {
            log::error!("导出失败: {}", e);
            ExportReport::failed(format!("导出失败: {}", e))
        }
    }
}

/// PDF 的 Base64 编码
pub async fn export_pdf_base64(screenplay: &Screenplay, conf: &Conf) -> ExportReport {
    match render(screenplay, ExportFormat::Pdf, conf).await {
        Ok(artifact) => ExportReport {
            data: Some(base64::encode(&artifact.bytes)),
            file_path: None,
            ..ExportReport::ok("PDF Base64编码生成成功")
        },
        Err(e) => ExportReport::failed(format!("生成失败: {}", e)),
    }
}

/// 解析 Fountain 文本
pub fn parse_fountain_text(text: &str) -> ParseOutput {
    FountainParser::new().parse(text)
}

/// 解析结果的 JSON 表示
pub fn parse_fountain_json(text: &str) -> ExportResult<String> {
    Ok(serde_json::to_string(&parse_fountain_text(text))?)
}
