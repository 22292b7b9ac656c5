//! Final Draft (FDX) 导出
//!
//! 每个段落对应一个 `<Paragraph Type="...">`。双对白按
//! `[DUAL DIALOGUE]` / 左侧 / `[—]` / 右侧 的顺序平铺输出。

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;
use crate::fountain::{numbered_heading, numbered_scenes};
use crate::models::{Conf, Paragraph, Scene, Screenplay};

pub const DUAL_DIALOGUE_MARKER: &str = "[DUAL DIALOGUE]";
pub const DUAL_DIALOGUE_SEPARATOR: &str = "[—]";

/// FDX导出错误类型
#[derive(Error, Debug)]
pub enum FdxError {
    #[error("XML写入错误: {0}")]
    Xml(String),

    #[error("输出不是有效的UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("严格模式下不支持双对白")]
    DualDialogueUnsupported,
}

pub type FdxResult<T> = Result<T, FdxError>;

struct FdxWriter {
    writer: Writer<Vec<u8>>,
    strict_dual_dialogue: bool,
}

impl FdxWriter {
    fn new(conf: &Conf) -> Self {
        FdxWriter {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            strict_dual_dialogue: conf.strict_dual_dialogue,
        }
    }

    fn event(&mut self, event: Event<'_>) -> FdxResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| FdxError::Xml(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> FdxResult<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> FdxResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    // 只转义 & < >
    fn paragraph(&mut self, kind: &str, text: &str) -> FdxResult<()> {
        self.start("Paragraph", &[("Type", kind)])?;
        self.start("Text", &[])?;
        self.event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        self.end("Text")?;
        self.end("Paragraph")
    }

    /// 写出一个段落；`scene_number` 只作用于场景标题
    fn write_paragraph(&mut self, paragraph: &Paragraph, scene_number: Option<usize>) -> FdxResult<()> {
        let kind = paragraph.kind().as_str();
        match paragraph {
            Paragraph::SceneHeading { text, .. } => match scene_number {
                Some(n) => self.paragraph(kind, &numbered_heading(text, n)),
                None => self.paragraph(kind, text),
            },
            Paragraph::Action { text }
            | Paragraph::Parenthetical { text }
            | Paragraph::Transition { text } => self.paragraph(kind, text),
            Paragraph::Character { character } => self.paragraph(kind, character),
            Paragraph::Dialogue { dialogue } => self.paragraph(kind, dialogue),
            Paragraph::DualDialogue { left, right } => {
                if self.strict_dual_dialogue {
                    return Err(FdxError::DualDialogueUnsupported);
                }
                self.paragraph("Action", DUAL_DIALOGUE_MARKER)?;
                for part in left {
                    self.write_paragraph(&Paragraph::from(part.clone()), None)?;
                }
                self.paragraph("Action", DUAL_DIALOGUE_SEPARATOR)?;
                for part in right {
                    self.write_paragraph(&Paragraph::from(part.clone()), None)?;
                }
                Ok(())
            }
        }
    }

    fn into_string(self) -> FdxResult<String> {
        Ok(String::from_utf8(self.writer.into_inner())?)
    }
}

/// 生成 FDX 文档
pub fn build_fdx(screenplay: &Screenplay, scenes: &[Scene], conf: &Conf) -> FdxResult<String> {
    let mut fdx = FdxWriter::new(conf);
    fdx.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
    fdx.start("FinalDraft", &[("DocumentType", "Script"), ("Version", "1")])?;

    fdx.start("Content", &[])?;
    for scene in numbered_scenes(scenes) {
        // 没有场景标题时补一个
        if scene.heading_index.is_none() {
            let heading = scene.slugline.to_uppercase();
            let text = if conf.number_scenes {
                numbered_heading(&heading, scene.number)
            } else {
                heading
            };
            fdx.paragraph("Scene Heading", &text)?;
        }
        for (i, paragraph) in scene.paragraphs.iter().enumerate() {
            let number = scene.number_for(i).filter(|_| conf.number_scenes);
            fdx.write_paragraph(paragraph, number)?;
        }
    }
    fdx.end("Content")?;

    fdx.start("TitlePage", &[])?;
    fdx.start("Content", &[])?;
    fdx.paragraph("Title", conf.display_title(&screenplay.title))?;
    fdx.paragraph("Credit", &conf.credit)?;
    fdx.paragraph("Author", &conf.author)?;
    fdx.end("Content")?;
    fdx.end("TitlePage")?;

    fdx.end("FinalDraft")?;
    let xml = fdx.into_string()?;
    log::debug!("FDX 生成完成: {} 个场景, {} 字节", scenes.len(), xml.len());
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayPart, DialoguePart, Heading};

    fn render(paragraph: &Paragraph, number: Option<usize>, strict: bool) -> FdxResult<String> {
        let conf = Conf {
            strict_dual_dialogue: strict,
            ..Conf::default()
        };
        let mut fdx = FdxWriter::new(&conf);
        fdx.write_paragraph(paragraph, number)?;
        fdx.into_string()
    }

    #[test]
    fn escapes_only_markup_characters() {
        let xml = render(
            &Paragraph::Action { text: "Tom & \"Jerry\" <it's>".to_string() },
            None,
            false,
        )
        .unwrap();
        assert!(xml.contains("Tom &amp; \"Jerry\" &lt;it's&gt;"), "{}", xml);
    }

    #[test]
    fn heading_number_is_render_time_only() {
        let heading = Paragraph::scene_heading("INT. LAB - NIGHT");
        let xml = render(&heading, Some(4), false).unwrap();
        assert!(xml.contains("INT. LAB - NIGHT [#4]"));
        assert_eq!(heading, Paragraph::scene_heading("INT. LAB - NIGHT"));
    }

    #[test]
    fn dual_dialogue_flattens_or_fails_in_strict_mode() {
        let dual = Paragraph::DualDialogue {
            left: vec![DialoguePart::Character { character: "A".to_string() }],
            right: vec![DialoguePart::Character { character: "B".to_string() }],
        };
        let xml = render(&dual, None, false).unwrap();
        let marker = xml.find(DUAL_DIALOGUE_MARKER).unwrap();
        let sep = xml.find(DUAL_DIALOGUE_SEPARATOR).unwrap();
        assert!(marker < sep);
        assert!(matches!(render(&dual, None, true), Err(FdxError::DualDialogueUnsupported)));
    }

    #[test]
    fn synthesizes_heading_when_scene_has_none() {
        let mut scene = Scene::new(Heading::Ext, "field", DayPart::Dawn, "");
        scene.order = 1;
        scene.formatted_text = Some("Wind over grass.".to_string());
        let sp = Screenplay::new(1, "");
        let xml = build_fdx(&sp, &[scene], &Conf::default()).unwrap();
        assert!(xml.contains(r#"<Paragraph Type="Scene Heading">"#));
        assert!(xml.contains("EXT. FIELD - DAWN [#1]"));
        assert!(xml.contains("Untitled Screenplay"));
        assert!(xml.starts_with("<?xml"));
    }
}
