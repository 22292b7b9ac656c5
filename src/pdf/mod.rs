//! PDF 导出
//!
//! 排版分两步：[`layout_pdf`] 把场景排成逐页的绘制指令（纯计算），
//! [`writer::write_pdf`] 再用 lopdf 把指令和字体写成 PDF。

pub mod fonts;
pub mod liner;
pub mod writer;

use thiserror::Error;
use crate::fdx::{DUAL_DIALOGUE_MARKER, DUAL_DIALOGUE_SEPARATOR};
use crate::fountain::{numbered_heading, numbered_scenes};
use crate::models::{Conf, Paragraph, Scene, Screenplay};

pub use fonts::{load_fonts, DirFontSource, FontFace, FontProgram, FontSet, FontSource};
pub use liner::{wrap_mono, DrawOp, Liner, PdfPage};
use liner::*;

/// PDF导出错误类型
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF生成错误: {0}")]
    Lopdf(String),

    #[error("严格模式下不支持双对白")]
    DualDialogueUnsupported,
}

pub type PdfResult<T> = Result<T, PdfError>;

/// 配置中的字体目录对应的字体来源
pub fn font_source(conf: &Conf) -> Option<DirFontSource> {
    conf.font_dir.as_ref().map(DirFontSource::new)
}

fn draw_paragraph(liner: &mut Liner, paragraph: &Paragraph, strict_dual: bool) -> PdfResult<()> {
    match paragraph {
        // 本场第一个标题已在场景开头画过，这里只会遇到后续标题
        Paragraph::SceneHeading { text, .. } => {
            liner.draw_line(text.to_uppercase(), col_to_x(INDENT_SLUG), FontFace::Bold);
        }
        Paragraph::Action { text } => {
            liner.draw_wrapped(text, COLS_BODY, INDENT_ACTION, FontFace::Regular);
        }
        Paragraph::Transition { text } => {
            let line = text.to_uppercase();
            let x = (PAGE_WIDTH - MARGIN_RIGHT - text_width(&line)).max(MARGIN_LEFT);
            liner.draw_line(line, x, FontFace::Bold);
        }
        Paragraph::Character { character } => {
            liner.draw_line(character.to_uppercase(), col_to_x(INDENT_CHARACTER), FontFace::Regular);
        }
        Paragraph::Parenthetical { text } => {
            liner.draw_wrapped(text, COLS_PARENTHETICAL, INDENT_PARENTHETICAL, FontFace::Regular);
        }
        Paragraph::Dialogue { dialogue } => {
            liner.draw_wrapped(dialogue, COLS_DIALOGUE, INDENT_DIALOGUE, FontFace::Regular);
            liner.skip(LEADING / 2.0);
        }
        Paragraph::DualDialogue { left, right } => {
            if strict_dual {
                return Err(PdfError::DualDialogueUnsupported);
            }
            liner.draw_line(DUAL_DIALOGUE_MARKER, col_to_x(INDENT_ACTION), FontFace::Italic);
            for part in left {
                draw_paragraph(liner, &Paragraph::from(part.clone()), strict_dual)?;
            }
            liner.draw_line(DUAL_DIALOGUE_SEPARATOR, col_to_x(INDENT_ACTION), FontFace::Italic);
            for part in right {
                draw_paragraph(liner, &Paragraph::from(part.clone()), strict_dual)?;
            }
        }
    }
    Ok(())
}

/// 排版：场景按 order 升序，编号按排序后的位置
pub fn layout_pdf(screenplay: &Screenplay, scenes: &[Scene], conf: &Conf) -> PdfResult<Vec<PdfPage>> {
    let mut liner = Liner::new(conf.show_page_numbers);

    if !screenplay.title.is_empty() {
        liner.draw_centered(&screenplay.title.to_uppercase(), FontFace::Bold);
        liner.skip(LEADING * 2.0);
    }

    for scene in numbered_scenes(scenes) {
        let slug = scene
            .heading_index
            .and_then(|i| scene.paragraphs[i].text())
            .unwrap_or(&scene.slugline)
            .to_uppercase();
        let heading = if conf.number_scenes {
            numbered_heading(&slug, scene.number)
        } else {
            slug
        };
        liner.draw_line(heading, col_to_x(INDENT_SLUG), FontFace::Bold);
        liner.skip(LEADING / 2.0);

        for (i, paragraph) in scene.paragraphs.iter().enumerate() {
            if Some(i) == scene.heading_index {
                continue;
            }
            draw_paragraph(&mut liner, paragraph, conf.strict_dual_dialogue)?;
        }
        liner.skip(LEADING);
    }

    Ok(liner.finish())
}

/// 生成 PDF 字节；字体加载失败时使用内置 Courier
pub async fn export_pdf(
    screenplay: &Screenplay,
    scenes: &[Scene],
    conf: &Conf,
    fonts: Option<&dyn FontSource>,
) -> PdfResult<Vec<u8>> {
    let font_set = load_fonts(fonts, &conf.font_files).await;
    let pages = layout_pdf(screenplay, scenes, conf)?;
    let bytes = writer::write_pdf(&pages, &font_set, Some(&screenplay.title))?;
    log::info!(
        "PDF 生成完成: {} 个场景, {} 页, {} 字节{}",
        scenes.len(),
        pages.len(),
        bytes.len(),
        if font_set.is_builtin() { " (内置字体)" } else { "" }
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayPart, DialoguePart, Heading};

    fn all_draws(pages: &[PdfPage]) -> Vec<&DrawOp> {
        pages.iter().flat_map(|p| p.draws.iter()).collect()
    }

    #[test]
    fn title_is_centered_bold_and_upper_cased() {
        let sp = Screenplay::new(1, "Heist");
        let pages = layout_pdf(&sp, &[], &Conf::default()).unwrap();
        let title = pages[0].draws.iter().find(|d| d.text == "HEIST").unwrap();
        assert_eq!(title.face, FontFace::Bold);
        assert!((title.x - (PAGE_WIDTH - text_width("HEIST")) / 2.0).abs() < 0.001);
        assert_eq!(title.y, PAGE_HEIGHT - MARGIN_TOP);
    }

    #[test]
    fn only_empty_title_is_skipped() {
        let pages = layout_pdf(&Screenplay::new(1, ""), &[], &Conf::default()).unwrap();
        assert!(pages[0].draws.iter().all(|d| d.face != FontFace::Bold));

        let pages = layout_pdf(&Screenplay::new(1, "  "), &[], &Conf::default()).unwrap();
        assert!(pages[0].draws.iter().any(|d| d.text == "  " && d.face == FontFace::Bold));
    }

    #[test]
    fn heading_is_bold_and_numbered_once() {
        let mut scene = Scene::new(Heading::Int, "lab", DayPart::Night, "");
        scene.order = 1;
        scene.formatted_text = Some("INT. LAB - NIGHT\n\nSparks fly.\n\nCUT TO:".to_string());
        let pages = layout_pdf(&Screenplay::new(1, ""), &[scene], &Conf::default()).unwrap();
        let draws = all_draws(&pages);
        let headings: Vec<_> = draws.iter().filter(|d| d.text.contains("LAB")).collect();
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "INT. LAB - NIGHT [#1]");
        assert_eq!(headings[0].face, FontFace::Bold);

        let transition = draws.iter().find(|d| d.text == "CUT TO:").unwrap();
        assert_eq!(transition.face, FontFace::Bold);
        assert!((transition.x + text_width("CUT TO:") - (PAGE_WIDTH - MARGIN_RIGHT)).abs() < 0.001);
    }

    #[test]
    fn vertical_spacing_between_elements() {
        let mut first = Scene::new(Heading::Int, "lab", DayPart::Night, "");
        first.order = 1;
        first.formatted_text = Some("INT. LAB - NIGHT\n\nMARA\nGo.\n\nShe runs.".to_string());
        let mut second = Scene::new(Heading::Ext, "roof", DayPart::Dawn, "Wind.");
        second.order = 2;
        let conf = Conf { show_page_numbers: false, ..Conf::default() };

        let pages = layout_pdf(&Screenplay::new(1, ""), &[first, second], &conf).unwrap();
        let y_of = |prefix: &str| {
            pages[0]
                .draws
                .iter()
                .find(|d| d.text.starts_with(prefix))
                .map(|d| d.y)
                .unwrap()
        };

        let top = PAGE_HEIGHT - MARGIN_TOP;
        assert_eq!(y_of("INT. LAB"), top);
        // 标题后空半行
        assert_eq!(y_of("MARA"), top - LEADING * 1.5);
        assert_eq!(y_of("Go."), y_of("MARA") - LEADING);
        // 对白后空半行
        assert_eq!(y_of("She runs."), y_of("Go.") - LEADING * 1.5);
        // 场景之间空一行
        assert_eq!(y_of("EXT. ROOF"), y_of("She runs.") - LEADING * 2.0);
    }

    #[test]
    fn liner_cursor_moves_by_leading_and_skip() {
        let mut liner = Liner::new(false);
        let top = liner.y();
        liner.draw_line("one", MARGIN_LEFT, FontFace::Regular);
        assert_eq!(liner.y(), top - LEADING);
        liner.skip(LEADING / 2.0);
        assert_eq!(liner.y(), top - LEADING * 1.5);
        liner.draw_centered("title", FontFace::Bold);
        assert_eq!(liner.y(), top - LEADING * 1.5);
    }

    #[test]
    fn dual_dialogue_markers_are_italic_unless_strict() {
        let mut liner = Liner::new(false);
        let dual = Paragraph::DualDialogue {
            left: vec![DialoguePart::Dialogue { dialogue: "Left.".to_string() }],
            right: vec![DialoguePart::Dialogue { dialogue: "Right.".to_string() }],
        };
        draw_paragraph(&mut liner, &dual, false).unwrap();
        let pages = liner.finish();
        let draws = all_draws(&pages);
        assert_eq!(draws[0].text, DUAL_DIALOGUE_MARKER);
        assert_eq!(draws[0].face, FontFace::Italic);
        assert_eq!(draws[1].x, col_to_x(INDENT_DIALOGUE));

        let mut liner = Liner::new(false);
        assert!(matches!(
            draw_paragraph(&mut liner, &dual, true),
            Err(PdfError::DualDialogueUnsupported)
        ));
    }
}
