use screenwright::api::{self, ExportFormat};
use screenwright::fdx::{build_fdx, FdxError, DUAL_DIALOGUE_MARKER, DUAL_DIALOGUE_SEPARATOR};
use screenwright::fountain::compile_fountain;
use screenwright::models::{
    Conf, DayPart, Heading, MoveDirection, ParagraphKind, Scene, Screenplay,
};
use screenwright::parser::parse;
use screenwright::pdf::{export_pdf, layout_pdf, DirFontSource, FontFace, FontSource, PdfError};
use screenwright::store::{MemoryStore, ScreenplayStore};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn scene(order: u32, location: &str) -> Scene {
    let mut s = Scene::new(Heading::Int, location, DayPart::Day, "Something happens here.");
    s.order = order;
    s
}

/// order 为 [3, 1, 2] 的三个场景
fn shuffled() -> Screenplay {
    let mut sp = Screenplay::new(1, "Numbers");
    sp.scenes = vec![scene(3, "C"), scene(1, "A"), scene(2, "B")];
    sp
}

fn sample_scene() -> Scene {
    let script = fs::read_to_string(Path::new("tests/test_data/heist.fountain")).expect("无法读取测试文件");
    // 去掉标题页，只保留正文
    let body = script.splitn(2, "\n\n").nth(1).unwrap_or_default().to_string();
    let mut s = Scene::new(Heading::Int, "BANK VAULT", DayPart::Night, "");
    s.order = 1;
    s.formatted_text = Some(body);
    s
}

#[test]
fn test_fdx_numbers_by_sorted_position() {
    let sp = shuffled();
    let xml = build_fdx(&sp, &sp.scenes, &Conf::default()).unwrap();
    let a = xml.find("INT. A - DAY [#1]").expect("缺少 #1");
    let b = xml.find("INT. B - DAY [#2]").expect("缺少 #2");
    let c = xml.find("INT. C - DAY [#3]").expect("缺少 #3");
    assert!(a < b && b < c);
    assert!(xml.contains(r#"<FinalDraft DocumentType="Script" Version="1">"#));
    assert!(xml.contains("<TitlePage>"));
}

#[test]
fn test_pdf_numbers_by_sorted_position() {
    let sp = shuffled();
    let pages = layout_pdf(&sp, &sp.scenes, &Conf::default()).unwrap();
    let headings: Vec<String> = pages
        .iter()
        .flat_map(|p| p.draws.iter())
        .filter(|d| d.text.starts_with("INT."))
        .map(|d| d.text.clone())
        .collect();
    assert_eq!(
        headings,
        vec!["INT. A - DAY [#1]", "INT. B - DAY [#2]", "INT. C - DAY [#3]"]
    );
}

#[test]
fn test_numbering_can_be_disabled() {
    let sp = shuffled();
    let conf = Conf { number_scenes: false, ..Conf::default() };
    let xml = build_fdx(&sp, &sp.scenes, &conf).unwrap();
    assert!(!xml.contains("[#"));
}

/// 每种段落类型都要经过每个渲染器
#[test]
fn test_every_paragraph_kind_renders() {
    let scene = sample_scene();
    let paragraphs = parse(scene.formatted_text.as_deref().unwrap());
    for kind in ParagraphKind::ALL {
        assert!(
            paragraphs.iter().any(|p| p.kind() == kind),
            "样例缺少段落类型 {:?}",
            kind
        );
    }

    let sp = Screenplay::new(1, "The Long Night");
    let scenes = vec![scene];
    let conf = Conf::default();

    let compiled = compile_fountain(&sp, &scenes, &conf);
    assert!(compiled.contains("DIEGO ^"));

    let xml = build_fdx(&sp, &scenes, &conf).unwrap();
    for kind in ParagraphKind::ALL {
        if kind == ParagraphKind::DualDialogue {
            continue;
        }
        let tag = format!(r#"<Paragraph Type="{}">"#, kind.as_str());
        assert!(xml.contains(&tag), "FDX 缺少 {}", tag);
    }
    assert!(xml.contains(DUAL_DIALOGUE_MARKER));
    assert!(xml.contains(DUAL_DIALOGUE_SEPARATOR));
    // 只有第一个场景标题带编号
    assert_eq!(xml.matches("[#1]").count(), 1);
    assert!(xml.contains("EXT. ROOFTOP - DAWN<"));

    let pages = layout_pdf(&sp, &scenes, &conf).unwrap();
    let draws: Vec<_> = pages.iter().flat_map(|p| p.draws.iter()).collect();
    let marker = draws.iter().find(|d| d.text == DUAL_DIALOGUE_MARKER).unwrap();
    assert_eq!(marker.face, FontFace::Italic);
    assert!(draws.iter().any(|d| d.text == "CUT TO:" && d.face == FontFace::Bold));
    assert!(draws.iter().any(|d| d.text == "EXT. ROOFTOP - DAWN" && d.face == FontFace::Bold));
}

#[tokio::test]
async fn test_strict_dual_dialogue_fails_explicitly() {
    let sp = Screenplay::new(1, "Strict");
    let scenes = vec![sample_scene()];
    let conf = Conf { strict_dual_dialogue: true, ..Conf::default() };

    assert!(matches!(
        build_fdx(&sp, &scenes, &conf),
        Err(FdxError::DualDialogueUnsupported)
    ));
    assert!(matches!(
        export_pdf(&sp, &scenes, &conf, None).await,
        Err(PdfError::DualDialogueUnsupported)
    ));
}

#[tokio::test]
async fn test_pdf_falls_back_when_fonts_missing() {
    let dir = tempdir().unwrap();
    let source = DirFontSource::new(dir.path());
    let sp = shuffled();
    let bytes = export_pdf(&sp, &sp.scenes, &Conf::default(), Some(&source as &dyn FontSource)).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_long_script_paginates() {
    let mut sp = Screenplay::new(1, "Long");
    for i in 0..40 {
        let mut s = scene(i + 1, "HALLWAY");
        s.formatted_text = Some(format!("INT. HALLWAY - DAY\n\n{}", "Footsteps echo down the corridor. ".repeat(6)));
        sp.scenes.push(s);
    }
    let pages = layout_pdf(&sp, &sp.scenes, &Conf::default()).unwrap();
    assert!(pages.len() > 1);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.number, i + 1);
        assert!(page.draws.iter().any(|d| d.text == (i + 1).to_string()), "第 {} 页缺少页码", i + 1);
    }
}

#[tokio::test]
async fn test_move_scene_up_then_export_order() {
    let store = MemoryStore::new();
    let sp = store.create("Moves").await.unwrap();
    let mut ids = Vec::new();
    for loc in ["A", "B", "C"] {
        ids.push(store.add_scene(sp.id, scene(0, loc)).await.unwrap().id);
    }
    let scenes = store.move_scene(sp.id, ids[1], MoveDirection::Up).await.unwrap();
    let orders: Vec<(u64, u32)> = scenes.iter().map(|s| (s.id, s.order)).collect();
    assert_eq!(orders, vec![(ids[1], 1), (ids[0], 2), (ids[2], 3)]);

    let sp = store.get(sp.id).await.unwrap();
    let xml = build_fdx(&sp, &sp.scenes, &Conf::default()).unwrap();
    assert!(xml.find("INT. B - DAY [#1]").unwrap() < xml.find("INT. A - DAY [#2]").unwrap());
}

#[tokio::test]
async fn test_export_to_dir_writes_every_format() {
    let dir = tempdir().unwrap();
    let sp = shuffled();
    let conf = Conf::default();
    for format in ExportFormat::ALL {
        let report = api::export_to_dir(&sp, format, dir.path(), &conf).await;
        assert!(report.success, "{}", report.message);
    }
    for name in ["Numbers.fountain", "Numbers.fdx", "Numbers.pdf", "Numbers-beats.md", "Numbers-characters.md"] {
        assert!(dir.path().join(name).exists(), "缺少 {}", name);
    }
    let fountain = fs::read_to_string(dir.path().join("Numbers.fountain")).unwrap();
    assert!(fountain.starts_with("Title: Numbers\n"));
}
