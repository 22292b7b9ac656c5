use screenwright::fountain::{compile_fountain, make_slugline, numbered_heading};
use screenwright::models::{Conf, DayPart, Heading, Paragraph, ParagraphKind, Scene, Screenplay};
use screenwright::parser::{parse, FountainElement, FountainParser};
use std::fs;
use std::path::Path;

fn read_sample() -> String {
    let script_path = Path::new("tests/test_data/heist.fountain");
    fs::read_to_string(script_path).expect("无法读取测试文件")
}

#[test]
fn test_sample_script_parsing() {
    let script = read_sample();
    let output = FountainParser::new().parse(&script);

    assert_eq!(output.title_value("title"), Some("The Long Night"));
    assert_eq!(output.title_value("Author"), Some("J. Doe"));

    let kinds: Vec<ParagraphKind> = output.paragraphs.iter().map(Paragraph::kind).collect();
    assert_eq!(
        kinds,
        vec![
            // 标题页的三项
            ParagraphKind::Action,
            ParagraphKind::Action,
            ParagraphKind::Action,
            ParagraphKind::SceneHeading,
            ParagraphKind::Action,
            ParagraphKind::Character,
            ParagraphKind::Parenthetical,
            ParagraphKind::Dialogue,
            ParagraphKind::DualDialogue,
            // 注释
            ParagraphKind::Action,
            ParagraphKind::Transition,
            ParagraphKind::SceneHeading,
            ParagraphKind::Action,
            // 居中文本
            ParagraphKind::Action,
        ]
    );

    // 场景编号从标题文本中剥离，单独保存
    assert_eq!(
        output.paragraphs[3],
        Paragraph::SceneHeading {
            text: "INT. BANK VAULT - NIGHT".to_string(),
            scene_number: Some("12".to_string()),
        }
    );
    assert!(output.elements.iter().any(|e| matches!(
        e,
        FountainElement::SceneHeading { scene_number: Some(n), .. } if n == "12"
    )));

    // 注释块中的场景标题不会出现
    assert!(!script.is_empty());
    assert!(output
        .paragraphs
        .iter()
        .all(|p| p.text().map_or(true, |t| !t.contains("PARKING LOT"))));

    match &output.paragraphs[8] {
        Paragraph::DualDialogue { left, right } => {
            assert_eq!(left[0].kind(), ParagraphKind::Character);
            assert_eq!(right.len(), 2);
        }
        other => panic!("应为双对白: {:?}", other),
    }
    assert_eq!(output.paragraphs[13].text(), Some("THE END"));
}

#[test]
fn test_parse_never_fails_and_keeps_line_order() {
    for input in ["", "\n\n\n", "   ", "@", "^", "((", "INT.", "~", "[[", "==="] {
        let _ = parse(input);
    }

    let paragraphs = parse("First thing.\n\nSecond thing.\n\nThird thing.");
    let texts: Vec<&str> = paragraphs.iter().filter_map(Paragraph::text).collect();
    assert_eq!(texts, vec!["First thing.", "Second thing.", "Third thing."]);
}

#[test]
fn test_crlf_and_tabs_are_normalized() {
    let paragraphs = parse("INT. HALL - DAY\r\n\r\n\tSteps echo.");
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(paragraphs[1].text(), Some("    Steps echo."));
}

#[test]
fn test_empty_slugline_defaults() {
    assert_eq!(make_slugline(None, None, None), "INT. LOCATION - DAY");
    assert_eq!(make_slugline(Some("EXT"), Some(""), Some("NIGHT")), "EXT. LOCATION - NIGHT");
}

#[test]
fn test_compiled_script_round_trips_authored_slugline() {
    let mut sp = Screenplay::new(1, "Round Trip");
    let mut scene = Scene::new(Heading::Int, "KITCHEN", DayPart::Day, "");
    scene.order = 1;
    scene.formatted_text = Some("INT. KITCHEN - DAY\n\nThe kettle screams.".to_string());
    sp.scenes.push(scene);

    let compiled = compile_fountain(&sp, &sp.scenes, &Conf::default());
    assert!(compiled.starts_with("Title: "));
    // 原文已带标题行，不能重复
    assert_eq!(compiled.matches("INT. KITCHEN - DAY").count(), 1);

    let paragraphs = parse(&compiled);
    let headings: Vec<&Paragraph> = paragraphs
        .iter()
        .filter(|p| p.kind() == ParagraphKind::SceneHeading)
        .collect();
    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0].text(), Some("INT. KITCHEN - DAY"));
}

#[test]
fn test_compile_orders_by_scene_order() {
    let mut sp = Screenplay::new(1, "");
    for (order, loc) in [(2, "SECOND"), (1, "FIRST"), (3, "THIRD")] {
        let mut scene = Scene::new(Heading::Ext, loc, DayPart::Night, "Something.");
        scene.order = order;
        sp.scenes.push(scene);
    }
    let compiled = compile_fountain(&sp, &sp.scenes, &Conf::default());
    assert!(compiled.starts_with("Title: Untitled Screenplay\nCredit: Written by\nAuthor: Author\n\n"));
    let first = compiled.find("FIRST").unwrap();
    let second = compiled.find("SECOND").unwrap();
    let third = compiled.find("THIRD").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_numbered_heading_reparses_to_same_text() {
    let numbered = numbered_heading("INT. LAB - NIGHT", 7);
    assert_eq!(numbered, "INT. LAB - NIGHT [#7]");
    let paragraphs = parse(&numbered);
    assert_eq!(paragraphs, vec![Paragraph::scene_heading("INT. LAB - NIGHT [#7]")]);
}

#[test]
fn test_long_runs_of_single_line_elements() {
    let paragraphs = parse(&"INT. ROOM - DAY\n".repeat(50_000));
    assert_eq!(paragraphs.len(), 50_000);
    assert!(paragraphs.iter().all(|p| p.kind() == ParagraphKind::SceneHeading));

    // 概要行降级为动作
    let paragraphs = parse(&"= note\n".repeat(200_000));
    assert_eq!(paragraphs.len(), 200_000);
    assert_eq!(paragraphs[199_999].text(), Some("note"));

    let mixed = "INT. ROOM - DAY\n===\n# Act\n".repeat(20_000) + "She waits.";
    let paragraphs = parse(&mixed);
    assert_eq!(paragraphs.last().and_then(Paragraph::text), Some("She waits."));
}
