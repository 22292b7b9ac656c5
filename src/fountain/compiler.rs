use crate::fountain::slugline::scene_slugline;
use crate::models::scene::sorted_by_order;
use crate::models::{Conf, Scene, Screenplay};

/// 标题页头部：Title / Credit / Author 后接一个空行
pub fn title_header(screenplay: &Screenplay, conf: &Conf) -> String {
    format!(
        "Title: {}\nCredit: {}\nAuthor: {}\n\n",
        conf.display_title(&screenplay.title),
        conf.credit,
        conf.author
    )
}

/// 把剧本编译成 Fountain 文本，场景按 order 升序
pub fn compile_fountain(screenplay: &Screenplay, scenes: &[Scene], conf: &Conf) -> String {
    let body = sorted_by_order(scenes)
        .iter()
        .map(scene_block)
        .collect::<Vec<_>>()
        .join("\n");
    let output = title_header(screenplay, conf) + &body;
    log::debug!("Fountain 编译完成: {} 个场景, {} 字节", scenes.len(), output.len());
    output
}

// 单个场景的文本块，以换行结尾
fn scene_block(scene: &Scene) -> String {
    let slug = scene_slugline(scene);
    if let Some(authored) = scene.authored_text() {
        let text = authored.trim();
        let prefix = format!("{}.", scene.heading_str().unwrap_or("INT"));
        // 已经自带标题行的原文照搬
        if text.to_uppercase().starts_with(&prefix) {
            return format!("{}\n", text);
        }
        return format!("{}\n\n{}\n", slug, text);
    }

    let mut lines = vec![slug, String::new()];
    let synopsis = scene.synopsis.trim();
    if !synopsis.is_empty() {
        lines.push(synopsis.to_string());
    }
    let beats = [
        ("GOAL", &scene.goal),
        ("CONFLICT", &scene.conflict),
        ("OUTCOME", &scene.outcome),
    ];
    for (label, value) in beats {
        if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            lines.push(format!("> {}: {}", label, v.trim()));
        }
    }
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayPart, Heading};

    #[test]
    fn skeleton_lists_beats_with_content() {
        let mut scene = Scene::new(Heading::Ext, "dock", DayPart::Night, "They meet.");
        scene.goal = Some("Get the key".to_string());
        scene.conflict = Some("  ".to_string());
        assert_eq!(
            scene_block(&scene),
            "EXT. DOCK - NIGHT\n\nThey meet.\n> GOAL: Get the key\n"
        );
    }

    #[test]
    fn authored_text_without_slug_gets_one() {
        let mut scene = Scene::new(Heading::Int, "office", DayPart::Day, "");
        scene.formatted_text = Some("Mara types.\n".to_string());
        assert_eq!(scene_block(&scene), "INT. OFFICE - DAY\n\nMara types.\n");
    }
}
