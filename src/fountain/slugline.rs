use crate::models::Scene;

/// 生成场景标题行：`<HEADING>. <LOCATION> - <TIME>`
///
/// 缺省值分别为 INT、LOCATION（空白也算缺省）、DAY，全部转大写。
pub fn make_slugline(heading: Option<&str>, location: Option<&str>, time_of_day: Option<&str>) -> String {
    let heading = heading.unwrap_or("INT").to_uppercase();
    let location = match location {
        Some(l) if !l.trim().is_empty() => l.to_uppercase(),
        _ => "LOCATION".to_string(),
    };
    let time = time_of_day.unwrap_or("DAY").to_uppercase();
    format!("{}. {} - {}", heading, location, time)
}

/// 场景的标题行
pub fn scene_slugline(scene: &Scene) -> String {
    make_slugline(
        scene.heading_str(),
        scene.location.as_deref(),
        scene.time_of_day_str(),
    )
}
