//! Markdown 导出：节拍表和角色小传

use crate::models::{Screenplay, TurningPoint};

fn heading(kind: &str, screenplay: &Screenplay) -> String {
    let title = screenplay.title.as_str();
    format!("# {} — {}", kind, if title.is_empty() { "Untitled" } else { title })
}

fn or_dash(v: Option<&str>) -> &str {
    v.filter(|s| !s.trim().is_empty()).unwrap_or("-")
}

/// 转折点按 order 排列，每个占一段
pub fn beat_sheet(screenplay: &Screenplay) -> String {
    let mut tps: Vec<&TurningPoint> = screenplay.turning_points.iter().collect();
    tps.sort_by_key(|tp| tp.order);

    let mut lines = vec![heading("Beat Sheet", screenplay), String::new()];
    lines.extend(
        tps.iter()
            .map(|tp| format!("TP#{} — {}\n{}\n", tp.order, tp.tp_type.as_str(), tp.summary)),
    );
    lines.join("\n")
}

/// 每个角色一节，缺失字段写 -
pub fn character_bios(screenplay: &Screenplay) -> String {
    let mut lines = vec![heading("Character Bios", screenplay), String::new()];
    lines.extend(screenplay.characters.iter().map(|c| {
        format!(
            "## {}\nRole: {}\nMotivation: {}\nNeed: {}\nFlaw: {}\n",
            c.name,
            c.structural_role.as_str(),
            or_dash(c.goal.as_deref()),
            or_dash(c.need.as_deref()),
            or_dash(c.flaw.as_deref()),
        )
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Character, StructuralRole, TurningPointType};

    #[test]
    fn beat_sheet_sorted_by_order() {
        let mut sp = Screenplay::new(1, "Heist");
        sp.turning_points = vec![
            TurningPoint::new(TurningPointType::Midpoint, 3, "Vault opens."),
            TurningPoint::new(TurningPointType::IncitingIncident, 1, "Job offered."),
        ];
        assert_eq!(
            beat_sheet(&sp),
            "# Beat Sheet — Heist\n\nTP#1 — INCITING_INCIDENT\nJob offered.\n\nTP#3 — MIDPOINT\nVault opens.\n"
        );
    }

    #[test]
    fn bios_fill_missing_fields() {
        let mut sp = Screenplay::new(1, "");
        let mut alex = Character::new("Alex", StructuralRole::Protagonist);
        alex.goal = Some("Get out clean".to_string());
        sp.characters.push(alex);
        let md = character_bios(&sp);
        assert!(md.starts_with("# Character Bios — Untitled\n\n## Alex\n"));
        assert!(md.contains("Role: PROTAGONIST\nMotivation: Get out clean\nNeed: -\nFlaw: -\n"));
    }
}
