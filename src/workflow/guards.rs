//! 阶段守卫：前进一步之前对剧本快照做的检查
//!
//! 守卫都是纯函数，阈值一律取闭区间（≥）。

use std::collections::HashSet;
use thiserror::Error;
use crate::models::{Archetype, Scene, Screenplay, StateId, StructuralRole, TurningPoint};
use crate::parser::{trimmed_len, trimmed_len_opt, word_count};

pub const MIN_SYNOPSIS_CHARS: usize = 40;
pub const MIN_ACT1_WORDS: usize = 60;
pub const MIN_ACT2_WORDS: usize = 80;
pub const MIN_ACT3_WORDS: usize = 60;
pub const MIN_TP_SUMMARY_CHARS: usize = 15;
pub const MIN_KEY_SYNOPSIS_CHARS: usize = 40;
pub const MIN_LOCATION_CHARS: usize = 3;
pub const MIN_SCENE_SYNOPSIS_CHARS: usize = 30;
pub const MIN_KEY_DRAFT_CHARS: usize = 60;
pub const MIN_DRAFT_CHARS: usize = 40;
pub const MIN_DRAFTED_RATIO: f64 = 0.6;

/// 守卫未通过，Display 即给用户的提示
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardFailure {
    #[error("Guard fails: ensure the synopsis has enough content (>= ~40 chars in mock).")]
    Synopsis,

    #[error("Guard fails: need minimum length per act (mock: A1≥60, A2≥80, A3≥60 words).")]
    Treatment,

    #[error("Guard fails: need 5 unique types, unique orders 1..5 and non-empty summaries (≥15 chars).")]
    TurningPoints,

    #[error("Guard fails: need PROTAGONIST + ANTAGONIST, archetypes including HERO and SHADOW, and at least one ALLY or MENTOR.")]
    Characters,

    #[error("Guard fails: need >=1 subplot with beats & characters; and at least one subplot linked to a Turning Point.")]
    Subplots,

    #[error("Guard fails: need coverage (≥1 key scene per TP) and synopsis ≥ 40 characters.")]
    KeyScenes,

    #[error("Guard fails: ensure contiguous numbering, meta filled (heading/location/time) and all key TPs covered with ≥30-char synopsis.")]
    AllScenes,

    #[error("Guard fails: key scenes need proper drafts (≥60 chars), and most scenes (≥60%) should have ≥40 chars.")]
    FormattedDraft,

    #[error("Cannot jump from {from} to {to}: only the next stage can be entered.")]
    Unreachable { from: StateId, to: StateId },
}

pub type GuardResult = Result<(), GuardFailure>;

fn check(ok: bool, failure: GuardFailure) -> GuardResult {
    if ok { Ok(()) } else { Err(failure) }
}

/// S1 → S2
pub fn synopsis_ready(sp: &Screenplay) -> GuardResult {
    check(trimmed_len(&sp.synopsis) >= MIN_SYNOPSIS_CHARS, GuardFailure::Synopsis)
}

/// S2 → S3
pub fn treatment_ready(sp: &Screenplay) -> GuardResult {
    let t = &sp.treatment;
    check(
        word_count(&t.act1) >= MIN_ACT1_WORDS
            && word_count(&t.act2) >= MIN_ACT2_WORDS
            && word_count(&t.act3) >= MIN_ACT3_WORDS,
        GuardFailure::Treatment,
    )
}

/// S3 → S4：恰好五个，类型互不相同，order 是 1..5 的排列
pub fn turning_points_ready(sp: &Screenplay) -> GuardResult {
    let tps = &sp.turning_points;
    let types: HashSet<_> = tps.iter().map(|t| t.tp_type).collect();
    let orders: HashSet<_> = tps.iter().map(|t| t.order).collect();
    let ok = tps.len() == 5
        && types.len() == 5
        && orders.len() == 5
        && tps.iter().all(|t| (1..=5).contains(&t.order))
        && tps.iter().all(|t| trimmed_len(&t.summary) >= MIN_TP_SUMMARY_CHARS);
    check(ok, GuardFailure::TurningPoints)
}

/// S4 → S5
pub fn characters_ready(sp: &Screenplay) -> GuardResult {
    let chars = &sp.characters;
    let has_role = |pred: fn(StructuralRole) -> bool| chars.iter().any(|c| pred(c.structural_role));
    let has_archetype = |pred: fn(Archetype) -> bool| {
        chars
            .iter()
            .flat_map(|c| c.archetype_timeline.iter())
            .any(|beat| pred(beat.archetype))
    };

    let ok = chars.len() >= 2
        && has_role(|r| r == StructuralRole::Protagonist)
        && has_role(|r| matches!(r, StructuralRole::Antagonist | StructuralRole::AntagonistLieutenant))
        && has_archetype(|a| a == Archetype::Hero)
        && has_archetype(|a| a == Archetype::Shadow)
        && has_archetype(|a| matches!(a, Archetype::Ally | Archetype::Mentor));
    check(ok, GuardFailure::Characters)
}

/// S5 → S6
pub fn subplots_ready(sp: &Screenplay) -> GuardResult {
    let subplots = &sp.subplots;
    // 没有转折点时不要求关联
    let linked = sp.turning_points.is_empty()
        || subplots.iter().any(|s| !s.linked_turning_points.is_empty());
    let ok = !subplots.is_empty()
        && subplots.iter().all(|s| !s.beats.is_empty())
        && subplots.iter().all(|s| !s.characters_involved.is_empty())
        && linked
        && subplots.iter().any(|s| s.subplot_type.is_impactful());
    check(ok, GuardFailure::Subplots)
}

/// 每个转折点都有关键场景覆盖；没有转折点时至少要有一个关键场景
fn turning_points_covered<'a>(tps: &[TurningPoint], key_scenes: impl Iterator<Item = &'a Scene>) -> bool {
    let covered: Vec<Option<u32>> = key_scenes.map(|s| s.linked_turning_point).collect();
    if tps.is_empty() {
        return !covered.is_empty();
    }
    tps.iter().all(|tp| covered.contains(&Some(tp.order)))
}

/// S6 → S7
pub fn key_scenes_ready(sp: &Screenplay) -> GuardResult {
    let ok = turning_points_covered(&sp.turning_points, sp.key_scenes())
        && sp
            .key_scenes()
            .all(|s| trimmed_len(&s.synopsis) >= MIN_KEY_SYNOPSIS_CHARS);
    check(ok, GuardFailure::KeyScenes)
}

/// S7 → S8
pub fn all_scenes_ready(sp: &Screenplay) -> GuardResult {
    let scenes = sp.sorted_scenes();
    if scenes.is_empty() {
        return Err(GuardFailure::AllScenes);
    }
    let contiguous = scenes.iter().enumerate().all(|(i, s)| s.order as usize == i + 1);
    let meta_filled = scenes.iter().all(|s| {
        s.heading.is_some()
            && trimmed_len_opt(s.location.as_deref()) >= MIN_LOCATION_CHARS
            && s.time_of_day.is_some()
            && trimmed_len(&s.synopsis) >= MIN_SCENE_SYNOPSIS_CHARS
    });
    let covered = turning_points_covered(&sp.turning_points, scenes.iter().filter(|s| s.is_key));
    check(contiguous && meta_filled && covered, GuardFailure::AllScenes)
}

fn draft_len(scene: &Scene) -> usize {
    trimmed_len_opt(scene.formatted_text.as_deref())
}

/// S8 → S9
pub fn draft_ready(sp: &Screenplay) -> GuardResult {
    let scenes = &sp.scenes;
    if scenes.is_empty() {
        return Err(GuardFailure::FormattedDraft);
    }
    let drafted = scenes.iter().filter(|s| draft_len(s) >= MIN_DRAFT_CHARS).count();
    let mut key_scenes = sp.key_scenes().peekable();
    let keys_ok = if key_scenes.peek().is_none() {
        drafted > 0
    } else {
        key_scenes.all(|s| draft_len(s) >= MIN_KEY_DRAFT_CHARS)
    };
    let ratio = drafted as f64 / scenes.len() as f64;
    check(keys_ok && ratio >= MIN_DRAFTED_RATIO, GuardFailure::FormattedDraft)
}

/// 进入 `target` 前需要通过的守卫；Init→S1 和 S9→S10 不设守卫
pub fn guard_for(target: StateId) -> Option<fn(&Screenplay) -> GuardResult> {
    match target {
        StateId::Init | StateId::Synopsis | StateId::Exports => None,
        StateId::Treatment => Some(synopsis_ready),
        StateId::TurningPoints => Some(treatment_ready),
        StateId::Characters => Some(turning_points_ready),
        StateId::Subplots => Some(characters_ready),
        StateId::KeyScenes => Some(subplots_ready),
        StateId::AllScenes => Some(key_scenes_ready),
        StateId::FormattedDraft => Some(all_scenes_ready),
        StateId::Review => Some(draft_ready),
    }
}
