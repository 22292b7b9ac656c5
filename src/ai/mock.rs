/*!
 * 确定性的提案服务，用于演示和测试
 *
 * - `MockProposals::working()` 总是返回固定模板
 * - `MockProposals::failing()` 总是返回错误
 * - `MockProposals::slow(ms)` 延迟后返回固定模板
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use crate::ai::{ProposalError, ProposalResult, ProposalService, TreatmentSection};
use crate::models::{
    Archetype, Character, DayPart, Heading, JourneyPhase, RelationKind, Relationship, Scene, Screenplay,
    StructuralRole, Subplot, SubplotBeat, SubplotType, TurningPoint, TurningPointType,
};

const BRIDGE_LOCATIONS: [&str; 6] = [
    "APARTMENT – KITCHEN",
    "CITY STREET",
    "COURTHOUSE HALL",
    "OFFICE",
    "ROOFTOP",
    "BAR",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    Working,
    Failing,
    Slow { delay_ms: u64 },
}

#[derive(Debug)]
pub struct MockProposals {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockProposals {
    pub fn new(behavior: MockBehavior) -> Self {
        MockProposals { behavior, calls: AtomicUsize::new(0) }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// 已处理的请求数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> ProposalResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::Failing => Err(ProposalError::Unavailable("mock provider failure".to_string())),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(())
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// 折叠连续空白
fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn timeline(pick: impl Fn(usize) -> Archetype) -> Vec<Archetype> {
    (0..JourneyPhase::ALL.len()).map(pick).collect()
}

fn character(
    name: &str,
    role: StructuralRole,
    goal: &str,
    need: &str,
    flaw: &str,
    arc: &str,
    tags: &[&str],
    archetypes: Vec<Archetype>,
) -> Character {
    let mut c = Character::new(name, role).with_timeline(&archetypes);
    c.goal = Some(goal.to_string());
    c.need = Some(need.to_string());
    c.flaw = Some(flaw.to_string());
    c.arc_summary = Some(arc.to_string());
    c.tags = tags.iter().map(|t| t.to_string()).collect();
    c
}

fn beat(order: u32, summary: &str, out_change: &str) -> SubplotBeat {
    SubplotBeat {
        order,
        summary: summary.to_string(),
        out_change: Some(out_change.to_string()),
    }
}

fn scene_with_beats(mut scene: Scene, title: String, goal: &str, conflict: &str, outcome: &str) -> Scene {
    scene.title = title;
    scene.goal = Some(goal.to_string());
    scene.conflict = Some(conflict.to_string());
    scene.outcome = Some(outcome.to_string());
    scene
}

#[async_trait]
impl ProposalService for MockProposals {
    async fn propose_synopsis(&self, screenplay: &Screenplay, idea: Option<&str>) -> ProposalResult<String> {
        self.begin().await?;
        let seed = truncate(idea.unwrap_or("A character faces a life-changing decision"), 160);
        let genre = screenplay.genre.as_deref().map(|g| format!(" ({})", g)).unwrap_or_default();
        let tone = screenplay.tone.as_deref().map(|t| format!(" with a {} tone", t)).unwrap_or_default();
        Ok(format!(
            "A concise synopsis{}{}: {}. When pressure mounts, their relationships fracture, forcing a risky plan \
             that backfires. In the end, the protagonist must sacrifice a part of themselves to earn a second chance.",
            genre, tone, seed
        ))
    }

    async fn propose_treatment_section(
        &self,
        _screenplay: &Screenplay,
        section: TreatmentSection,
        pointers: &[String],
    ) -> ProposalResult<String> {
        self.begin().await?;
        let mut lines = vec![
            format!("Treatment {} draft:", section.as_str().to_uppercase()),
            "- Setup protagonist under pressure.".to_string(),
        ];
        lines.extend(
            pointers
                .iter()
                .take(5)
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(|p| format!("- {}", p)),
        );
        lines.push("- Escalate stakes and force a hard choice.".to_string());
        lines.push("- End with a turning beat that propels the next act.".to_string());
        Ok(lines.join("\n"))
    }

    async fn propose_turning_points(&self, screenplay: &Screenplay) -> ProposalResult<Vec<TurningPoint>> {
        self.begin().await?;
        let t = &screenplay.treatment;
        let (a1, a2, a3) = (truncate(&t.act1, 80), truncate(&t.act2, 80), truncate(&t.act3, 80));
        let items = [
            (TurningPointType::IncitingIncident, "A disruptive event pushes the hero out of normalcy.", &a1),
            (TurningPointType::PlotPoint1, "Door closes behind the hero; no turning back.", &a1),
            (TurningPointType::Midpoint, "False victory/defeat that raises the stakes.", &a2),
            (TurningPointType::PlotPoint2, "All seems lost; hero reframes the goal.", &a2),
            (TurningPointType::Climax, "Final confrontation resolves the central conflict.", &a3),
        ];
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, (tp_type, summary, hint))| {
                TurningPoint::new(*tp_type, i as u32 + 1, format!("{} Hint: {}", summary, hint))
            })
            .collect())
    }

    async fn propose_characters(&self, _screenplay: &Screenplay) -> ProposalResult<Vec<Character>> {
        self.begin().await?;
        Ok(vec![
            character(
                "Alex",
                StructuralRole::Protagonist,
                "Win back custody of their child",
                "Accept vulnerability and ask for help",
                "Pride and control",
                "From control to trust",
                &["parent", "engineer"],
                timeline(|i| if i == 1 { Archetype::Hero } else { Archetype::Ally }),
            ),
            character(
                "Mara",
                StructuralRole::Antagonist,
                "Secure a promotion by exposing Alex",
                "Find integrity",
                "Manipulative",
                "Power at any cost",
                &["lawyer"],
                timeline(|i| if i == 2 { Archetype::Shadow } else { Archetype::Trickster }),
            ),
            character(
                "Diego",
                StructuralRole::Supporting,
                "Keep the team together",
                "Set boundaries",
                "Avoidant",
                "Learns to confront",
                &["friend"],
                timeline(|i| if i == 0 { Archetype::Mentor } else { Archetype::Ally }),
            ),
        ])
    }

    /// 前三个角色依次视为主角、反派、配角；不足三个时不提议
    async fn propose_relationships(&self, characters: &[Character]) -> ProposalResult<Vec<Relationship>> {
        self.begin().await?;
        let [hero, villain, friend] = match characters {
            [a, b, c, ..] => [a.id, b.id, c.id],
            _ => return Ok(Vec::new()),
        };
        let rel = |a, b, kind, strength, trust| {
            let mut r = Relationship::new(a, b, kind);
            r.strength = Some(strength);
            r.trust = Some(trust);
            r.secrecy = Some(0.0);
            r
        };
        Ok(vec![
            rel(hero, villain, RelationKind::NemesisOf, 0.9, 0.1),
            rel(friend, hero, RelationKind::MentorOf, 0.7, 0.8),
            rel(hero, friend, RelationKind::AllyOf, 0.8, 0.85),
        ])
    }

    async fn propose_subplots(&self, screenplay: &Screenplay) -> ProposalResult<Vec<Subplot>> {
        self.begin().await?;
        let ids: Vec<u64> = screenplay.characters.iter().map(|c| c.id).collect();

        let mut relationship = Subplot::new("B-Story: Alex & Diego", SubplotType::Relationship);
        relationship.purpose =
            "Carry the theme of trust; provide emotional stakes and midpoints support.".to_string();
        relationship.dominant_acts = JourneyPhase::ALL.to_vec();
        relationship.characters_involved = ids.iter().copied().step_by(2).take(2).collect();
        relationship.linked_turning_points = vec![1, 3, 5];
        relationship.beats = vec![
            beat(1, "Diego challenges Alex to open up.", "Alex agrees to try."),
            beat(2, "They clash over risk-taking during the investigation.", "Trust is damaged."),
            beat(3, "Reconciliation catalyzes Alex's final choice.", "Trust restored; Alex commits."),
        ];

        let mut antagonist = Subplot::new("Antagonist POV: Mara", SubplotType::AntagonistPov);
        antagonist.purpose = "Escalate external pressure and clarify stakes.".to_string();
        antagonist.dominant_acts = vec![JourneyPhase::ActII];
        antagonist.characters_involved = ids.get(1).copied().into_iter().collect();
        antagonist.linked_turning_points = vec![4];
        antagonist.beats = vec![
            beat(1, "Mara secures surveillance on Alex.", "Stakes rise."),
            beat(2, "Mara learns a personal weakness.", "Targets Alex's flaw."),
        ];

        Ok(vec![relationship, antagonist])
    }

    async fn propose_subplot_beats(&self, _subplot: &Subplot) -> ProposalResult<Vec<SubplotBeat>> {
        self.begin().await?;
        Ok(vec![
            beat(1, "Setup the tension inside the subplot.", "Goal clarified."),
            beat(2, "Complication forces a compromise.", "Stakes increase."),
            beat(3, "Reversal ties back to a Turning Point.", "Path redefined."),
        ])
    }

    async fn propose_key_scenes(&self, screenplay: &Screenplay) -> ProposalResult<Vec<Scene>> {
        self.begin().await?;
        let cast: Vec<u64> = screenplay.characters.iter().take(2).map(|c| c.id).collect();
        Ok(screenplay
            .turning_points
            .iter()
            .map(|tp| {
                let heading = if tp.order <= 2 { Heading::Int } else { Heading::Ext };
                let location = if tp.order <= 3 { "APARTMENT – LIVING ROOM" } else { "CITY STREET" };
                let time = if tp.order % 2 == 1 { DayPart::Night } else { DayPart::Day };
                let synopsis = format!("A scene that expresses: {}...", truncate(&tp.summary, 90));
                let mut scene = scene_with_beats(
                    Scene::new(heading, location, time, synopsis).key_for(tp.order),
                    format!("Key scene for {}", tp.tp_type.as_str()),
                    "Advance the plot toward/away from the TP.",
                    "Opposition pushes back; cost is introduced.",
                    "Change of state aligning with the TP beat.",
                );
                scene.characters = cast.clone();
                scene
            })
            .collect())
    }

    async fn propose_scene_for_turning_point(&self, turning_point: &TurningPoint) -> ProposalResult<Scene> {
        self.begin().await?;
        let heading = if turning_point.order <= 2 { Heading::Int } else { Heading::Ext };
        let synopsis = format!(
            "A focused confrontation reflecting: {}...",
            truncate(&turning_point.summary, 90)
        );
        Ok(scene_with_beats(
            Scene::new(heading, "WAREHOUSE", DayPart::Night, synopsis).key_for(turning_point.order),
            format!("Key scene TP#{}", turning_point.order),
            "Force the hero to commit.",
            "Antagonistic pressure escalates.",
            "Irreversible shift toward the next act.",
        ))
    }

    async fn propose_bridge_scenes(&self, _screenplay: &Screenplay) -> ProposalResult<Vec<Scene>> {
        self.begin().await?;
        Ok(BRIDGE_LOCATIONS
            .iter()
            .enumerate()
            .map(|(i, location)| {
                let odd = i % 2 == 1;
                scene_with_beats(
                    Scene::new(
                        if odd { Heading::Ext } else { Heading::Int },
                        *location,
                        if odd { DayPart::Day } else { DayPart::Night },
                        "A connective beat that escalates pressure and delivers a reveal tying subplots to the main goal.",
                    ),
                    format!("Bridge {}", i + 1),
                    "Advance toward the next key beat.",
                    "Obstacle complicates resources or relationships.",
                    "New information or cost changes the approach.",
                )
            })
            .collect())
    }

    async fn propose_scene_draft(&self, screenplay: &Screenplay, scene: &Scene) -> ProposalResult<String> {
        self.begin().await?;
        let slug = format!(
            "{}. {} - {}",
            scene.heading_str().unwrap_or("INT"),
            scene.location.as_deref().filter(|l| !l.trim().is_empty()).unwrap_or("LOCATION"),
            scene.time_of_day_str().unwrap_or("DAY"),
        );
        let names: Vec<String> = scene
            .characters
            .iter()
            .filter_map(|id| screenplay.characters.iter().find(|c| c.id == *id))
            .map(|c| c.name.to_uppercase())
            .collect();
        let (who_a, who_b) = match names.as_slice() {
            [] => ("ALEX".to_string(), "DIEGO".to_string()),
            [a] => (a.clone(), "OTHER".to_string()),
            [a, b, ..] => (a.clone(), b.clone()),
        };
        let field = |v: &Option<String>, fallback: &str| squash(v.as_deref().unwrap_or(fallback));

        Ok(format!(
            "{slug}\n\n{synopsis}\n\n> GOAL: {goal}\n> CONFLICT: {conflict}\n> OUTCOME: {outcome}\n\n\
             {who_a}\nWe can't keep doing this the old way. It will break us.\n\n\
             {who_b}\nThen change it. Prove it costs you something.\n\n\
             Action line pushing into the next beat.\n",
            slug = slug,
            synopsis = squash(&scene.synopsis),
            goal = field(&scene.goal, "Advance toward objective."),
            conflict = field(&scene.conflict, "Opposition escalates."),
            outcome = field(&scene.outcome, "State changes."),
            who_a = who_a,
            who_b = who_b,
        ))
    }
}
