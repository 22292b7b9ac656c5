use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::models::characters::{Character, Relationship};
use crate::models::scene::Scene;
use crate::models::state::StateId;
use crate::models::subplot::Subplot;
use crate::models::turning_point::TurningPoint;

pub type ScreenplayId = u64;

/// 三幕处理稿
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(default)]
    pub act1: String,
    #[serde(default)]
    pub act2: String,
    #[serde(default)]
    pub act3: String,
}

/// 场景移动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveDirection {
    Up,
    Down,
}

/// 剧本聚合根
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenplay {
    pub id: ScreenplayId,
    #[serde(default)]
    pub project_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,

    // S1–S7 的产物
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub treatment: Treatment,
    #[serde(default)]
    pub turning_points: Vec<TurningPoint>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub subplots: Vec<Subplot>,
    #[serde(default)]
    pub scenes: Vec<Scene>,

    /// 与 current_state 保持一致
    #[serde(default)]
    pub status: StateId,
    #[serde(default)]
    pub current_state: StateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_guide_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 浅合并补丁：只覆盖提供了的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenplayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<Treatment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turning_points: Option<Vec<TurningPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<Character>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subplots: Option<Vec<Subplot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<Scene>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_state: Option<StateId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_guide_id: Option<u64>,
}

impl ScreenplayPatch {
    /// 切换阶段的补丁，status 跟随 current_state
    pub fn stage(state: StateId) -> Self {
        ScreenplayPatch {
            status: Some(state),
            current_state: Some(state),
            ..Default::default()
        }
    }
}

impl Screenplay {
    pub fn new(id: ScreenplayId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Screenplay {
            id,
            project_id: 0,
            title: title.into(),
            logline: None,
            genre: None,
            tone: None,
            synopsis: String::new(),
            treatment: Treatment::default(),
            turning_points: Vec::new(),
            characters: Vec::new(),
            relationships: Vec::new(),
            subplots: Vec::new(),
            scenes: Vec::new(),
            status: StateId::Synopsis,
            current_state: StateId::Synopsis,
            style_guide_id: None,
            created_at: now,
            updated_at: Some(now),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// 浅合并补丁并打上更新时间戳
    pub fn apply_patch(&mut self, patch: ScreenplayPatch) {
        if let Some(v) = patch.title { self.title = v; }
        if let Some(v) = patch.logline { self.logline = Some(v); }
        if let Some(v) = patch.genre { self.genre = Some(v); }
        if let Some(v) = patch.tone { self.tone = Some(v); }
        if let Some(v) = patch.synopsis { self.synopsis = v; }
        if let Some(v) = patch.treatment { self.treatment = v; }
        if let Some(v) = patch.turning_points { self.turning_points = v; }
        if let Some(v) = patch.characters { self.characters = v; }
        if let Some(v) = patch.relationships { self.relationships = v; }
        if let Some(v) = patch.subplots { self.subplots = v; }
        if let Some(v) = patch.scenes { self.scenes = v; }
        if let Some(v) = patch.status { self.status = v; }
        if let Some(v) = patch.current_state { self.current_state = v; }
        if let Some(v) = patch.style_guide_id { self.style_guide_id = Some(v); }
        self.touch();
    }

    /// 按 order 排序后的场景
    pub fn sorted_scenes(&self) -> Vec<Scene> {
        crate::models::scene::sorted_by_order(&self.scenes)
    }

    pub fn key_scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter().filter(|s| s.is_key)
    }

    /// 追加场景，order 取当前数量 + 1
    pub fn push_scene(&mut self, mut scene: Scene) -> Scene {
        scene.order = self.scenes.len() as u32 + 1;
        self.scenes.push(scene.clone());
        self.touch();
        scene
    }

    /// 删除场景并把剩余场景重新编号为 1..N
    pub fn remove_scene(&mut self, scene_id: u64) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| s.id != scene_id);
        if self.scenes.len() == before {
            return false;
        }
        self.renumber_scenes();
        self.touch();
        true
    }

    /// 按给定 id 序列重新排序；未列出的场景以原 order 参与排序
    pub fn reorder_scenes(&mut self, ordered_ids: &[u64]) -> Vec<Scene> {
        let position = |scene: &Scene| -> u32 {
            ordered_ids
                .iter()
                .position(|id| *id == scene.id)
                .map(|idx| idx as u32 + 1)
                .unwrap_or(scene.order)
        };
        let mut scenes = std::mem::take(&mut self.scenes);
        scenes.sort_by_key(|s| position(s));
        self.scenes = scenes;
        self.renumber_scenes();
        self.touch();
        self.scenes.clone()
    }

    /// 与相邻场景交换位置；越界或找不到时原样返回
    pub fn move_scene(&mut self, scene_id: u64, direction: MoveDirection) -> Vec<Scene> {
        let mut scenes = self.sorted_scenes();
        let Some(idx) = scenes.iter().position(|s| s.id == scene_id) else {
            return scenes;
        };
        let swap_with = match direction {
            MoveDirection::Up if idx > 0 => idx - 1,
            MoveDirection::Down if idx + 1 < scenes.len() => idx + 1,
            _ => return scenes,
        };
        scenes.swap(idx, swap_with);
        self.scenes = scenes;
        self.renumber_scenes();
        self.touch();
        self.scenes.clone()
    }

    /// 删除角色，同时清理相关的关系和副线成员
    pub fn remove_character(&mut self, character_id: u64) -> bool {
        let before = self.characters.len();
        self.characters.retain(|c| c.id != character_id);
        if self.characters.len() == before {
            return false;
        }
        self.relationships
            .retain(|r| r.a_id != character_id && r.b_id != character_id);
        for subplot in &mut self.subplots {
            subplot.characters_involved.retain(|id| *id != character_id);
        }
        self.touch();
        true
    }

    /// 剧本及其所有子实体中最大的 id
    pub fn max_entity_id(&self) -> u64 {
        std::iter::once(self.id)
            .chain(self.turning_points.iter().map(|t| t.id))
            .chain(self.characters.iter().map(|c| c.id))
            .chain(self.relationships.iter().map(|r| r.id))
            .chain(self.subplots.iter().map(|s| s.id))
            .chain(self.scenes.iter().map(|s| s.id))
            .max()
            .unwrap_or(0)
    }

    fn renumber_scenes(&mut self) {
        self.scenes.sort_by_key(|s| s.order);
        for (i, scene) in self.scenes.iter_mut().enumerate() {
            scene.order = i as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scene::{DayPart, Heading};

    fn scene(id: u64, synopsis: &str) -> Scene {
        let mut s = Scene::new(Heading::Int, "KITCHEN", DayPart::Day, synopsis);
        s.id = id;
        s
    }

    fn with_three_scenes() -> Screenplay {
        let mut sp = Screenplay::new(1, "Test");
        sp.push_scene(scene(10, "first"));
        sp.push_scene(scene(20, "second"));
        sp.push_scene(scene(30, "third"));
        sp
    }

    fn orders(sp: &Screenplay) -> Vec<(u64, u32)> {
        sp.sorted_scenes().iter().map(|s| (s.id, s.order)).collect()
    }

    #[test]
    fn move_up_swaps_neighbours() {
        let mut sp = with_three_scenes();
        sp.move_scene(20, MoveDirection::Up);
        assert_eq!(orders(&sp), vec![(20, 1), (10, 2), (30, 3)]);
    }

    #[test]
    fn move_at_boundary_is_noop() {
        let mut sp = with_three_scenes();
        let scenes = sp.move_scene(10, MoveDirection::Up);
        assert_eq!(scenes.len(), 3);
        assert_eq!(orders(&sp), vec![(10, 1), (20, 2), (30, 3)]);
        sp.move_scene(99, MoveDirection::Down);
        assert_eq!(orders(&sp), vec![(10, 1), (20, 2), (30, 3)]);
    }

    #[test]
    fn remove_renumbers_contiguously() {
        let mut sp = with_three_scenes();
        assert!(sp.remove_scene(20));
        assert_eq!(orders(&sp), vec![(10, 1), (30, 2)]);
        assert!(!sp.remove_scene(20));
    }

    #[test]
    fn reorder_follows_given_ids() {
        let mut sp = with_three_scenes();
        sp.reorder_scenes(&[30, 10, 20]);
        assert_eq!(orders(&sp), vec![(30, 1), (10, 2), (20, 3)]);
    }

    #[test]
    fn patch_merges_only_given_fields() {
        let mut sp = Screenplay::new(1, "Old");
        sp.synopsis = "kept".to_string();
        sp.apply_patch(ScreenplayPatch {
            title: Some("New".to_string()),
            ..Default::default()
        });
        assert_eq!(sp.title, "New");
        assert_eq!(sp.synopsis, "kept");

        sp.apply_patch(ScreenplayPatch::stage(StateId::Treatment));
        assert_eq!(sp.current_state, StateId::Treatment);
        assert_eq!(sp.status, StateId::Treatment);
    }
}
