//! 剧本文档存储
//!
//! 实现只需提供 `load` / `save` / `next_id` / `ids` 四个原语，
//! 增删改和场景排序都在 trait 的默认方法里完成。读-改-写之间不加锁，
//! 并发写入以最后一次为准。

pub mod memory;
pub mod json_file;

use std::fmt::Debug;
use async_trait::async_trait;
use thiserror::Error;
use crate::models::{
    Character, MoveDirection, Relationship, Scene, Screenplay, ScreenplayId, ScreenplayPatch, Subplot,
};

pub use memory::MemoryStore;
pub use json_file::JsonFileStore;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("剧本不存在: {0}")]
    NotFound(ScreenplayId),

    #[error("{kind} 不存在: {id}")]
    EntityNotFound { kind: &'static str, id: u64 },

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn entity_not_found(kind: &'static str, id: u64) -> StoreError {
    StoreError::EntityNotFound { kind, id }
}

#[async_trait]
pub trait ScreenplayStore: Send + Sync + Debug {
    /// 读取剧本快照
    async fn load(&self, id: ScreenplayId) -> StoreResult<Screenplay>;

    /// 整体写回剧本
    async fn save(&self, screenplay: &Screenplay) -> StoreResult<()>;

    /// 分配新的 id（剧本和子实体共用）
    async fn next_id(&self) -> StoreResult<u64>;

    /// 所有剧本 id，升序
    async fn ids(&self) -> StoreResult<Vec<ScreenplayId>>;

    async fn create(&self, title: &str) -> StoreResult<Screenplay> {
        let screenplay = Screenplay::new(self.next_id().await?, title);
        self.save(&screenplay).await?;
        log::info!("创建剧本 {} ({})", screenplay.id, screenplay.title);
        Ok(screenplay)
    }

    async fn get(&self, id: ScreenplayId) -> StoreResult<Screenplay> {
        self.load(id).await
    }

    /// 浅合并补丁并更新时间戳
    async fn update(&self, id: ScreenplayId, patch: ScreenplayPatch) -> StoreResult<Screenplay> {
        let mut screenplay = self.load(id).await?;
        screenplay.apply_patch(patch);
        self.save(&screenplay).await?;
        Ok(screenplay)
    }

    // 角色

    async fn add_character(&self, id: ScreenplayId, mut character: Character) -> StoreResult<Character> {
        let mut screenplay = self.load(id).await?;
        character.id = self.next_id().await?;
        screenplay.characters.push(character.clone());
        screenplay.touch();
        self.save(&screenplay).await?;
        Ok(character)
    }

    async fn update_character(&self, id: ScreenplayId, character: Character) -> StoreResult<Character> {
        let mut screenplay = self.load(id).await?;
        let slot = screenplay
            .characters
            .iter_mut()
            .find(|c| c.id == character.id)
            .ok_or_else(|| entity_not_found("character", character.id))?;
        *slot = character.clone();
        screenplay.touch();
        self.save(&screenplay).await?;
        Ok(character)
    }

    /// 删除角色，并级联删除关系和副线成员
    async fn remove_character(&self, id: ScreenplayId, character_id: u64) -> StoreResult<()> {
        let mut screenplay = self.load(id).await?;
        if !screenplay.remove_character(character_id) {
            return Err(entity_not_found("character", character_id));
        }
        self.save(&screenplay).await
    }

    // 关系

    async fn add_relationship(&self, id: ScreenplayId, relationship: Relationship) -> StoreResult<Relationship> {
        let mut screenplay = self.load(id).await?;
        let mut relationship = relationship.clamped();
        relationship.id = self.next_id().await?;
        screenplay.relationships.push(relationship.clone());
        screenplay.touch();
        self.save(&screenplay).await?;
        Ok(relationship)
    }

    async fn update_relationship(&self, id: ScreenplayId, relationship: Relationship) -> StoreResult<Relationship> {
        let mut screenplay = self.load(id).await?;
        let relationship = relationship.clamped();
        let slot = screenplay
            .relationships
            .iter_mut()
            .find(|r| r.id == relationship.id)
            .ok_or_else(|| entity_not_found("relationship", relationship.id))?;
        *slot = relationship.clone();
        screenplay.touch();
        self.save(&screenplay).await?;
        Ok(relationship)
    }

    async fn remove_relationship(&self, id: ScreenplayId, relationship_id: u64) -> StoreResult<()> {
        let mut screenplay = self.load(id).await?;
        let before = screenplay.relationships.len();
        screenplay.relationships.retain(|r| r.id != relationship_id);
        if screenplay.relationships.len() == before {
            return Err(entity_not_found("relationship", relationship_id));
        }
        screenplay.touch();
        self.save(&screenplay).await
    }

    // 副线

    async fn add_subplot(&self, id: ScreenplayId, mut subplot: Subplot) -> StoreResult<Subplot> {
        let mut screenplay = self.load(id).await?;
        subplot.id = self.next_id().await?;
        screenplay.subplots.push(subplot.clone());
        screenplay.touch();
        self.save(&screenplay).await?;
        Ok(subplot)
    }

    async fn update_subplot(&self, id: ScreenplayId, subplot: Subplot) -> StoreResult<Subplot> {
        let mut screenplay = self.load(id).await?;
        let slot = screenplay
            .subplots
            .iter_mut()
            .find(|s| s.id == subplot.id)
            .ok_or_else(|| entity_not_found("subplot", subplot.id))?;
        *slot = subplot.clone();
        screenplay.touch();
        self.save(&screenplay).await?;
        Ok(subplot)
    }

    async fn remove_subplot(&self, id: ScreenplayId, subplot_id: u64) -> StoreResult<()> {
        let mut screenplay = self.load(id).await?;
        let before = screenplay.subplots.len();
        screenplay.subplots.retain(|s| s.id != subplot_id);
        if screenplay.subplots.len() == before {
            return Err(entity_not_found("subplot", subplot_id));
        }
        screenplay.touch();
        self.save(&screenplay).await
    }

    // 场景

    /// 追加到末尾，order = 现有数量 + 1
    async fn add_scene(&self, id: ScreenplayId, mut scene: Scene) -> StoreResult<Scene> {
        let mut screenplay = self.load(id).await?;
        scene.id = self.next_id().await?;
        let scene = screenplay.push_scene(scene);
        self.save(&screenplay).await?;
        Ok(scene)
    }

    /// 更新场景内容，order 保持不变
    async fn update_scene(&self, id: ScreenplayId, scene: Scene) -> StoreResult<Scene> {
        let mut screenplay = self.load(id).await?;
        let slot = screenplay
            .scenes
            .iter_mut()
            .find(|s| s.id == scene.id)
            .ok_or_else(|| entity_not_found("scene", scene.id))?;
        let order = slot.order;
        *slot = Scene { order, ..scene };
        let updated = slot.clone();
        screenplay.touch();
        self.save(&screenplay).await?;
        Ok(updated)
    }

    /// 删除场景并重新编号
    async fn remove_scene(&self, id: ScreenplayId, scene_id: u64) -> StoreResult<()> {
        let mut screenplay = self.load(id).await?;
        if !screenplay.remove_scene(scene_id) {
            return Err(entity_not_found("scene", scene_id));
        }
        self.save(&screenplay).await
    }

    async fn reorder_scenes(&self, id: ScreenplayId, ordered_ids: &[u64]) -> StoreResult<Vec<Scene>> {
        let mut screenplay = self.load(id).await?;
        let scenes = screenplay.reorder_scenes(ordered_ids);
        self.save(&screenplay).await?;
        Ok(scenes)
    }

    /// 与相邻场景交换；越界或 id 不存在时原样返回
    async fn move_scene(&self, id: ScreenplayId, scene_id: u64, direction: MoveDirection) -> StoreResult<Vec<Scene>> {
        let mut screenplay = self.load(id).await?;
        let before = screenplay.sorted_scenes();
        let scenes = screenplay.move_scene(scene_id, direction);
        if scenes != before {
            self.save(&screenplay).await?;
        }
        Ok(scenes)
    }
}
