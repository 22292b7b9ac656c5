/*!
 * AI 提案服务
 *
 * 提案只是候选内容，不会自动写入剧本；[`draft_scene`] 是唯一的例外，
 * 它把场景草稿写回存储，并返回与用户文本相同解析路径得到的段落。
 */

pub mod mock;

use std::fmt::Debug;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::{
    Character, Paragraph, Relationship, Scene, SceneStatus, Screenplay, ScreenplayId, Subplot, SubplotBeat,
    TurningPoint,
};
use crate::parser;
use crate::store::{ScreenplayStore, StoreError};

pub use mock::{MockBehavior, MockProposals};

/// 提案错误类型
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("提案服务不可用: {0}")]
    Unavailable(String),

    #[error("提案内容无效: {0}")]
    InvalidProposal(String),

    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
}

pub type ProposalResult<T> = Result<T, ProposalError>;

/// 处理稿的三个分段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentSection {
    Act1,
    Act2,
    Act3,
}

impl TreatmentSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentSection::Act1 => "act1",
            TreatmentSection::Act2 => "act2",
            TreatmentSection::Act3 => "act3",
        }
    }

    /// 剧本中该分段的现有文本
    pub fn current<'a>(&self, screenplay: &'a Screenplay) -> &'a str {
        match self {
            TreatmentSection::Act1 => &screenplay.treatment.act1,
            TreatmentSection::Act2 => &screenplay.treatment.act2,
            TreatmentSection::Act3 => &screenplay.treatment.act3,
        }
    }
}

/// 各阶段的提案接口，调用方决定是否采纳
#[async_trait]
pub trait ProposalService: Send + Sync + Debug {
    /// S1 故事梗概
    async fn propose_synopsis(&self, screenplay: &Screenplay, idea: Option<&str>) -> ProposalResult<String>;

    /// S2 处理稿的单个分段
    async fn propose_treatment_section(
        &self,
        screenplay: &Screenplay,
        section: TreatmentSection,
        pointers: &[String],
    ) -> ProposalResult<String>;

    /// S3 五个转折点
    async fn propose_turning_points(&self, screenplay: &Screenplay) -> ProposalResult<Vec<TurningPoint>>;

    /// S4 角色
    async fn propose_characters(&self, screenplay: &Screenplay) -> ProposalResult<Vec<Character>>;

    /// S4 关系，端点取自给定角色的 id
    async fn propose_relationships(&self, characters: &[Character]) -> ProposalResult<Vec<Relationship>>;

    /// S5 副线
    async fn propose_subplots(&self, screenplay: &Screenplay) -> ProposalResult<Vec<Subplot>>;

    /// S5 单条副线的节拍
    async fn propose_subplot_beats(&self, subplot: &Subplot) -> ProposalResult<Vec<SubplotBeat>>;

    /// S6 每个转折点一个关键场景
    async fn propose_key_scenes(&self, screenplay: &Screenplay) -> ProposalResult<Vec<Scene>>;

    /// S6 为单个转折点提议关键场景
    async fn propose_scene_for_turning_point(&self, turning_point: &TurningPoint) -> ProposalResult<Scene>;

    /// S7 非关键的过渡场景
    async fn propose_bridge_scenes(&self, screenplay: &Screenplay) -> ProposalResult<Vec<Scene>>;

    /// S8 单场的 Fountain 草稿
    async fn propose_scene_draft(&self, screenplay: &Screenplay, scene: &Scene) -> ProposalResult<String>;
}

/// 生成场景草稿并写回存储，返回草稿的解析结果
pub async fn draft_scene(
    store: &dyn ScreenplayStore,
    proposals: &dyn ProposalService,
    id: ScreenplayId,
    scene_id: u64,
) -> ProposalResult<Vec<Paragraph>> {
    let screenplay = store.get(id).await?;
    let mut scene = screenplay
        .scenes
        .iter()
        .find(|s| s.id == scene_id)
        .cloned()
        .ok_or(StoreError::EntityNotFound { kind: "scene", id: scene_id })?;

    let fountain = proposals.propose_scene_draft(&screenplay, &scene).await?;
    if fountain.trim().is_empty() {
        return Err(ProposalError::InvalidProposal(format!("场景 {} 的草稿为空", scene_id)));
    }
    let preview = parser::parse(&fountain);
    log::info!("场景 {} 草稿: {} 字符, {} 段", scene_id, fountain.len(), preview.len());

    scene.formatted_text = Some(fountain);
    scene.status = Some(SceneStatus::Drafted);
    store.update_scene(id, scene).await?;
    Ok(preview)
}
