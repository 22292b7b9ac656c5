use std::sync::Arc;
use serde::Serialize;
use crate::models::{ScreenplayId, ScreenplayPatch, StateId};
use crate::store::{ScreenplayStore, StoreResult};
use crate::workflow::guards::{guard_for, GuardFailure};

/// 可以停留、回退或者前进一步
pub fn can_enter(current: StateId, target: StateId) -> bool {
    target.index() <= current.index() + 1
}

/// 一次阶段切换请求的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Entered(StateId),
    Rejected(GuardFailure),
}

impl TransitionOutcome {
    pub fn is_entered(&self) -> bool {
        matches!(self, TransitionOutcome::Entered(_))
    }

    /// 拒绝时的提示
    pub fn hint(&self) -> Option<String> {
        match self {
            TransitionOutcome::Entered(_) => None,
            TransitionOutcome::Rejected(failure) => Some(failure.to_string()),
        }
    }
}

/// 每个阶段的守卫检查结果，用于状态总览
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: StateId,
    pub reachable: bool,
    /// 从上一阶段进入本阶段的守卫是否通过
    pub guard_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// 工作流状态机，持有注入的存储
#[derive(Debug, Clone)]
pub struct WorkflowMachine {
    store: Arc<dyn ScreenplayStore>,
}

impl WorkflowMachine {
    pub fn new(store: Arc<dyn ScreenplayStore>) -> Self {
        WorkflowMachine { store }
    }

    pub fn store(&self) -> &Arc<dyn ScreenplayStore> {
        &self.store
    }

    pub async fn current_state(&self, id: ScreenplayId) -> StoreResult<StateId> {
        Ok(self.store.get(id).await?.current_state)
    }

    pub async fn can_enter(&self, id: ScreenplayId, target: StateId) -> StoreResult<bool> {
        Ok(can_enter(self.current_state(id).await?, target))
    }

    /// 请求切换阶段
    ///
    /// 前进一步时对当前快照执行守卫，通过后写入 `current_state` 和 `status`；
    /// 停留或回退直接写入。守卫不通过不是错误，返回 [`TransitionOutcome::Rejected`]。
    pub async fn request_transition(&self, id: ScreenplayId, target: StateId) -> StoreResult<TransitionOutcome> {
        let snapshot = self.store.get(id).await?;
        let current = snapshot.current_state;

        if !can_enter(current, target) {
            log::warn!("剧本 {}: 不能从 {} 跳到 {}", id, current, target);
            return Ok(TransitionOutcome::Rejected(GuardFailure::Unreachable { from: current, to: target }));
        }

        if target.index() == current.index() + 1 {
            if let Some(guard) = guard_for(target) {
                if let Err(failure) = guard(&snapshot) {
                    log::warn!("剧本 {}: {} → {} 被拒绝: {}", id, current, target, failure);
                    return Ok(TransitionOutcome::Rejected(failure));
                }
            }
        }

        self.store.update(id, ScreenplayPatch::stage(target)).await?;
        log::info!("剧本 {}: {} → {}", id, current, target);
        Ok(TransitionOutcome::Entered(target))
    }

    /// 各阶段的可达性和守卫结果
    pub async fn report(&self, id: ScreenplayId) -> StoreResult<Vec<StageReport>> {
        let snapshot = self.store.get(id).await?;
        let reports = StateId::STAGES
            .iter()
            .map(|&stage| {
                let result = guard_for(stage).map_or(Ok(()), |guard| guard(&snapshot));
                StageReport {
                    stage,
                    reachable: can_enter(snapshot.current_state, stage),
                    guard_passed: result.is_ok(),
                    hint: result.err().map(|f| f.to_string()),
                }
            })
            .collect();
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Screenplay, TurningPoint, TurningPointType};
    use crate::store::MemoryStore;

    async fn machine_at(state: StateId) -> (WorkflowMachine, Screenplay) {
        let store = Arc::new(MemoryStore::new());
        let sp = store.create("Test").await.unwrap();
        store.update(sp.id, ScreenplayPatch::stage(state)).await.unwrap();
        (WorkflowMachine::new(store), sp)
    }

    #[test]
    fn can_enter_allows_one_step_forward() {
        for current in StateId::STAGES {
            for target in StateId::STAGES {
                assert_eq!(
                    can_enter(current, target),
                    target.index() <= current.index() + 1,
                    "{} -> {}",
                    current,
                    target
                );
            }
        }
        assert!(can_enter(StateId::Init, StateId::Synopsis));
        assert!(!can_enter(StateId::Init, StateId::Treatment));
    }

    #[tokio::test]
    async fn rejected_transition_keeps_state() {
        let (machine, sp) = machine_at(StateId::Synopsis).await;
        let outcome = machine.request_transition(sp.id, StateId::Treatment).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Rejected(GuardFailure::Synopsis));
        assert_eq!(machine.current_state(sp.id).await.unwrap(), StateId::Synopsis);
    }

    #[tokio::test]
    async fn skipping_ahead_is_rejected() {
        let (machine, sp) = machine_at(StateId::Synopsis).await;
        let outcome = machine.request_transition(sp.id, StateId::TurningPoints).await.unwrap();
        assert!(matches!(outcome, TransitionOutcome::Rejected(GuardFailure::Unreachable { .. })));
    }

    #[tokio::test]
    async fn passing_guard_persists_state_and_status() {
        let (machine, sp) = machine_at(StateId::TurningPoints).await;
        let tps = TurningPointType::ORDERED
            .iter()
            .enumerate()
            .map(|(i, t)| TurningPoint::new(*t, i as u32 + 1, "Summary that is long enough."))
            .collect();
        machine
            .store()
            .update(sp.id, ScreenplayPatch { turning_points: Some(tps), ..Default::default() })
            .await
            .unwrap();

        let outcome = machine.request_transition(sp.id, StateId::Characters).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Entered(StateId::Characters));
        let loaded = machine.store().get(sp.id).await.unwrap();
        assert_eq!(loaded.current_state, StateId::Characters);
        assert_eq!(loaded.status, StateId::Characters);
    }

    #[tokio::test]
    async fn moving_back_and_ungated_edges() {
        let (machine, sp) = machine_at(StateId::Review).await;
        let outcome = machine.request_transition(sp.id, StateId::Exports).await.unwrap();
        assert!(outcome.is_entered(), "S9 → S10 不设守卫");

        let outcome = machine.request_transition(sp.id, StateId::Synopsis).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Entered(StateId::Synopsis));
        assert_eq!(machine.current_state(sp.id).await.unwrap(), StateId::Synopsis);
    }

    #[tokio::test]
    async fn report_lists_every_stage() {
        let (machine, sp) = machine_at(StateId::Synopsis).await;
        let report = machine.report(sp.id).await.unwrap();
        assert_eq!(report.len(), 10);
        assert!(report[1].reachable);
        assert!(!report[1].guard_passed);
        assert!(!report[2].reachable);
        assert!(report[9].guard_passed);
    }
}
