//! コミット待ちスナップショットの評価・フィードバック・コミット
//!
//! 評価クリックはスナップショットを書き換えて feedback を 1 件送るだけで、
//! コミットは利用者が明示したときに全体を 1 回送る。

use crate::domain::snapshot::FeedbackLabel;
use crate::domain::suggestion::{feedback_payload, FeedbackMeta};
use crate::domain::PendingSnapshot;
use crate::ports::outbound::Presenter;
use crate::usecase::dispatch::RelayDispatcher;
use common::ports::outbound::{Log, LogLevel, LogRecord, RelayKind, RelayResponse};
use std::sync::Arc;

/// フィードバック送信に添える画面側の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackOrigin {
    pub site: String,
    pub thread: String,
    pub history_len: usize,
}

pub struct SnapshotState {
    presenter: Arc<dyn Presenter>,
    log: Arc<dyn Log>,
    pending: Option<PendingSnapshot>,
}

impl SnapshotState {
    pub fn new(presenter: Arc<dyn Presenter>, log: Arc<dyn Log>) -> Self {
        Self {
            presenter,
            log,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&PendingSnapshot> {
        self.pending.as_ref()
    }

    /// 提案成功時に前のスナップショットを置き換える
    pub fn replace(&mut self, snapshot: PendingSnapshot) {
        self.pending = Some(snapshot);
    }

    /// 評価（Up / Down）を書き込み、フィードバックを送る
    pub fn rate(
        &mut self,
        index: usize,
        label: FeedbackLabel,
        origin: &FeedbackOrigin,
        dispatcher: &mut RelayDispatcher,
    ) -> bool {
        let Some(rating) = label.rating() else {
            return self.feedback(index, label, origin, dispatcher);
        };
        let rated = self
            .pending
            .as_mut()
            .map_or(false, |p| p.rate(index, rating));
        if !rated {
            self.presenter.notice(&format!("No option {}", index + 1));
            return false;
        }
        self.feedback(index, label, origin, dispatcher)
    }

    /// 1 件分の操作をフィードバックとして送る（コミットとは独立）
    pub fn feedback(
        &self,
        index: usize,
        label: FeedbackLabel,
        origin: &FeedbackOrigin,
        dispatcher: &mut RelayDispatcher,
    ) -> bool {
        let Some(p) = &self.pending else {
            self.presenter.notice(&format!("No option {}", index + 1));
            return false;
        };
        let Some(option) = p.option_text(index) else {
            self.presenter.notice(&format!("No option {}", index + 1));
            return false;
        };
        let meta = FeedbackMeta {
            site: origin.site.clone(),
            thread: origin.thread.clone(),
            history_len: origin.history_len,
            index,
        };
        let body = feedback_payload(&p.stage, &p.text, option, label, &meta);
        match dispatcher.dispatch(RelayKind::Feedback, body) {
            Ok(_) => true,
            Err(e) => {
                self.warn("feedback could not start", &e.to_string());
                false
            }
        }
    }

    /// スナップショット全体をコミットする。本文か選択肢が無ければ送らない。
    pub fn commit(&self, dispatcher: &mut RelayDispatcher) -> bool {
        let Some(p) = self.pending.as_ref().filter(|p| p.is_committable()) else {
            self.presenter.notice("Nothing to commit");
            return false;
        };
        match dispatcher.dispatch(RelayKind::Commit, p.commit_payload()) {
            Ok(_) => true,
            Err(e) => {
                self.warn("commit could not start", &e.to_string());
                self.presenter.notice("Commit failed");
                false
            }
        }
    }

    /// feedback / commit の完了通知を表示に反映する
    pub fn on_completion(&self, kind: RelayKind, response: &RelayResponse) {
        match kind {
            RelayKind::Commit if response.ok => self.presenter.notice("Committed"),
            RelayKind::Commit => {
                self.warn("commit failed", response.error_message().unwrap_or(""));
                self.presenter.notice("Commit failed");
            }
            RelayKind::Feedback if response.ok => self.presenter.notice("Noted"),
            RelayKind::Feedback => {
                self.warn("feedback failed", response.error_message().unwrap_or(""))
            }
            RelayKind::Suggest => {}
        }
    }

    fn warn(&self, message: &str, error: &str) {
        self.log.emit(
            LogRecord::new(LogLevel::Warn, message)
                .layer("usecase")
                .kind("snapshot")
                .field("error", error),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::stubs::{CapturingLog, ManualSpawner, RecordingPresenter, StubRelay};
    use crate::domain::Rating;
    use serde_json::{json, Value};

    struct Rig {
        relay: Arc<StubRelay>,
        spawner: Arc<ManualSpawner>,
        presenter: Arc<RecordingPresenter>,
        dispatcher: RelayDispatcher,
        state: SnapshotState,
    }

    fn rig() -> Rig {
        let relay = Arc::new(StubRelay::new());
        let spawner = Arc::new(ManualSpawner::new());
        let presenter = Arc::new(RecordingPresenter::new());
        Rig {
            dispatcher: RelayDispatcher::new(relay.clone(), spawner.clone()),
            state: SnapshotState::new(presenter.clone(), Arc::new(CapturingLog::new())),
            relay,
            spawner,
            presenter,
        }
    }

    fn origin() -> FeedbackOrigin {
        FeedbackOrigin {
            site: "chat.example.org".into(),
            thread: "/t/1".into(),
            history_len: 2,
        }
    }

    fn batch() -> PendingSnapshot {
        PendingSnapshot::build("hi", "banter", 1, &["a".into(), "b".into(), "c".into()], 5)
    }

    #[test]
    fn test_rate_mutates_and_sends_feedback_only() {
        let mut r = rig();
        r.state.replace(batch());
        assert!(r.state.rate(1, FeedbackLabel::Up, &origin(), &mut r.dispatcher));
        r.spawner.run_all();
        assert_eq!(r.state.pending().unwrap().options[1].rating, Rating::Positive);
        let fb = r.relay.calls_of(RelayKind::Feedback);
        assert_eq!(fb.len(), 1);
        assert_eq!(fb[0]["label"], "up");
        assert_eq!(fb[0]["option"], "b");
        assert_eq!(fb[0]["latest"], "hi");
        assert_eq!(fb[0]["meta"]["index"], 1);
        assert!(r.relay.calls_of(RelayKind::Commit).is_empty());
    }

    #[test]
    fn test_commit_sends_full_snapshot() {
        let mut r = rig();
        r.state.replace(batch());
        r.state.rate(2, FeedbackLabel::Down, &origin(), &mut r.dispatcher);
        assert!(r.state.commit(&mut r.dispatcher));
        r.spawner.run_all();
        for c in r.dispatcher.drain() {
            r.state.on_completion(c.kind, &c.response);
        }
        let commits = r.relay.calls_of(RelayKind::Commit);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0]["options"].as_array().unwrap().len(), 3);
        assert_eq!(commits[0]["options"][2]["rating"], "N");
        assert_eq!(commits[0]["options"][0]["rating"], Value::Null);
        assert!(r.presenter.notices().contains(&"Committed".to_string()));
    }

    #[test]
    fn test_commit_rejected_locally_without_content() {
        let mut r = rig();
        assert!(!r.state.commit(&mut r.dispatcher));
        r.state.replace(PendingSnapshot::build("hi", "banter", 1, &[], 0));
        assert!(!r.state.commit(&mut r.dispatcher));
        r.state.replace(PendingSnapshot::build("", "banter", 1, &["a".into()], 0));
        assert!(!r.state.commit(&mut r.dispatcher));
        assert_eq!(r.spawner.pending(), 0);
        assert_eq!(r.presenter.notices(), vec!["Nothing to commit"; 3]);
    }

    #[test]
    fn test_commit_failure_is_reported() {
        let mut r = rig();
        r.relay.respond(RelayKind::Commit, RelayResponse::new(false, 500, json!({"error": "boom"})));
        r.state.replace(batch());
        r.state.commit(&mut r.dispatcher);
        r.spawner.run_all();
        for c in r.dispatcher.drain() {
            r.state.on_completion(c.kind, &c.response);
        }
        assert_eq!(r.presenter.notices(), vec!["Commit failed"]);
    }

    #[test]
    fn test_clicked_feedback_and_out_of_range() {
        let mut r = rig();
        r.state.replace(batch());
        assert!(r.state.feedback(0, FeedbackLabel::Clicked, &origin(), &mut r.dispatcher));
        assert!(!r.state.rate(7, FeedbackLabel::Up, &origin(), &mut r.dispatcher));
        r.spawner.run_all();
        let fb = r.relay.calls_of(RelayKind::Feedback);
        assert_eq!(fb.len(), 1);
        assert_eq!(fb[0]["label"], "clicked");
        assert_eq!(r.state.pending().unwrap().options[0].rating, Rating::Unset);
        assert_eq!(r.presenter.notices(), vec!["No option 8"]);
    }
}
