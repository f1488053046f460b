//! 提案要求パイプライン
//!
//! 単一実行（同時に 1 件まで）とクールダウン（起動間隔の下限）をここで守る。
//! 応答は要求 id で照合し、古い応答は捨てる。RenderState は内容が変わったときだけ描画する。

use crate::domain::suggestion::{suggest_payload, SuggestResponse};
use crate::domain::{ConversationContext, PendingSnapshot, RenderState, Status};
use crate::ports::outbound::Presenter;
use crate::usecase::dispatch::RelayDispatcher;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord, RelayKind, RelayResponse};
use std::sync::Arc;

/// request の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 外部呼び出しを起動した
    Started(u64),
    /// 別の要求が処理中
    Busy,
    /// クールダウン中
    CoolingDown,
    /// 相手の発言が無いので送らない
    Idle,
    /// 起動に失敗
    Failed,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: u64,
    started_ms: u64,
    /// 要求時点の相手の最新発言
    latest: String,
}

pub struct PipelineSettings {
    pub cooldown_ms: u64,
    pub option_count: usize,
    pub watchdog_ms: u64,
}

pub struct SuggestionPipeline {
    presenter: Arc<dyn Presenter>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn Log>,
    settings: PipelineSettings,
    in_flight: Option<InFlight>,
    last_started_ms: Option<u64>,
    last_rendered: Option<RenderState>,
}

impl SuggestionPipeline {
    pub fn new(
        presenter: Arc<dyn Presenter>,
        clock: Arc<dyn Clock>,
        log: Arc<dyn Log>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            presenter,
            clock,
            log,
            settings,
            in_flight: None,
            last_started_ms: None,
            last_rendered: None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_rendered(&self) -> Option<&RenderState> {
        self.last_rendered.as_ref()
    }

    pub fn watchdog_ms(&self) -> u64 {
        self.settings.watchdog_ms
    }

    /// 提案を要求する（ガードを通れば外部呼び出しを起動する）
    pub fn request(&mut self, context: &ConversationContext, dispatcher: &mut RelayDispatcher) -> RequestOutcome {
        let now = self.clock.now_ms();
        if self.in_flight.is_some() {
            self.trace("suggest skipped: in flight");
            return RequestOutcome::Busy;
        }
        if let Some(last) = self.last_started_ms {
            if now.saturating_sub(last) < self.settings.cooldown_ms {
                self.trace("suggest skipped: cooling down");
                return RequestOutcome::CoolingDown;
            }
        }

        let trimmed = context.trimmed_to_other();
        let Some(latest) = trimmed.last_other_text().map(str::to_string) else {
            self.presenter.status(Status::Idle);
            return RequestOutcome::Idle;
        };

        let body = suggest_payload(&trimmed, self.settings.option_count);
        match dispatcher.dispatch(RelayKind::Suggest, body) {
            Ok(id) => {
                self.in_flight = Some(InFlight {
                    id,
                    started_ms: now,
                    latest,
                });
                self.last_started_ms = Some(now);
                self.presenter.status(Status::Thinking);
                self.log.emit(
                    LogRecord::new(LogLevel::Info, "suggest started")
                        .layer("usecase")
                        .kind("relay")
                        .field("request_id", id)
                        .field("turns", trimmed.len()),
                );
                RequestOutcome::Started(id)
            }
            Err(e) => {
                self.presenter.status(Status::Error);
                self.log.emit(
                    LogRecord::new(LogLevel::Warn, "suggest could not start")
                        .layer("usecase")
                        .kind("relay")
                        .field("error", e.to_string()),
                );
                RequestOutcome::Failed
            }
        }
    }

    /// 提案応答を反映する。成功時は新しいスナップショットを返す。
    ///
    /// 処理中の要求と id が合わない応答（打ち切り後に届いたもの等）は無視する。
    pub fn complete(&mut self, id: u64, response: &RelayResponse) -> Option<PendingSnapshot> {
        match &self.in_flight {
            Some(f) if f.id == id => {}
            _ => {
                self.log.emit(
                    LogRecord::new(LogLevel::Debug, "late suggest response ignored")
                        .layer("usecase")
                        .kind("relay")
                        .field("request_id", id),
                );
                return None;
            }
        }
        let flight = self.in_flight.take()?;

        if !response.ok {
            self.presenter.status(Status::Error);
            self.log.emit(
                LogRecord::new(LogLevel::Warn, "suggest failed")
                    .layer("usecase")
                    .kind("relay")
                    .field("request_id", id)
                    .field("status", response.status)
                    .field("error", response.error_message().unwrap_or("")),
            );
            return None;
        }

        let parsed = SuggestResponse::from_value(&response.data);
        let now = self.clock.now_ms();
        let snapshot =
            PendingSnapshot::build(&flight.latest, &parsed.stage, parsed.heat, &parsed.options, now);

        let state = RenderState::new(parsed.heat, parsed.stage.clone(), parsed.options.clone());
        if state.differs_from(self.last_rendered.as_ref()) {
            self.presenter.render(&state);
            self.last_rendered = Some(state);
        }
        let status = if parsed.options.is_empty() {
            Status::Idle
        } else {
            Status::Ready
        };
        self.presenter.status(status);

        let mut record = LogRecord::new(LogLevel::Info, "suggest completed")
            .layer("usecase")
            .kind("relay")
            .field("request_id", id)
            .field("options", parsed.options.len())
            .field("stage", parsed.stage.as_str())
            .field("heat", parsed.heat)
            .field("elapsed_ms", now.saturating_sub(flight.started_ms));
        if parsed.debug.as_object().is_some_and(|d| !d.is_empty()) {
            record = record.field("debug", parsed.debug.clone());
        }
        self.log.emit(record);
        Some(snapshot)
    }

    /// 応答が来ないまま watchdog を超えた要求を打ち切る。打ち切ったら true。
    pub fn expire(&mut self) -> bool {
        let now = self.clock.now_ms();
        let stale = self
            .in_flight
            .as_ref()
            .is_some_and(|f| now.saturating_sub(f.started_ms) >= self.settings.watchdog_ms);
        if !stale {
            return false;
        }
        if let Some(f) = self.in_flight.take() {
            self.presenter.status(Status::Error);
            self.log.emit(
                LogRecord::new(LogLevel::Warn, "suggest timed out; releasing guard")
                    .layer("usecase")
                    .kind("relay")
                    .field("request_id", f.id),
            );
        }
        true
    }

    fn trace(&self, message: &str) {
        self.log.emit(
            LogRecord::new(LogLevel::Debug, message)
                .layer("usecase")
                .kind("relay"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::stubs::{CapturingLog, FixedClock, ManualSpawner, RecordingPresenter, StubRelay};
    use crate::domain::{Rating, Role, Turn};
    use serde_json::json;

    struct Rig {
        clock: Arc<FixedClock>,
        relay: Arc<StubRelay>,
        spawner: Arc<ManualSpawner>,
        presenter: Arc<RecordingPresenter>,
        dispatcher: RelayDispatcher,
        pipeline: SuggestionPipeline,
    }

    fn rig() -> Rig {
        let clock = Arc::new(FixedClock::new(10_000));
        let relay = Arc::new(StubRelay::new());
        let spawner = Arc::new(ManualSpawner::new());
        let presenter = Arc::new(RecordingPresenter::new());
        let dispatcher = RelayDispatcher::new(relay.clone(), spawner.clone());
        let pipeline = SuggestionPipeline::new(
            presenter.clone(),
            clock.clone(),
            Arc::new(CapturingLog::new()),
            PipelineSettings {
                cooldown_ms: 1_800,
                option_count: 3,
                watchdog_ms: 20_000,
            },
        );
        Rig {
            clock,
            relay,
            spawner,
            presenter,
            dispatcher,
            pipeline,
        }
    }

    fn hi() -> ConversationContext {
        ConversationContext::from_turns(vec![Turn::new(Role::Other, "hi", 1)])
    }

    fn settle(r: &mut Rig) -> Option<PendingSnapshot> {
        r.spawner.run_all();
        let mut last = None;
        for c in r.dispatcher.drain() {
            last = r.pipeline.complete(c.id, &c.response);
        }
        last
    }

    #[test]
    fn test_end_to_end_render_and_snapshot() {
        let mut r = rig();
        r.relay.respond(
            RelayKind::Suggest,
            RelayResponse::new(true, 200, json!({"options": ["a", "b", "c"], "stage": "banter", "spice": 1})),
        );
        assert!(matches!(r.pipeline.request(&hi(), &mut r.dispatcher), RequestOutcome::Started(_)));
        assert_eq!(r.presenter.last_status(), Some(Status::Thinking));
        let snap = settle(&mut r).unwrap();

        assert_eq!(
            r.presenter.renders(),
            vec![RenderState::new(1, "banter", vec!["a".into(), "b".into(), "c".into()])]
        );
        assert_eq!(r.presenter.last_status(), Some(Status::Ready));
        assert_eq!(snap.options.len(), 3);
        assert!(snap.options.iter().all(|o| o.rating == Rating::Unset));
        assert_eq!(snap.text, "hi");
        assert_eq!(
            r.relay.calls_of(RelayKind::Suggest)[0],
            json!({"context": [{"role": "them", "text": "hi"}], "n": 3})
        );
    }

    #[test]
    fn test_single_flight() {
        let mut r = rig();
        assert!(matches!(r.pipeline.request(&hi(), &mut r.dispatcher), RequestOutcome::Started(_)));
        r.clock.advance(5_000);
        assert_eq!(r.pipeline.request(&hi(), &mut r.dispatcher), RequestOutcome::Busy);
        assert_eq!(r.spawner.pending(), 1);
        settle(&mut r);
        assert_eq!(r.relay.calls_of(RelayKind::Suggest).len(), 1);
    }

    #[test]
    fn test_cooldown_between_started_requests() {
        let mut r = rig();
        assert!(matches!(r.pipeline.request(&hi(), &mut r.dispatcher), RequestOutcome::Started(_)));
        settle(&mut r);
        r.clock.advance(1_000);
        assert_eq!(r.pipeline.request(&hi(), &mut r.dispatcher), RequestOutcome::CoolingDown);
        r.clock.advance(800);
        assert!(matches!(r.pipeline.request(&hi(), &mut r.dispatcher), RequestOutcome::Started(_)));
        settle(&mut r);
        assert_eq!(r.relay.calls_of(RelayKind::Suggest).len(), 2);
    }

    #[test]
    fn test_trim_to_other_aborts_idle() {
        let mut r = rig();
        let ctx = ConversationContext::from_turns(vec![Turn::new(Role::Own, "hey", 1)]);
        assert_eq!(r.pipeline.request(&ctx, &mut r.dispatcher), RequestOutcome::Idle);
        assert_eq!(r.presenter.last_status(), Some(Status::Idle));
        assert_eq!(r.spawner.pending(), 0);
        assert!(r.relay.calls_of(RelayKind::Suggest).is_empty());
        // 送っていないのでクールダウンも始まらない
        let ok = ConversationContext::from_turns(vec![Turn::new(Role::Other, "yo", 1)]);
        assert!(matches!(r.pipeline.request(&ok, &mut r.dispatcher), RequestOutcome::Started(_)));
    }

    #[test]
    fn test_trailing_own_turns_are_dropped_from_payload() {
        let mut r = rig();
        let ctx = ConversationContext::from_turns(vec![
            Turn::new(Role::Other, "wyd", 1),
            Turn::new(Role::Own, "nm u", 2),
        ]);
        r.pipeline.request(&ctx, &mut r.dispatcher);
        settle(&mut r);
        let body = &r.relay.calls_of(RelayKind::Suggest)[0];
        assert_eq!(body["context"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_render_only_on_change() {
        let mut r = rig();
        for _ in 0..2 {
            r.pipeline.request(&hi(), &mut r.dispatcher);
            settle(&mut r);
            r.clock.advance(2_000);
        }
        assert_eq!(r.presenter.renders().len(), 1);
        r.relay.respond(
            RelayKind::Suggest,
            RelayResponse::new(true, 200, json!({"options": ["x"], "heat": 3})),
        );
        r.pipeline.request(&hi(), &mut r.dispatcher);
        settle(&mut r);
        assert_eq!(r.presenter.renders().len(), 2);
        assert_eq!(r.pipeline.last_rendered().unwrap().heat, 3);
    }

    #[test]
    fn test_transport_failure_keeps_render_state() {
        let mut r = rig();
        r.relay.respond(
            RelayKind::Suggest,
            RelayResponse::new(true, 200, json!({"options": ["a"]})),
        );
        r.pipeline.request(&hi(), &mut r.dispatcher);
        settle(&mut r);
        r.clock.advance(2_000);
        r.relay.respond(RelayKind::Suggest, RelayResponse::transport_failure("connection refused"));
        r.pipeline.request(&hi(), &mut r.dispatcher);
        assert!(settle(&mut r).is_none());
        assert_eq!(r.presenter.last_status(), Some(Status::Error));
        assert_eq!(r.presenter.renders().len(), 1);
        assert!(!r.pipeline.is_in_flight());
    }

    #[test]
    fn test_watchdog_releases_guard_and_ignores_late_reply() {
        let mut r = rig();
        let RequestOutcome::Started(first) = r.pipeline.request(&hi(), &mut r.dispatcher) else {
            panic!("not started");
        };
        r.clock.advance(19_999);
        assert!(!r.pipeline.expire());
        r.clock.advance(1);
        assert!(r.pipeline.expire());
        assert_eq!(r.presenter.last_status(), Some(Status::Error));
        assert!(!r.pipeline.is_in_flight());

        let RequestOutcome::Started(second) = r.pipeline.request(&hi(), &mut r.dispatcher) else {
            panic!("not started");
        };
        assert_ne!(first, second);
        let late = RelayResponse::new(true, 200, json!({"options": ["stale"]}));
        assert!(r.pipeline.complete(first, &late).is_none());
        assert!(r.pipeline.is_in_flight());
        assert!(r.presenter.renders().is_empty());
    }

    #[test]
    fn test_empty_options_is_idle() {
        let mut r = rig();
        r.relay.respond(RelayKind::Suggest, RelayResponse::new(true, 200, json!({"options": []})));
        r.pipeline.request(&hi(), &mut r.dispatcher);
        let snap = settle(&mut r).unwrap();
        assert!(snap.options.is_empty());
        assert_eq!(r.presenter.last_status(), Some(Status::Idle));
    }
}
