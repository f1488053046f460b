//! トリガー制御（スレッド切り替え・最新メッセージの取り込み・デバウンス判定）
//!
//! タブごとの可変状態は SessionState にまとめ、各操作に明示的に渡す。

use crate::domain::{ConversationContext, ObservedMessage, Role, ThreadId, Turn};
use crate::ports::outbound::MessageSource;
use crate::usecase::context_store::ContextStore;
use crate::usecase::fresh_conversation::FreshConversationDetector;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord};
use std::sync::Arc;

/// タブ 1 つ分の状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub thread: Option<ThreadId>,
    pub context: ConversationContext,
    /// 直近に取り込んだ最新メッセージ
    pub last_seen: Option<ObservedMessage>,
    /// 最後に提案要求へ回した相手の発言
    pub last_committed: Option<String>,
    /// デバウンス待ちのメッセージ
    pub armed: Option<ObservedMessage>,
}

impl SessionState {
    pub fn clear_trackers(&mut self) {
        self.last_seen = None;
    }
}

/// tick の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// 読めるメッセージが無い
    NoMessage,
    /// 最新が自分の発言
    OwnMessage,
    /// 既に要求へ回した発言
    AlreadyCommitted,
    /// デバウンスを（張り直して）待つ
    Armed,
}

pub struct TriggerController {
    source: Arc<dyn MessageSource>,
    store: ContextStore,
    fresh: FreshConversationDetector,
    clock: Arc<dyn Clock>,
    log: Arc<dyn Log>,
}

impl TriggerController {
    pub fn new(
        source: Arc<dyn MessageSource>,
        store: ContextStore,
        fresh: FreshConversationDetector,
        clock: Arc<dyn Clock>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            source,
            store,
            fresh,
            clock,
            log,
        }
    }

    pub fn source(&self) -> &Arc<dyn MessageSource> {
        &self.source
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// スレッドが変わっていればコンテキストを読み直す。変わったら true。
    pub fn rotate(&self, state: &mut SessionState) -> bool {
        match self.source.thread_id() {
            Some(current) => self.switch_to(state, current),
            None => false,
        }
    }

    fn switch_to(&self, state: &mut SessionState, current: ThreadId) -> bool {
        if state.thread.as_ref() == Some(&current) {
            return false;
        }
        state.context = self.store.load(&current);
        state.clear_trackers();
        state.armed = None;
        self.log.emit(
            LogRecord::new(LogLevel::Info, "thread rotated")
                .layer("usecase")
                .kind("context")
                .field("thread", current.as_str())
                .field("turns", state.context.len()),
        );
        state.thread = Some(current);
        true
    }

    /// 1 周分の処理。Armed が返ったら呼び出し側がデバウンスを張る。
    ///
    /// スレッドと最新メッセージはページを 1 回だけ読んで得る。
    pub fn tick(&self, state: &mut SessionState) -> TickOutcome {
        let Some(observation) = self.source.observe() else {
            return TickOutcome::NoMessage;
        };
        self.switch_to(state, observation.thread);
        let Some(latest) = observation.latest else {
            return TickOutcome::NoMessage;
        };

        let changed = state
            .last_seen
            .as_ref()
            .map_or(true, |seen| seen.text != latest.text);
        if changed {
            self.ingest(state, &latest);
            state.last_seen = Some(latest.clone());
        }

        if latest.role != Role::Other {
            return TickOutcome::OwnMessage;
        }
        if state.last_committed.as_deref() == Some(latest.text.as_str()) {
            return TickOutcome::AlreadyCommitted;
        }
        state.armed = Some(latest);
        TickOutcome::Armed
    }

    /// 新しく見えたメッセージを履歴へ入れる（新しい会話なら 1 件に置き換える）
    fn ingest(&self, state: &mut SessionState, latest: &ObservedMessage) {
        let now = self.clock.now_ms();
        if self.fresh.should_reset(latest, &state.context, now) {
            state.context = ConversationContext::single(Turn::new(latest.role, &latest.text, now));
            self.log.emit(
                LogRecord::new(LogLevel::Info, "fresh conversation; context reset")
                    .layer("usecase")
                    .kind("context")
                    .field("text", latest.text.as_str()),
            );
        } else {
            state.context = self.store.append(&state.context, latest.role, &latest.text);
        }
        self.persist(state);
    }

    /// デバウンス満了。画面が落ち着いていれば要求に回すコンテキストを返す。
    pub fn fire_debounce(&self, state: &mut SessionState) -> Option<ConversationContext> {
        let armed = state.armed.take()?;
        let observation = self.source.observe()?;
        if state.thread.as_ref() != Some(&observation.thread) {
            return None;
        }
        let again = observation.latest?;
        if again.role != Role::Other || again.text != armed.text {
            return None;
        }
        let trimmed = state.context.trimmed_to_other();
        if trimmed.is_empty() {
            return None;
        }
        state.last_committed = Some(again.text);
        Some(trimmed)
    }

    /// 履歴を空にして保存し、直近の取り込み記録を消す
    pub fn reset(&self, state: &mut SessionState) {
        state.context = ConversationContext::new();
        self.persist(state);
        state.clear_trackers();
    }

    fn persist(&self, state: &SessionState) {
        match &state.thread {
            Some(thread) => self.store.save(thread, &state.context),
            None => self.log.emit(
                LogRecord::new(LogLevel::Debug, "no thread yet; context not saved")
                    .layer("usecase")
                    .kind("context"),
            ),
        }
    }
}
