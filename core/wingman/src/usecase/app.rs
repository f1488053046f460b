//! 監視ループ（スケジューラ駆動）
//!
//! 完了通知の反映 → 期限の来たタスク → 利用者の操作、の順に 1 周を処理する。
//! 各タスクはガード内で実行し、panic しても記録して次の周へ進む。

use crate::domain::snapshot::FeedbackLabel;
use crate::domain::{ConversationContext, Intent, Status};
use crate::ports::outbound::{IntentSource, InterruptChecker, Presenter};
use crate::usecase::dispatch::{Completion, RelayDispatcher};
use crate::usecase::scheduler::{Scheduler, Task};
use crate::usecase::snapshot::{FeedbackOrigin, SnapshotState};
use crate::usecase::suggest::{RequestOutcome, SuggestionPipeline};
use crate::usecase::trigger::{SessionState, TickOutcome, TriggerController};
use common::error::Error;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord, RelayKind};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// 操作入力を見に行く最大間隔
const POLL_MS: u64 = 50;
/// Ctrl+C で終了したときの終了コード
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub tick_interval_ms: u64,
    pub rotation_interval_ms: u64,
    pub debounce_ms: u64,
    pub boot_delay_ms: u64,
}

/// 1 周の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct WatchLoop {
    trigger: TriggerController,
    pipeline: SuggestionPipeline,
    snapshot: SnapshotState,
    dispatcher: RelayDispatcher,
    scheduler: Scheduler,
    state: SessionState,
    intents: Arc<dyn IntentSource>,
    interrupt: Arc<dyn InterruptChecker>,
    presenter: Arc<dyn Presenter>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn Log>,
    settings: LoopSettings,
}

impl WatchLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trigger: TriggerController,
        pipeline: SuggestionPipeline,
        snapshot: SnapshotState,
        dispatcher: RelayDispatcher,
        intents: Arc<dyn IntentSource>,
        interrupt: Arc<dyn InterruptChecker>,
        presenter: Arc<dyn Presenter>,
        clock: Arc<dyn Clock>,
        log: Arc<dyn Log>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            trigger,
            pipeline,
            snapshot,
            dispatcher,
            scheduler: Scheduler::new(),
            state: SessionState::default(),
            intents,
            interrupt,
            presenter,
            clock,
            log,
            settings,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> &SnapshotState {
        &self.snapshot
    }

    pub fn pipeline(&self) -> &SuggestionPipeline {
        &self.pipeline
    }

    /// タスクを登録し、現在のスレッドのコンテキストを読み込む
    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        self.scheduler
            .every(Task::Rotation, self.settings.rotation_interval_ms, now);
        self.scheduler
            .every(Task::Tick, self.settings.tick_interval_ms, now);
        self.scheduler
            .once(Task::Boot, self.settings.boot_delay_ms, now);
        self.guarded("rotation", |this| {
            this.trigger.rotate(&mut this.state);
        });
        self.presenter.status(Status::Idle);
        self.log.emit(
            LogRecord::new(LogLevel::Info, "loop started")
                .layer("usecase")
                .kind("lifecycle")
                .field(
                    "thread",
                    self.state.thread.as_ref().map(|t| t.as_str()).unwrap_or(""),
                ),
        );
    }

    /// 1 周分を処理する
    pub fn step(&mut self) -> Flow {
        for completion in self.dispatcher.drain() {
            self.guarded("completion", |this| this.route(completion));
        }

        let now = self.clock.now_ms();
        for task in self.scheduler.due(now) {
            self.guarded(task_name(task), |this| this.run_task(task));
        }

        while let Some(intent) = self.intents.poll() {
            if intent == Intent::Quit {
                return Flow::Quit;
            }
            self.guarded("intent", |this| this.handle_intent(intent));
        }
        Flow::Continue
    }

    /// 割り込みか Quit まで回し続ける
    pub fn run(&mut self) -> Result<i32, Error> {
        self.start();
        let code = loop {
            if self.interrupt.is_interrupted() {
                break EXIT_INTERRUPTED;
            }
            if self.step() == Flow::Quit {
                break 0;
            }
            let now = self.clock.now_ms();
            let wait = self
                .scheduler
                .next_deadline()
                .map_or(POLL_MS, |at| at.saturating_sub(now).min(POLL_MS));
            std::thread::sleep(Duration::from_millis(wait.max(1)));
        };
        self.log.emit(
            LogRecord::new(LogLevel::Info, "loop stopped")
                .layer("usecase")
                .kind("lifecycle")
                .field("exit_code", code),
        );
        Ok(code)
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Rotation => {
                self.trigger.rotate(&mut self.state);
            }
            Task::Tick => {
                if self.trigger.tick(&mut self.state) == TickOutcome::Armed {
                    let now = self.clock.now_ms();
                    self.scheduler
                        .once(Task::Debounce, self.settings.debounce_ms, now);
                }
            }
            Task::Debounce => {
                if let Some(context) = self.trigger.fire_debounce(&mut self.state) {
                    self.request(&context);
                }
            }
            Task::Boot => {
                let context = self.state.context.clone();
                if !context.trimmed_to_other().is_empty() {
                    self.request(&context);
                }
            }
            Task::Watchdog => {
                self.pipeline.expire();
            }
        }
    }

    fn request(&mut self, context: &ConversationContext) {
        if let RequestOutcome::Started(_) = self.pipeline.request(context, &mut self.dispatcher) {
            let now = self.clock.now_ms();
            self.scheduler
                .once(Task::Watchdog, self.pipeline.watchdog_ms(), now);
        }
    }

    fn route(&mut self, completion: Completion) {
        match completion.kind {
            RelayKind::Suggest => {
                if let Some(snapshot) = self.pipeline.complete(completion.id, &completion.response) {
                    self.snapshot.replace(snapshot);
                }
                if !self.pipeline.is_in_flight() {
                    self.scheduler.cancel(Task::Watchdog);
                }
            }
            kind => self.snapshot.on_completion(kind, &completion.response),
        }
    }

    fn handle_intent(&mut self, intent: Intent) {
        self.log.emit(
            LogRecord::new(LogLevel::Debug, "intent")
                .layer("usecase")
                .kind("intent")
                .field("intent", format!("{:?}", intent)),
        );
        match intent {
            Intent::RequestSuggestion => {
                let context = self.state.context.clone();
                self.request(&context);
            }
            Intent::Rate { index, label } => {
                let origin = self.origin();
                self.snapshot
                    .rate(index, label, &origin, &mut self.dispatcher);
            }
            Intent::Copy { index } => {
                let text = self
                    .snapshot
                    .pending()
                    .and_then(|p| p.option_text(index))
                    .map(str::to_string);
                if let Some(text) = text {
                    self.presenter.notice(&format!("Copied: {}", text));
                }
                let origin = self.origin();
                self.snapshot
                    .feedback(index, FeedbackLabel::Clicked, &origin, &mut self.dispatcher);
            }
            Intent::Commit => {
                self.snapshot.commit(&mut self.dispatcher);
            }
            Intent::Reset => {
                self.trigger.reset(&mut self.state);
                self.presenter.notice("Context reset");
            }
            Intent::Quit => {}
        }
    }

    fn origin(&self) -> FeedbackOrigin {
        FeedbackOrigin {
            site: self.trigger.source().site(),
            thread: self
                .state
                .thread
                .as_ref()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            history_len: self.state.context.len(),
        }
    }

    /// panic を捕まえて記録し、ループを止めない
    fn guarded(&mut self, what: &str, f: impl FnOnce(&mut Self)) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(self))) {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            self.log.emit(
                LogRecord::new(LogLevel::Error, format!("{} failed", what))
                    .layer("usecase")
                    .kind("error")
                    .field("reason", reason),
            );
        }
    }
}

fn task_name(task: Task) -> &'static str {
    match task {
        Task::Rotation => "rotation",
        Task::Tick => "tick",
        Task::Debounce => "debounce",
        Task::Boot => "boot",
        Task::Watchdog => "watchdog",
    }
}
