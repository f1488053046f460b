//! 配線: 標準アダプタで UseCase を組み立てる

use std::path::PathBuf;
use std::sync::Arc;

use common::adapter::{
    FileJsonLog, FileSystem, HttpRelay, StderrLog, StdClock, StdEnvResolver, StdFileSystem, TeeLog,
};
use common::domain::Dirs;
use common::error::Error;
use common::ports::outbound::{Clock, EnvResolver, Log, LogLevel, Relay};

use crate::adapter::{
    load_config, ConfigOverrides, ConsolePresenter, DomMessageSource, FileContextRepository,
    JsonPageSource, LineIntentSource, LoggingContextRepository, NoopInterruptChecker,
    SigintChecker, ThreadSpawner,
};
use crate::domain::config::BOOT_DELAY_MS;
use crate::domain::WingmanConfig;
use crate::ports::outbound::{InterruptChecker, MessageSource, Presenter};
use crate::usecase::{
    ContextStore, FreshConversationDetector, InspectUseCase, LoopSettings, PipelineSettings,
    RelayDispatcher, SnapshotState, SuggestionPipeline, TriggerController, WatchLoop,
};

/// page_snapshot 未設定時に読むファイル名（state ディレクトリ直下）
const DEFAULT_PAGE_FILE: &str = "page.json";

/// 組み立て済みの共有部品
pub struct App {
    pub config: WingmanConfig,
    pub dirs: Dirs,
    pub logger: Arc<dyn Log>,
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
}

/// 配線: ディレクトリと設定を解決し、ログを用意する
///
/// # Errors
/// ホームディレクトリが解決できない、または config.json が不正なとき。
pub fn wire_wingman(overrides: &ConfigOverrides, verbose: bool) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env_resolver = StdEnvResolver;
    let dirs = env_resolver.resolve_dirs()?;
    let file_log: Arc<dyn Log> = Arc::new(FileJsonLog::new(
        Arc::clone(&fs),
        dirs.logs_dir().join("wingman.jsonl"),
    ));
    let logger: Arc<dyn Log> = if verbose {
        Arc::new(TeeLog::new(vec![
            file_log,
            Arc::new(StderrLog::new(LogLevel::Debug)),
        ]))
    } else {
        file_log
    };
    let config = load_config(fs.as_ref(), &env_resolver, &dirs, overrides)?;
    Ok(App {
        config,
        dirs,
        logger,
        fs,
        clock: Arc::new(StdClock),
    })
}

impl App {
    fn page_path(&self) -> PathBuf {
        self.config
            .page_snapshot
            .clone()
            .unwrap_or_else(|| self.dirs.state_dir.join(DEFAULT_PAGE_FILE))
    }

    fn message_source(&self) -> Arc<dyn MessageSource> {
        let pages = Arc::new(JsonPageSource::new(Arc::clone(&self.fs), self.page_path()));
        Arc::new(DomMessageSource::new(pages, &self.config.overlay_id))
    }

    fn context_store(&self) -> ContextStore {
        let repo = Arc::new(LoggingContextRepository::new(
            Arc::new(FileContextRepository::new(
                Arc::clone(&self.fs),
                self.dirs.contexts_dir(),
            )),
            Arc::clone(&self.logger),
        ));
        ContextStore::new(repo, Arc::clone(&self.clock), Arc::clone(&self.logger))
    }

    pub fn inspect(&self) -> InspectUseCase {
        InspectUseCase::new(self.message_source(), self.context_store())
    }

    /// 監視ループを組み立てる（標準入力の読み取りと Ctrl+C ハンドラもここで始まる）
    ///
    /// # Errors
    /// HTTP クライアントや入力スレッドを用意できないとき。
    pub fn watch_loop(&self) -> Result<WatchLoop, Error> {
        let config = &self.config;
        let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter::stdout());
        let relay: Arc<dyn Relay> = Arc::new(HttpRelay::new(
            config.api_base_url.clone(),
            config.request_timeout(),
        )?);
        let dispatcher = RelayDispatcher::new(relay, Arc::new(ThreadSpawner));
        let trigger = TriggerController::new(
            self.message_source(),
            self.context_store(),
            FreshConversationDetector::new(config.quiet_period_ms)?,
            Arc::clone(&self.clock),
            Arc::clone(&self.logger),
        );
        let pipeline = SuggestionPipeline::new(
            Arc::clone(&presenter),
            Arc::clone(&self.clock),
            Arc::clone(&self.logger),
            PipelineSettings {
                cooldown_ms: config.cooldown_ms,
                option_count: config.option_count,
                watchdog_ms: config.watchdog_ms(),
            },
        );
        let snapshot = SnapshotState::new(Arc::clone(&presenter), Arc::clone(&self.logger));
        let interrupt: Arc<dyn InterruptChecker> = match SigintChecker::new() {
            Ok(c) => Arc::new(c),
            Err(_) => Arc::new(NoopInterruptChecker),
        };
        Ok(WatchLoop::new(
            trigger,
            pipeline,
            snapshot,
            dispatcher,
            Arc::new(LineIntentSource::stdin()?),
            interrupt,
            presenter,
            Arc::clone(&self.clock),
            Arc::clone(&self.logger),
            LoopSettings {
                tick_interval_ms: config.tick_interval_ms,
                rotation_interval_ms: config.rotation_interval_ms,
                debounce_ms: config.debounce_ms,
                boot_delay_ms: BOOT_DELAY_MS,
            },
        ))
    }
}
