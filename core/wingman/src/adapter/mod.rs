//! Adapter 層: ポートの標準実装
//!
//! ページの読み取り・永続化・端末 I/O・スレッド起動をここに閉じ込める。

pub mod config_loader;
pub mod console_presenter;
pub mod dom_extractor;
pub mod dom_message_source;
pub mod file_context_repository;
pub mod json_page_source;
pub mod line_intent_source;
pub mod logging_context_repository;
pub mod role_classifier;
pub mod sigint_checker;
pub mod site_adapter;
pub mod stubs;
pub mod thread_spawner;

pub use config_loader::{load_config, ConfigOverrides};
pub use console_presenter::ConsolePresenter;
pub use dom_message_source::DomMessageSource;
pub use file_context_repository::FileContextRepository;
pub use json_page_source::JsonPageSource;
pub use line_intent_source::LineIntentSource;
pub use logging_context_repository::LoggingContextRepository;
pub use sigint_checker::{NoopInterruptChecker, SigintChecker};
pub use thread_spawner::ThreadSpawner;
