//! Outbound ポート: wingman 固有の外界（ページ・保存先・提示層・操作入力・実行器）

pub mod context_repository;
pub mod intent_source;
pub mod interrupt_checker;
pub mod message_source;
pub mod page_source;
pub mod presenter;
pub mod spawner;

pub use context_repository::ContextRepository;
pub use intent_source::IntentSource;
pub use interrupt_checker::InterruptChecker;
pub use message_source::MessageSource;
pub use page_source::PageSource;
pub use presenter::Presenter;
pub use spawner::{Job, Spawner};
