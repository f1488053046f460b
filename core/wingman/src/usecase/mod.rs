//! ユースケース（ポート経由でのみ外界に触れる）

pub mod app;
pub mod context_store;
pub mod dispatch;
pub mod fresh_conversation;
pub mod inspect;
pub mod scheduler;
pub mod snapshot;
pub mod suggest;
pub mod trigger;

pub use app::{Flow, LoopSettings, WatchLoop};
pub use context_store::ContextStore;
pub use dispatch::RelayDispatcher;
pub use fresh_conversation::FreshConversationDetector;
pub use inspect::InspectUseCase;
pub use suggest::{PipelineSettings, SuggestionPipeline};
pub use snapshot::SnapshotState;
pub use trigger::{SessionState, TriggerController};
