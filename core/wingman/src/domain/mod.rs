//! ドメイン型（I/O を持たない値とその規則）

pub mod command;
pub mod config;
pub mod context;
pub mod intent;
pub mod page;
pub mod render_state;
pub mod selector;
pub mod snapshot;
pub mod suggestion;
pub mod thread_id;
pub mod turn;

pub use config::WingmanConfig;
pub use context::ConversationContext;
pub use intent::Intent;
pub use page::{ElementId, Page};
pub use render_state::{RenderState, Status};
pub use snapshot::{FeedbackLabel, PendingSnapshot, Rating};
pub use thread_id::ThreadId;
pub use turn::{Observation, ObservedMessage, Role, Turn};
