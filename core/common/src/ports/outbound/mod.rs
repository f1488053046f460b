//! Outbound ポート: アプリが外界（FS・時刻・環境変数・ログ・中継サービス）を使うための trait

pub mod clock;
pub mod env_resolver;
pub mod fs;
pub mod log;
pub mod relay;

pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use fs::{FileMetadata, FileSystem};
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
pub use relay::{Relay, RelayKind, RelayResponse};
