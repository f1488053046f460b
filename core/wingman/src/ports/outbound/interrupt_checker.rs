//! Ctrl+C（SIGINT）等による割り込みを検知する Outbound ポート
//!
//! 監視ループは毎周この trait を参照し、true なら後始末をして終了する。

pub trait InterruptChecker: Send + Sync {
    fn is_interrupted(&self) -> bool;
}
