//! Ctrl+C で監視ループを止めるための InterruptChecker

use crate::ports::outbound::InterruptChecker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// SIGINT を受けるとフラグが立つ。一度立ったら戻らない。
pub struct SigintChecker {
    stop: Arc<AtomicBool>,
}

impl SigintChecker {
    /// ctrlc ハンドラを登録する（プロセスで 1 回だけ成功する）
    pub fn new() -> Result<Self, ctrlc::Error> {
        let checker = Self::with_flag(Arc::new(AtomicBool::new(false)));
        let stop = Arc::clone(&checker.stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
        Ok(checker)
    }

    fn with_flag(stop: Arc<AtomicBool>) -> Self {
        Self { stop }
    }
}

impl InterruptChecker for SigintChecker {
    fn is_interrupted(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// ハンドラを登録できなかったときの代わり（常に false）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInterruptChecker;

impl InterruptChecker for NoopInterruptChecker {
    fn is_interrupted(&self) -> bool {
        false
    }
}
