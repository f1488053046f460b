//! スレッドごとの会話コンテキストの読み書き
//!
//! 保存・読み込みの失敗は握りつぶしてログに残す。読めなければ空のコンテキストを返す。
//! 整形（sanitize）は読み込み時・保存時・追記時のすべてで行う。

use crate::domain::{ConversationContext, Role, ThreadId};
use crate::ports::outbound::ContextRepository;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord};
use std::sync::Arc;

pub struct ContextStore {
    repo: Arc<dyn ContextRepository>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn Log>,
}

impl ContextStore {
    pub fn new(repo: Arc<dyn ContextRepository>, clock: Arc<dyn Clock>, log: Arc<dyn Log>) -> Self {
        Self { repo, clock, log }
    }

    pub fn load(&self, thread: &ThreadId) -> ConversationContext {
        let now = self.clock.now_ms();
        match self.repo.read(&thread.storage_key()) {
            Ok(Some(value)) => ConversationContext::from_value(&value, now),
            Ok(None) => ConversationContext::new(),
            Err(e) => {
                self.log.emit(
                    LogRecord::new(LogLevel::Warn, "context load failed; starting empty")
                        .layer("usecase")
                        .kind("context")
                        .field("thread", thread.as_str())
                        .field("error", e.to_string()),
                );
                ConversationContext::new()
            }
        }
    }

    pub fn save(&self, thread: &ThreadId, context: &ConversationContext) {
        let clean = self.sanitize(context);
        if let Err(e) = self.repo.write(&thread.storage_key(), &clean.to_value()) {
            self.log.emit(
                LogRecord::new(LogLevel::Warn, "context save failed")
                    .layer("usecase")
                    .kind("context")
                    .field("thread", thread.as_str())
                    .field("error", e.to_string()),
            );
        }
    }

    /// 現在時刻で 1 ターン追記する（整形後に空になる本文は追記しない）
    pub fn append(&self, context: &ConversationContext, role: Role, text: &str) -> ConversationContext {
        context.appended(role, text, self.clock.now_ms())
    }

    pub fn sanitize(&self, context: &ConversationContext) -> ConversationContext {
        context.sanitize(self.clock.now_ms())
    }
}
