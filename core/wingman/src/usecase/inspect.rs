//! 単発の確認コマンド（抽出結果の表示・保存済みコンテキストの表示）

use crate::domain::{ConversationContext, ObservedMessage, ThreadId};
use crate::ports::outbound::MessageSource;
use crate::usecase::context_store::ContextStore;
use common::error::Error;
use std::sync::Arc;

pub struct InspectUseCase {
    source: Arc<dyn MessageSource>,
    store: ContextStore,
}

impl InspectUseCase {
    pub fn new(source: Arc<dyn MessageSource>, store: ContextStore) -> Self {
        Self { source, store }
    }

    /// 現在のページから抽出したメッセージ（古い順）
    pub fn extract(&self) -> Vec<ObservedMessage> {
        self.source.messages()
    }

    /// 保存済みコンテキスト
    ///
    /// # Errors
    /// スレッド未指定でページも読めないときは `Error::InvalidArgument`。
    pub fn context(&self, thread: Option<&str>) -> Result<(ThreadId, ConversationContext), Error> {
        let thread = match thread {
            Some(t) => ThreadId::new(t),
            None => self.source.thread_id().ok_or_else(|| {
                Error::invalid_argument(
                    "No page snapshot to infer the thread from; pass a thread id".to_string(),
                )
            })?,
        };
        let context = self.store.load(&thread);
        Ok((thread, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::stubs::{CapturingLog, FakeMessageSource, FixedClock, MemoryContextRepository};
    use crate::domain::Role;
    use serde_json::json;

    #[test]
    fn test_context_for_current_and_explicit_thread() {
        let repo = Arc::new(MemoryContextRepository::new());
        repo.put("wingman_ctx:/t/9", json!([{"role": "them", "text": "yo", "ts": 3}]));
        let source = Arc::new(FakeMessageSource::new("/t/9"));
        source.show(Role::Other, "yo");
        let store = ContextStore::new(repo, Arc::new(FixedClock::new(10)), Arc::new(CapturingLog::new()));
        let uc = InspectUseCase::new(source, store);

        let (t, ctx) = uc.context(None).unwrap();
        assert_eq!(t.as_str(), "/t/9");
        assert_eq!(ctx.len(), 1);
        let (_, other) = uc.context(Some("/t/none")).unwrap();
        assert!(other.is_empty());
        assert_eq!(uc.extract().len(), 1);
    }
}
