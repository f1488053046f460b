//! 中継呼び出しを Spawner で実行し、結果をチャネルで受け取る
//!
//! ジョブは応答を送るだけで状態には触れない。受け取り（drain）は監視ループのスレッドで行う。

use common::error::Error;
use common::ports::outbound::{Relay, RelayKind, RelayResponse};
use serde_json::Value;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::ports::outbound::Spawner;

/// 1 件の完了通知
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub id: u64,
    pub kind: RelayKind,
    pub response: RelayResponse,
}

pub struct RelayDispatcher {
    relay: Arc<dyn Relay>,
    spawner: Arc<dyn Spawner>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    next_id: u64,
}

impl RelayDispatcher {
    pub fn new(relay: Arc<dyn Relay>, spawner: Arc<dyn Spawner>) -> Self {
        let (tx, rx) = channel();
        Self {
            relay,
            spawner,
            tx,
            rx,
            next_id: 1,
        }
    }

    /// 要求を起動して要求 id を返す
    ///
    /// # Errors
    /// Spawner がジョブを起動できなかった場合。
    pub fn dispatch(&mut self, kind: RelayKind, body: Value) -> Result<u64, Error> {
        let id = self.next_id;
        self.next_id += 1;
        let relay = Arc::clone(&self.relay);
        let tx = self.tx.clone();
        self.spawner.spawn(Box::new(move || {
            let response = relay.send(kind, &body);
            // 受け手が終了済みなら捨てる
            let _ = tx.send(Completion { id, kind, response });
        }))?;
        Ok(id)
    }

    /// 届いている完了通知をすべて取り出す（ブロックしない）
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }
}
