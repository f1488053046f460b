//! 中継（リレー）Outbound ポート
//!
//! 提案・フィードバック・コミットの 3 種のリクエストを外部サービスへ中継する。
//! 呼び出し側は例外やエラーを受け取らず、常に `{ok, status, data}` の三つ組だけを受け取る。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// リクエスト種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayKind {
    Suggest,
    Feedback,
    Commit,
}

impl RelayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayKind::Suggest => "suggest",
            RelayKind::Feedback => "feedback",
            RelayKind::Commit => "commit",
        }
    }

    /// サービス側のエンドポイントパス
    pub fn path(&self) -> &'static str {
        match self {
            RelayKind::Suggest => "/suggest",
            RelayKind::Feedback => "/feedback",
            RelayKind::Commit => "/commit",
        }
    }
}

/// 中継結果
///
/// 転送・パース失敗時は `ok: false, status: 0` で `data.error` に説明が入る。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub ok: bool,
    pub status: u16,
    #[serde(default)]
    pub data: Value,
}

impl RelayResponse {
    pub fn new(ok: bool, status: u16, data: Value) -> Self {
        Self { ok, status, data }
    }

    /// 転送失敗（接続不可・タイムアウト・パース不能など）
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: 0,
            data: serde_json::json!({ "error": error.into() }),
        }
    }

    /// data.error があれば返す
    pub fn error_message(&self) -> Option<&str> {
        self.data.get("error").and_then(Value::as_str)
    }
}

/// 外部サービスへの中継
///
/// 実装は `common::adapter::HttpRelay`（HTTP POST）やテスト用のスタブ。
/// 実装はリトライ・タイムアウト方針を自前で持つ。呼び出し側へは panic もエラーも返さない。
pub trait Relay: Send + Sync {
    fn send(&self, kind: RelayKind, body: &Value) -> RelayResponse;
}
