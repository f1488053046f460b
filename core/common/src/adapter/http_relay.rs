//! HTTP で外部サービスへ中継する Relay 実装
//!
//! `POST {base_url}/{suggest|feedback|commit}` に JSON を送り、結果を `{ok, status, data}` に正規化する。
//! 転送失敗・タイムアウトは `ok: false, status: 0`。リトライはしない。

use crate::error::Error;
use crate::ports::outbound::{Relay, RelayKind, RelayResponse};
use serde_json::Value;
use std::time::Duration;

/// reqwest（blocking）による Relay 実装
pub struct HttpRelay {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRelay {
    /// 新しい中継を作成
    ///
    /// # Arguments
    /// * `base_url` - サービスのベース URL（例: `http://127.0.0.1:8000`）
    /// * `timeout` - 1 リクエストあたりのタイムアウト
    ///
    /// # Errors
    /// HTTP クライアントの初期化に失敗した場合。
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url_for(&self, kind: RelayKind) -> String {
        format!("{}{}", self.base_url, kind.path())
    }
}

impl Relay for HttpRelay {
    fn send(&self, kind: RelayKind, body: &Value) -> RelayResponse {
        let response = match self
            .client
            .post(self.url_for(kind))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
        {
            Ok(r) => r,
            Err(e) => return RelayResponse::transport_failure(e.to_string()),
        };

        let status = response.status();
        let text = match response.text() {
            Ok(t) => t,
            Err(e) => return RelayResponse::transport_failure(e.to_string()),
        };
        RelayResponse::new(status.is_success(), status.as_u16(), parse_body(kind, &text))
    }
}

/// レスポンス本文を data に変換する
///
/// JSON でなければ、コミットでは本文をエラーとして残し、それ以外は空オブジェクト。
fn parse_body(kind: RelayKind, text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(v) => v,
        Err(_) if kind == RelayKind::Commit && !text.is_empty() => {
            serde_json::json!({ "error": text })
        }
        Err(_) => serde_json::json!({}),
    }
}
