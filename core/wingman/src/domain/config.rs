//! 実行時設定（config.json のスキーマと既定値）
//!
//! 優先順位: CLI > 環境変数 > config.json > 既定値。合成は adapter::config_loader が行う。

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_OVERLAY_ID: &str = "wingman-overlay";
/// ウォッチドッグがタイムアウト後に待つ猶予
pub const WATCHDOG_GRACE_MS: u64 = 5_000;
/// 起動後、最初の提案を試みるまでの遅延
pub const BOOT_DELAY_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WingmanConfig {
    pub api_base_url: String,
    /// ブラウザ側ブリッジが書き出すページスナップショット
    pub page_snapshot: Option<PathBuf>,
    pub request_timeout_ms: u64,
    pub cooldown_ms: u64,
    pub debounce_ms: u64,
    pub tick_interval_ms: u64,
    pub rotation_interval_ms: u64,
    pub option_count: usize,
    /// 最後の自分の発言からこれ以上空いた挨拶は新しい会話とみなす
    pub quiet_period_ms: u64,
    pub overlay_id: String,
}

impl Default for WingmanConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_snapshot: None,
            request_timeout_ms: 15_000,
            cooldown_ms: 1_800,
            debounce_ms: 450,
            tick_interval_ms: 1_000,
            rotation_interval_ms: 500,
            option_count: 3,
            quiet_period_ms: 20 * 60 * 1_000,
            overlay_id: DEFAULT_OVERLAY_ID.to_string(),
        }
    }
}

impl WingmanConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 応答が来ないまま単一実行ガードを解放するまでの時間
    pub fn watchdog_ms(&self) -> u64 {
        self.request_timeout_ms.saturating_add(WATCHDOG_GRACE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: WingmanConfig =
            serde_json::from_str(r#"{"cooldown_ms": 100, "api_base_url": "http://x"}"#).unwrap();
        assert_eq!(cfg.cooldown_ms, 100);
        assert_eq!(cfg.api_base_url, "http://x");
        assert_eq!(cfg.debounce_ms, 450);
        assert_eq!(cfg.option_count, 3);
        assert_eq!(cfg.quiet_period_ms, 1_200_000);
        assert_eq!(cfg.watchdog_ms(), 20_000);
    }
}
