//! 表示状態（heat / stage / options）とパイプラインの状態通知

use serde::Serialize;

/// 表示上の heat の上限
pub const MAX_DISPLAY_HEAT: i64 = 4;

/// 提示層が描画する内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderState {
    pub heat: i64,
    pub stage: String,
    pub options: Vec<String>,
}

impl RenderState {
    pub fn new(heat: i64, stage: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            heat,
            stage: stage.into(),
            options,
        }
    }

    /// 内容比較用の安定した直列化
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// 前回描画と内容が異なるか（前回なしなら常に true）
    pub fn differs_from(&self, previous: Option<&RenderState>) -> bool {
        previous.map_or(true, |p| p.fingerprint() != self.fingerprint())
    }

    /// 表示用に 0..=4 へ丸めた heat
    pub fn display_heat(&self) -> i64 {
        self.heat.clamp(0, MAX_DISPLAY_HEAT)
    }
}

/// パイプラインの状態（助言的な表示用シグナル）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Thinking,
    Ready,
    Error,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Thinking => "thinking",
            Status::Ready => "ready",
            Status::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
