//! 1 発言（Turn）と話者（Role）
//!
//! テキストは前後空白除去・連続空白の圧縮・最大 350 文字に丸めた状態で保持する。

use crate::domain::thread_id::ThreadId;
use serde::{Deserialize, Serialize};

/// 1 発言あたりの最大文字数
pub const MAX_CHARS: usize = 350;

/// 話者
///
/// 保存形式・通信形式では `you` / `them`。読み込み時は `self` / `other` も受け付ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 自分（ユーザー本人）の発言
    #[serde(rename = "you", alias = "self")]
    Own,
    /// 相手の発言
    #[serde(rename = "them", alias = "other")]
    Other,
}

impl Role {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::Own => "you",
            Role::Other => "them",
        }
    }

    pub fn from_wire(s: &str) -> Option<Role> {
        match s {
            "you" | "self" => Some(Role::Own),
            "them" | "other" => Some(Role::Other),
            _ => None,
        }
    }
}

/// テキストを正規化する（空白圧縮 → 文字数上限 → 末尾空白除去）
///
/// 丸めた後にもう一度 trim するので、何度適用しても結果は変わらない。
pub fn clamp_text(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(MAX_CHARS).collect();
    capped.trim_end().to_string()
}

/// 1 発言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// 取得時刻（Unix epoch ミリ秒）
    #[serde(rename = "ts")]
    pub timestamp_ms: u64,
}

impl Turn {
    pub fn new(role: Role, text: &str, timestamp_ms: u64) -> Self {
        Self {
            role,
            text: clamp_text(text),
            timestamp_ms,
        }
    }
}

/// ページから読み取った最新メッセージ（まだ履歴に入っていないもの）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedMessage {
    pub role: Role,
    pub text: String,
}

impl ObservedMessage {
    pub fn new(role: Role, text: &str) -> Self {
        Self {
            role,
            text: clamp_text(text),
        }
    }
}

/// 1 回のページ読み取りで得たスレッドと最新メッセージ
///
/// 両者は必ず同じスナップショットから取る（読み取りの間にスレッドが変わっても混ざらない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub thread: ThreadId,
    pub latest: Option<ObservedMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_collapses_whitespace() {
        assert_eq!(clamp_text("  hey \n\t there  "), "hey there");
        assert_eq!(clamp_text("   "), "");
    }

    #[test]
    fn test_clamp_caps_length_and_is_idempotent() {
        let long = "ab ".repeat(300);
        let once = clamp_text(&long);
        assert!(once.chars().count() <= MAX_CHARS);
        assert!(!once.ends_with(' '));
        assert_eq!(clamp_text(&once), once);
    }

    #[test]
    fn test_clamp_counts_chars_not_bytes() {
        let s = "é".repeat(400);
        assert_eq!(clamp_text(&s).chars().count(), MAX_CHARS);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Other).unwrap(), "\"them\"");
        assert_eq!(serde_json::from_str::<Role>("\"self\"").unwrap(), Role::Own);
        assert_eq!(Role::from_wire("other"), Some(Role::Other));
        assert_eq!(Role::from_wire("assistant"), None);
    }
}
