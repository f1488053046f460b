//! スレッドごとの会話コンテキスト
//!
//! 最新が末尾の Turn 列。常に最大 10 件・各テキスト 350 文字以内。
//! 保存データが壊れていても `from_value` / `sanitize` を通すと不変条件が回復する。

use super::turn::{clamp_text, Role, Turn};
use serde_json::Value;

/// 保持する最大 Turn 数
pub const MAX_TURNS: usize = 10;

/// 会話コンテキスト（1 スレッド分）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    turns: Vec<Turn>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Turn 列から作る（不変条件は呼び出し側で sanitize して保証する）
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// 1 件だけの履歴
    pub fn single(turn: Turn) -> Self {
        Self { turns: vec![turn] }
    }

    /// 任意の JSON から復元する
    ///
    /// 配列でなければ空。役割が既知で text が文字列の要素だけ残し、
    /// ts が正の数でなければ `now_ms` で補う。
    pub fn from_value(value: &Value, now_ms: u64) -> Self {
        let Some(items) = value.as_array() else {
            return Self::new();
        };
        let turns = items
            .iter()
            .filter_map(|item| {
                let role = item.get("role").and_then(Value::as_str).and_then(Role::from_wire)?;
                let text = item.get("text").and_then(Value::as_str)?;
                let ts = item
                    .get("ts")
                    .and_then(Value::as_f64)
                    .filter(|t| t.is_finite() && *t >= 1.0)
                    .map(|t| t as u64)
                    .unwrap_or(now_ms);
                Some(Turn::new(role, text, ts))
            })
            .collect();
        Self { turns }.sanitize(now_ms)
    }

    /// 保存用 JSON
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.turns).unwrap_or_else(|_| Value::Array(Vec::new()))
    }

    /// 不変条件を回復する（テキスト丸め・時刻補完・末尾 10 件）
    pub fn sanitize(&self, now_ms: u64) -> Self {
        let skip = self.turns.len().saturating_sub(MAX_TURNS);
        let turns = self
            .turns
            .iter()
            .skip(skip)
            .map(|t| Turn {
                role: t.role,
                text: clamp_text(&t.text),
                timestamp_ms: if t.timestamp_ms == 0 { now_ms } else { t.timestamp_ms },
            })
            .collect();
        Self { turns }
    }

    /// 新しい発言を末尾に足したコンテキストを返す
    ///
    /// 丸めた結果が空なら追加せず、sanitize だけ行う。
    pub fn appended(&self, role: Role, text: &str, now_ms: u64) -> Self {
        let text = clamp_text(text);
        if text.is_empty() {
            return self.sanitize(now_ms);
        }
        let mut turns = self.turns.clone();
        turns.push(Turn {
            role,
            text,
            timestamp_ms: now_ms,
        });
        Self { turns }.sanitize(now_ms)
    }

    /// 末尾の自分の発言を落とし、相手の発言で終わるようにしたもの
    pub fn trimmed_to_other(&self) -> Self {
        let mut turns = self.turns.clone();
        while turns.last().map(|t| t.role == Role::Own).unwrap_or(false) {
            turns.pop();
        }
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// 最後の自分の発言
    pub fn last_own(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::Own)
    }

    /// 最後の相手の発言テキスト
    pub fn last_other_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Other)
            .map(|t| t.text.as_str())
    }

    /// 末尾が相手の発言か
    pub fn ends_with_other(&self) -> bool {
        self.last().map(|t| t.role == Role::Other).unwrap_or(false)
    }
}
