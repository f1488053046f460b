//! 提案サービスへの要求と応答の形

use crate::domain::context::ConversationContext;
use crate::domain::context::MAX_TURNS;
use crate::domain::snapshot::FeedbackLabel;
use serde_json::{json, Value};

pub const DEFAULT_STAGE: &str = "banter";
pub const DEFAULT_HEAT: i64 = 1;
pub const DEFAULT_OPTION_COUNT: usize = 3;

/// 提案要求の本文（直近 10 ターンの role/text と選択肢数）
pub fn suggest_payload(context: &ConversationContext, option_count: usize) -> Value {
    let turns = context.turns();
    let start = turns.len().saturating_sub(MAX_TURNS);
    json!({
        "context": turns[start..].iter().map(|t| json!({
            "role": t.role.as_wire(),
            "text": t.text,
        })).collect::<Vec<_>>(),
        "n": option_count,
    })
}

/// 提案応答。欠けた・不正なフィールドは個別に既定値へ。
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestResponse {
    pub options: Vec<String>,
    pub stage: String,
    pub heat: i64,
    pub debug: Value,
}

impl SuggestResponse {
    pub fn from_value(data: &Value) -> Self {
        let options = data
            .get("options")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|o| match o {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let stage = data
            .get("stage")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STAGE)
            .to_string();
        let heat = ["spice", "heat"]
            .iter()
            .find_map(|k| data.get(*k).and_then(Value::as_f64))
            .filter(|h| h.is_finite())
            .map(|h| h.round() as i64)
            .unwrap_or(DEFAULT_HEAT);
        let debug = data
            .get("debug")
            .filter(|d| d.is_object())
            .cloned()
            .unwrap_or_else(|| json!({}));
        Self {
            options,
            stage,
            heat,
            debug,
        }
    }
}

/// フィードバックの付帯情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMeta {
    pub site: String,
    pub thread: String,
    pub history_len: usize,
    pub index: usize,
}

/// 個別フィードバック要求の本文
pub fn feedback_payload(
    stage: &str,
    latest: &str,
    option: &str,
    label: FeedbackLabel,
    meta: &FeedbackMeta,
) -> Value {
    json!({
        "stage": stage,
        "latest": latest,
        "option": option,
        "label": label.as_str(),
        "meta": {
            "site": meta.site,
            "thread": meta.thread,
            "history_len": meta.history_len,
            "index": meta.index,
        },
    })
}
