//! 最新の提案バッチと選択肢ごとの評価（コミット待ち）

use serde_json::{json, Value};

/// 選択肢の評価
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rating {
    #[default]
    Unset,
    Positive,
    Negative,
}

impl Rating {
    /// ワイヤ表現（"Y" / "N" / null）
    pub fn to_wire(self) -> Value {
        match self {
            Rating::Unset => Value::Null,
            Rating::Positive => Value::from("Y"),
            Rating::Negative => Value::from("N"),
        }
    }
}

/// 個別フィードバックのラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLabel {
    Up,
    Down,
    Clicked,
}

impl FeedbackLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackLabel::Up => "up",
            FeedbackLabel::Down => "down",
            FeedbackLabel::Clicked => "clicked",
        }
    }

    /// 評価に対応するラベル（Clicked は評価を変えない）
    pub fn rating(self) -> Option<Rating> {
        match self {
            FeedbackLabel::Up => Some(Rating::Positive),
            FeedbackLabel::Down => Some(Rating::Negative),
            FeedbackLabel::Clicked => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRecord {
    pub text: String,
    pub stage: String,
    pub heat: i64,
    pub rating: Rating,
    pub reason: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSnapshot {
    pub text: String,
    pub stage: String,
    pub heat: i64,
    pub options: Vec<OptionRecord>,
}

impl PendingSnapshot {
    /// 提案成功時に作り直す。全選択肢は未評価で始まる。
    pub fn build(text: &str, stage: &str, heat: i64, options: &[String], now_ms: u64) -> Self {
        Self {
            text: text.to_string(),
            stage: stage.to_string(),
            heat,
            options: options
                .iter()
                .map(|o| OptionRecord {
                    text: o.clone(),
                    stage: stage.to_string(),
                    heat,
                    rating: Rating::Unset,
                    reason: String::new(),
                    timestamp_ms: now_ms,
                })
                .collect(),
        }
    }

    /// 評価を書き込む。範囲外なら false。
    pub fn rate(&mut self, index: usize, rating: Rating) -> bool {
        match self.options.get_mut(index) {
            Some(rec) => {
                rec.rating = rating;
                true
            }
            None => false,
        }
    }

    pub fn option_text(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(|o| o.text.as_str())
    }

    /// 送る内容があるか（本文と選択肢の両方が必要）
    pub fn is_committable(&self) -> bool {
        !self.text.is_empty() && !self.options.is_empty()
    }

    /// コミット要求の本文
    pub fn commit_payload(&self) -> Value {
        json!({
            "text": self.text,
            "stage": self.stage,
            "heat": self.heat,
            "options": self.options.iter().map(|o| json!({
                "text": o.text,
                "rating": o.rating.to_wire(),
                "reason": o.reason,
            })).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn test_build_all_unset() {
        let s = PendingSnapshot::build("hi", "banter", 1, &opts(), 7);
        assert_eq!(s.options.len(), 3);
        assert!(s.options.iter().all(|o| o.rating == Rating::Unset));
        assert!(s.options.iter().all(|o| o.timestamp_ms == 7 && o.heat == 1));
    }

    #[test]
    fn test_rate_and_payload() {
        let mut s = PendingSnapshot::build("hi", "banter", 2, &opts(), 0);
        assert!(s.rate(1, Rating::Positive));
        assert!(s.rate(2, Rating::Negative));
        assert!(!s.rate(3, Rating::Positive));
        let p = s.commit_payload();
        assert_eq!(p["text"], "hi");
        assert_eq!(p["heat"], 2);
        assert_eq!(p["options"][0]["rating"], Value::Null);
        assert_eq!(p["options"][1]["rating"], "Y");
        assert_eq!(p["options"][2]["rating"], "N");
        assert_eq!(p["options"][2]["text"], "c");
    }

    #[test]
    fn test_committable() {
        assert!(!PendingSnapshot::build("", "banter", 1, &opts(), 0).is_committable());
        assert!(!PendingSnapshot::build("hi", "banter", 1, &[], 0).is_committable());
        assert!(PendingSnapshot::build("hi", "banter", 1, &opts(), 0).is_committable());
    }
}
