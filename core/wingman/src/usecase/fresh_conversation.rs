//! 新しい会話の始まり（久しぶりの挨拶）を見分ける

use crate::domain::{ConversationContext, ObservedMessage, Role};
use common::error::Error;
use regex::Regex;

/// 短い挨拶だけの本文（末尾の空白・!・? は許す）
pub const GREETING_PATTERN: &str =
    r"(?i)^(he(y+|llo)|hi+|yo|sup|hru|wyd|gm|gn|hey there|hi there)[\s!?]*$";

pub struct FreshConversationDetector {
    greeting: Regex,
    quiet_period_ms: u64,
}

impl FreshConversationDetector {
    pub fn new(quiet_period_ms: u64) -> Result<Self, Error> {
        let greeting = Regex::new(GREETING_PATTERN)
            .map_err(|e| Error::system(format!("greeting pattern: {}", e)))?;
        Ok(Self {
            greeting,
            quiet_period_ms,
        })
    }

    pub fn is_greeting(&self, text: &str) -> bool {
        self.greeting.is_match(text)
    }

    /// 相手の挨拶で、かつ自分の最後の発言が無いか quiet period より古いとき true
    pub fn should_reset(&self, message: &ObservedMessage, context: &ConversationContext, now_ms: u64) -> bool {
        if message.role != Role::Other || !self.is_greeting(&message.text) {
            return false;
        }
        match context.last_own() {
            None => true,
            Some(turn) => now_ms.saturating_sub(turn.timestamp_ms) > self.quiet_period_ms,
        }
    }
}
