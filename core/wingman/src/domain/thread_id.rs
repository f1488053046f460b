//! スレッド識別子（保存キーとスレッド切り替え検知にだけ使う不透明な文字列）

use std::fmt;

/// 保存キーの接頭辞
const STORAGE_PREFIX: &str = "wingman_ctx:";

/// スレッド識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// コンテキスト保存用のキー
    pub fn storage_key(&self) -> String {
        format!("{}{}", STORAGE_PREFIX, self.0)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key() {
        let t = ThreadId::new("/direct/t/123");
        assert_eq!(t.storage_key(), "wingman_ctx:/direct/t/123");
        assert_eq!(t.to_string(), "/direct/t/123");
    }
}
