//! コンテキストをキーごとに 1 ファイル（JSON）で保存する ContextRepository
//!
//! キーはファイル名 1 要素に収まるようエスケープする。書き込みは一時ファイル経由。
//! エスケープ後が長すぎるキーは先頭部分と SHA-256 で短くする。

use crate::ports::outbound::ContextRepository;
use common::error::Error;
use common::ports::outbound::FileSystem;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;

pub struct FileContextRepository {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl FileContextRepository {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// ファイル名の幹（`.json` の前）の上限。多くのファイルシステムの 255 バイトに余裕を残す。
const MAX_STEM: usize = 200;
/// 短縮したときに残す先頭部分
const KEPT_PREFIX: usize = 120;

/// キーをファイル名の幹にする。長すぎれば `先頭~sha256(キー)` に畳む。
fn file_stem(key: &str) -> String {
    let escaped = escape_key(key);
    if escaped.len() <= MAX_STEM {
        return escaped;
    }
    // escape_key の出力は ASCII のみなのでバイト位置で切れる
    format!(
        "{}~{:x}",
        &escaped[..KEPT_PREFIX],
        Sha256::digest(key.as_bytes())
    )
}

/// 英数字と `-` `_` 以外を %XX にする（`.` も含めてエスケープし、`..` 等を作らない）
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

impl ContextRepository for FileContextRepository {
    fn read(&self, key: &str) -> Result<Option<Value>, Error> {
        let path = self.path_for(key);
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        let text = self.fs.read_to_string(&path)?;
        let value = serde_json::from_str(&text).map_err(|e| {
            Error::json(format!("Corrupt context '{}': {}", path.display(), e))
        })?;
        Ok(Some(value))
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), Error> {
        self.fs.create_dir_all(&self.dir)?;
        let text = serde_json::to_string(value)?;
        self.fs.write_atomic(&self.path_for(key), &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::StdFileSystem;
    use serde_json::json;

    #[test]
    fn test_escape_key_single_component() {
        assert_eq!(escape_key("wingman_ctx:/t/1"), "wingman_ctx%3A%2Ft%2F1");
        assert_eq!(escape_key(".."), "%2E%2E");
        assert!(!escape_key("a/../b").contains('/'));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileContextRepository::new(Arc::new(StdFileSystem), dir.path().join("contexts"));
        assert_eq!(repo.read("wingman_ctx:/t/1").unwrap(), None);
        let v = json!([{"role": "them", "text": "hi", "ts": 1}]);
        repo.write("wingman_ctx:/t/1", &v).unwrap();
        assert_eq!(repo.read("wingman_ctx:/t/1").unwrap(), Some(v));
        assert_eq!(repo.read("wingman_ctx:/t/2").unwrap(), None);
    }

    #[test]
    fn test_long_key_is_shortened_and_stable() {
        let key = format!("wingman_ctx:/direct/t/{}", "ab/".repeat(60));
        let stem = file_stem(&key);
        assert!(stem.len() <= MAX_STEM);
        assert!(stem.starts_with("wingman_ctx%3A%2Fdirect"));
        assert_eq!(stem, file_stem(&key));

        let other = format!("wingman_ctx:/direct/t/{}c", "ab/".repeat(60));
        assert_ne!(stem, file_stem(&other));
        assert_eq!(file_stem("wingman_ctx:/t/1"), "wingman_ctx%3A%2Ft%2F1");
    }

    #[test]
    fn test_long_key_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileContextRepository::new(Arc::new(StdFileSystem), dir.path().join("contexts"));
        let key = format!("wingman_ctx:/direct/t/{}", "ab/".repeat(60));
        let v = json!([{"role": "them", "text": "long thread", "ts": 1}]);
        repo.write(&key, &v).unwrap();
        assert_eq!(repo.read(&key).unwrap(), Some(v));
        let name = repo.path_for(&key);
        assert!(name.file_name().unwrap().len() < 255);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileContextRepository::new(Arc::new(StdFileSystem), dir.path());
        std::fs::write(repo.path_for("k"), "not json").unwrap();
        assert!(repo.read("k").is_err());
    }
}
