//! ブラウザ側ブリッジが書き出す JSON スナップショットを読む PageSource

use crate::domain::Page;
use crate::ports::outbound::PageSource;
use common::ports::outbound::FileSystem;
use std::path::PathBuf;
use std::sync::Arc;

pub struct JsonPageSource {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonPageSource {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl PageSource for JsonPageSource {
    fn snapshot(&self) -> Option<Page> {
        // 書き換え途中で読んだ場合も None になり、次の周で読み直す
        let text = self.fs.read_to_string(&self.path).ok()?;
        Page::from_json(&text).ok()
    }
}
