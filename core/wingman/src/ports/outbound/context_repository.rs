//! スレッドごとの会話コンテキストを永続化する Outbound ポート
//!
//! 値は検証前の JSON のまま受け渡しし、整形は usecase 側（ContextStore）が行う。

use common::error::Error;
use serde_json::Value;

pub trait ContextRepository: Send + Sync {
    /// キーに保存された値。未保存なら Ok(None)。
    fn read(&self, key: &str) -> Result<Option<Value>, Error>;

    fn write(&self, key: &str, value: &Value) -> Result<(), Error>;
}
