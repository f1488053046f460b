//! 利用者の操作を受け取る Outbound ポート

use crate::domain::Intent;

pub trait IntentSource: Send + Sync {
    /// 溜まっている操作を 1 件取り出す（ブロックしない）
    fn poll(&self) -> Option<Intent>;
}
