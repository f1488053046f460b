//! ページスナップショットを取得する Outbound ポート

use crate::domain::Page;

/// 現在のページの写しを返す能力
///
/// 読めない・壊れているときは None（DOM 形状の取りこぼしとして扱い、表には出さない）。
pub trait PageSource: Send + Sync {
    fn snapshot(&self) -> Option<Page>;
}
