//! チャット画面からスレッドとメッセージを読み取る Outbound ポート
//!
//! サイトごとの DOM ヒューリスティクスはこの trait の裏に隔離し、
//! トリガー制御やコンテキスト管理はフェイク実装でテストできるようにする。

use crate::domain::{Observation, ObservedMessage, ThreadId};

pub trait MessageSource: Send + Sync {
    /// 現在のスレッド識別子（ページ自体が読めなければ None）
    fn thread_id(&self) -> Option<ThreadId>;

    /// スレッドと最新メッセージを同じページから読む（ページ自体が読めなければ None）
    ///
    /// 最新メッセージは本文が空なら None。
    fn observe(&self) -> Option<Observation>;

    /// 画面上のメッセージ列（古い順）
    fn messages(&self) -> Vec<ObservedMessage>;

    /// フィードバックの meta に載せるサイト名（ホスト名）
    fn site(&self) -> String;
}
