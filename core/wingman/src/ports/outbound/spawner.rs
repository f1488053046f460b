//! 外部呼び出しをループスレッドの外で実行する Outbound ポート
//!
//! 結果はジョブ側がチャネルで返す。状態の更新はループスレッドだけが行う。

use common::error::Error;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait Spawner: Send + Sync {
    /// ジョブを起動する。起動できなければジョブは実行されない。
    fn spawn(&self, job: Job) -> Result<(), Error>;
}
