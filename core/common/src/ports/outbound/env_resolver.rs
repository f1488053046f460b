//! 環境変数解決 Outbound ポート
//!
//! ホーム・データ・状態ディレクトリと、設定を上書きする環境変数を解決する。
//! usecase / wiring はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::{Dirs, HomeDir};
use crate::error::Error;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// 環境変数を読む（未設定・空文字は None）
    fn var(&self, name: &str) -> Option<String>;

    /// ホームディレクトリを環境変数から解決する
    ///
    /// 優先順位:
    /// 1. WINGMAN_HOME（設定されていれば）
    /// 2. $XDG_CONFIG_HOME/wingman（XDG_CONFIG_HOME が設定されていれば）
    /// 3. $HOME/.config/wingman
    fn resolve_home_dir(&self) -> Result<HomeDir, Error>;

    /// config / data / state ディレクトリを解決する
    ///
    /// WINGMAN_HOME があればその配下にまとめる。無ければ XDG の各ディレクトリ配下の `wingman`。
    fn resolve_dirs(&self) -> Result<Dirs, Error>;
}
