//! 実行時ディレクトリ（XDG / WINGMAN_HOME 解決結果）
//!
//! EnvResolver::resolve_dirs() で取得し、設定・コンテキスト・ログのパス計算に使う。

use std::path::PathBuf;

/// 解決済みの config / data / state ディレクトリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl Dirs {
    /// すべてを 1 つのルート配下に置く（WINGMAN_HOME 指定時・テスト用）
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
            state_dir: root.join("state"),
        }
    }

    /// 設定ファイル（config/config.json）
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// スレッドごとのコンテキスト格納ディレクトリ（data/contexts）
    pub fn contexts_dir(&self) -> PathBuf {
        self.data_dir.join("contexts")
    }

    /// ログ格納ディレクトリ（state/logs）
    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_under_root() {
        let dirs = Dirs::under("/tmp/wm");
        assert_eq!(dirs.config_file(), PathBuf::from("/tmp/wm/config/config.json"));
        assert_eq!(dirs.contexts_dir(), PathBuf::from("/tmp/wm/data/contexts"));
        assert_eq!(dirs.logs_dir(), PathBuf::from("/tmp/wm/state/logs"));
    }
}
