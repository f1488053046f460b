//! 標準環境変数解決実装（std::env を委譲）

use crate::domain::{Dirs, HomeDir};
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "wingman";

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

impl EnvResolver for StdEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|s| !s.is_empty())
    }

    fn resolve_home_dir(&self) -> Result<HomeDir, Error> {
        resolve_home_with(|k| self.var(k))
    }

    fn resolve_dirs(&self) -> Result<Dirs, Error> {
        resolve_dirs_with(|k| self.var(k))
    }
}

/// 変数参照関数からホームディレクトリを解決する（テストでは HashMap を渡す）
pub fn resolve_home_with(lookup: impl Fn(&str) -> Option<String>) -> Result<HomeDir, Error> {
    if let Some(home) = lookup("WINGMAN_HOME") {
        return Ok(HomeDir::new(PathBuf::from(home)));
    }
    let config_base = xdg_base(&lookup, "XDG_CONFIG_HOME", ".config")?;
    Ok(HomeDir::new(config_base.join(APP_DIR)))
}

/// 変数参照関数から config / data / state ディレクトリを解決する
pub fn resolve_dirs_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Dirs, Error> {
    if let Some(home) = lookup("WINGMAN_HOME") {
        return Ok(Dirs::under(home));
    }
    Ok(Dirs {
        config_dir: xdg_base(&lookup, "XDG_CONFIG_HOME", ".config")?.join(APP_DIR),
        data_dir: xdg_base(&lookup, "XDG_DATA_HOME", ".local/share")?.join(APP_DIR),
        state_dir: xdg_base(&lookup, "XDG_STATE_HOME", ".local/state")?.join(APP_DIR),
    })
}

/// `$<xdg_var>`、無ければ `$HOME/<fallback>`
fn xdg_base(
    lookup: &impl Fn(&str) -> Option<String>,
    xdg_var: &str,
    fallback: &str,
) -> Result<PathBuf, Error> {
    lookup(xdg_var)
        .map(PathBuf::from)
        .or_else(|| lookup("HOME").map(|h| PathBuf::from(h).join(fallback)))
        .ok_or_else(|| Error::env("HOME is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_wingman_home_wins() {
        let dirs = resolve_dirs_with(lookup_from(&[
            ("WINGMAN_HOME", "/opt/wm"),
            ("HOME", "/home/u"),
        ]))
        .unwrap();
        assert_eq!(dirs, Dirs::under("/opt/wm"));
        let home = resolve_home_with(lookup_from(&[("WINGMAN_HOME", "/opt/wm")])).unwrap();
        assert_eq!(home.as_path(), std::path::Path::new("/opt/wm"));
    }

    #[test]
    fn test_xdg_and_home_fallbacks() {
        let dirs = resolve_dirs_with(lookup_from(&[
            ("HOME", "/home/u"),
            ("XDG_DATA_HOME", "/data"),
        ]))
        .unwrap();
        assert_eq!(dirs.config_dir, PathBuf::from("/home/u/.config/wingman"));
        assert_eq!(dirs.data_dir, PathBuf::from("/data/wingman"));
        assert_eq!(dirs.state_dir, PathBuf::from("/home/u/.local/state/wingman"));
    }

    #[test]
    fn test_missing_home_is_env_error() {
        let err = resolve_dirs_with(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Env(_)));
    }
}
