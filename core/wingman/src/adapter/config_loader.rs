//! 設定の合成（adapter 層）
//!
//! CLI > 環境変数（WINGMAN_API / WINGMAN_PAGE）> config.json > 既定値。

use crate::domain::WingmanConfig;
use common::domain::Dirs;
use common::error::Error;
use common::ports::outbound::{EnvResolver, FileSystem};
use std::path::PathBuf;

/// CLI から渡される上書き値
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub page_snapshot: Option<PathBuf>,
}

/// 設定を読み込んで合成する
///
/// # Errors
/// config.json が存在するのに読めない・JSON として不正な場合は `Error::Config`。
pub fn load_config(
    fs: &dyn FileSystem,
    env: &dyn EnvResolver,
    dirs: &Dirs,
    overrides: &ConfigOverrides,
) -> Result<WingmanConfig, Error> {
    let path = dirs.config_file();
    let mut config = if fs.exists(&path) {
        let text = fs.read_to_string(&path)?;
        serde_json::from_str::<WingmanConfig>(&text)
            .map_err(|e| Error::config(format!("Invalid '{}': {}", path.display(), e)))?
    } else {
        WingmanConfig::default()
    };

    if let Some(api) = env.var("WINGMAN_API") {
        config.api_base_url = api;
    }
    if let Some(page) = env.var("WINGMAN_PAGE") {
        config.page_snapshot = Some(PathBuf::from(page));
    }

    if let Some(api) = &overrides.api_base_url {
        config.api_base_url = api.clone();
    }
    if let Some(page) = &overrides.page_snapshot {
        config.page_snapshot = Some(page.clone());
    }

    if config.option_count == 0 {
        return Err(Error::config("option_count must be at least 1"));
    }
    if config.tick_interval_ms == 0 || config.rotation_interval_ms == 0 {
        return Err(Error::config("tick and rotation intervals must be positive"));
    }
    if config.request_timeout_ms == 0 {
        return Err(Error::config("request_timeout_ms must be positive"));
    }
    Ok(config)
}
