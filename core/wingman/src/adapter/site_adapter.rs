//! サイトごとのスレッド識別とチャットコンテナの対応表
//!
//! ホスト名の末尾一致で最初に当たったものを使い、どれにも当たらなければ汎用版を使う。

use crate::domain::page::Location;
use crate::domain::ThreadId;

/// 1 サイト分の定義
#[derive(Debug)]
pub struct SiteAdapter {
    pub name: &'static str,
    host_suffix: &'static str,
    thread_id: fn(&Location) -> String,
    /// メッセージ一覧を包むコンテナのセレクタ
    pub container_selector: &'static str,
}

fn by_path(location: &Location) -> String {
    location.path.clone()
}

/// href の先頭 5 区切り（scheme, 空, host, 2 階層）
fn by_href_prefix(location: &Location) -> String {
    location
        .href
        .split('/')
        .take(5)
        .collect::<Vec<_>>()
        .join("/")
}

static SITES: [SiteAdapter; 3] = [
    SiteAdapter {
        name: "instagram",
        host_suffix: "instagram.com",
        thread_id: by_path,
        container_selector: "main, [role=\"main\"]",
    },
    SiteAdapter {
        name: "whatsapp",
        host_suffix: "web.whatsapp.com",
        thread_id: by_href_prefix,
        container_selector: "#main div[role=\"region\"]",
    },
    SiteAdapter {
        name: "messenger",
        host_suffix: "messenger.com",
        thread_id: by_path,
        container_selector: "[role=\"main\"] [role=\"log\"], [role=\"main\"]",
    },
];

static GENERIC: SiteAdapter = SiteAdapter {
    name: "generic",
    host_suffix: "",
    thread_id: by_path,
    container_selector: "[role=\"main\"], [role=\"log\"], main, body",
};

impl SiteAdapter {
    /// ホスト名に対応する定義を返す
    pub fn for_host(host: &str) -> &'static SiteAdapter {
        let host = host.to_lowercase();
        SITES
            .iter()
            .find(|s| host.ends_with(s.host_suffix))
            .unwrap_or(&GENERIC)
    }

    /// スレッド識別子。空なら href 全体で代用する。
    pub fn thread_id(&self, location: &Location) -> ThreadId {
        let id = (self.thread_id)(location);
        if id.trim().is_empty() {
            ThreadId::new(location.href.clone())
        } else {
            ThreadId::new(id)
        }
    }
}
