//! ページからメッセージ単位の要素を見つけて並べる抽出器
//!
//! どのセレクタが外れても広いフォールバックへ落ちるだけで、エラーにはしない。
//! 変化のないページに対しては何度呼んでも同じ並びを返す。

use crate::adapter::site_adapter::SiteAdapter;
use crate::domain::page::{ElementId, Page, Rect};
use crate::domain::selector::{closest, query_selector, SelectorList};
use std::collections::HashSet;

/// スレッド単位のコンテナ（明示的なもの）
const EXPLICIT_CONTAINER: &str = "[aria-label^=\"Messages in conversation with \"]";
/// ルート探索用の入力欄
const COMPOSER_FOR_ROOT: &str = "main [contenteditable=\"true\"], [role=\"textbox\"], textarea";
/// 除外境界用の入力欄
const COMPOSER_FOR_RECT: &str = "main [contenteditable=\"true\"], [role=\"textbox\"][contenteditable=\"true\"], [contenteditable=\"true\"][aria-label], textarea";
const ROOT_FALLBACKS: [&str; 5] = [
    "main [role=\"main\"] [role=\"list\"]",
    "main [role=\"main\"] [data-testid*=\"scroll\"]",
    "main [role=\"main\"] article",
    "[role=\"main\"] [role=\"log\"]",
    "#main div[role=\"region\"]",
];
/// メッセージ 1 件を表す要素の目印
pub const BUBBLE_MARKER: &str =
    "[role=\"listitem\"], [role=\"row\"], article, li, [data-testid*=\"message\"]";

const MAX_NODES: usize = 20;
const BUBBLE_BONUS: f64 = 2000.0;
const DENSITY_CAP: usize = 300;
const MIN_DENSITY: usize = 4;

pub struct DomExtractor {
    overlay_id: String,
    bubble: SelectorList,
}

impl DomExtractor {
    pub fn new(overlay_id: impl Into<String>) -> Self {
        Self {
            overlay_id: overlay_id.into(),
            bubble: SelectorList::lenient(BUBBLE_MARKER),
        }
    }

    /// チャットのルート要素
    ///
    /// 明示コンテナ → 入力欄のスクロール親 → 汎用セレクタ → サイトのコンテナ → body。
    pub fn chat_root(&self, page: &Page, site: &SiteAdapter) -> Option<ElementId> {
        if let Some(el) = query_selector(page, None, EXPLICIT_CONTAINER) {
            return Some(el);
        }
        if let Some(composer) = query_selector(page, None, COMPOSER_FOR_ROOT) {
            if let Some(pane) = find_scroll_parent(page, composer) {
                return Some(pane);
            }
        }
        ROOT_FALLBACKS
            .iter()
            .find_map(|sel| query_selector(page, None, sel))
            .or_else(|| query_selector(page, None, site.container_selector))
            .or_else(|| page.body())
    }

    /// 入力欄の矩形（小さすぎるものは無視）
    pub fn composer_rect(&self, page: &Page) -> Option<Rect> {
        let el = query_selector(page, None, COMPOSER_FOR_RECT)?;
        let r = page.element(el).rect;
        if r.width < 120.0 || r.height < 20.0 {
            return None;
        }
        Some(r)
    }

    /// メッセージ単位の要素へ正規化する（目印の祖先が無ければ自身）
    pub fn to_bubble(&self, page: &Page, id: ElementId) -> ElementId {
        closest(page, id, &self.bubble).unwrap_or(id)
    }

    fn is_overlay(&self, page: &Page, id: ElementId) -> bool {
        let own = |e: ElementId| page.element(e).html_id() == Some(self.overlay_id.as_str());
        own(id) || page.ancestors(id).any(own)
    }

    fn is_candidate(&self, page: &Page, id: ElementId, composer: Option<&Rect>) -> bool {
        if self.is_overlay(page, id) {
            return false;
        }
        let el = page.element(id);
        if el.role() == "textbox" || page.is_editable(id) {
            return false;
        }
        if el.text.trim().chars().count() < 2 {
            return false;
        }
        if el.style.is_hidden() {
            return false;
        }
        let r = &el.rect;
        if r.width < 20.0 || r.height < 12.0 {
            return false;
        }
        if r.bottom() < 0.0 || r.top() > page.viewport.height {
            return false;
        }
        if let Some(c) = composer {
            if r.top() >= c.top() - 8.0 {
                return false;
            }
        }
        if el.style.position == "fixed" && r.top() < 120.0 {
            return false;
        }
        true
    }

    /// 表示中のメッセージ要素（古い順、最大 20 件）
    pub fn message_nodes(&self, page: &Page, site: &SiteAdapter) -> Vec<ElementId> {
        let Some(root) = self.chat_root(page, site) else {
            return Vec::new();
        };
        let composer = self.composer_rect(page);

        let mut scored: Vec<(ElementId, f64)> = page
            .descendants(root)
            .into_iter()
            .filter(|&id| self.is_candidate(page, id, composer.as_ref()))
            .map(|id| {
                let b = self.to_bubble(page, id);
                (b, self.score(page, b))
            })
            .collect();
        // 安定ソートなので同点は文書順のまま
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut seen = HashSet::new();
        let unique: Vec<ElementId> = scored
            .into_iter()
            .filter_map(|(id, _)| seen.insert(id).then_some(id))
            .collect();
        let start = unique.len().saturating_sub(MAX_NODES);
        unique[start..]
            .iter()
            .copied()
            .filter(|&id| page.element(id).density() > MIN_DENSITY)
            .collect()
    }

    fn score(&self, page: &Page, bubble: ElementId) -> f64 {
        let el = page.element(bubble);
        let bonus = if self.bubble.matches(page, bubble) {
            BUBBLE_BONUS
        } else {
            0.0
        };
        el.rect.bottom() + bonus + el.density().min(DENSITY_CAP) as f64
    }
}

/// スクロール可能で十分な大きさの最も近い祖先（自身を含む、body で打ち切り）
fn find_scroll_parent(page: &Page, start: ElementId) -> Option<ElementId> {
    std::iter::once(start)
        .chain(page.ancestors(start))
        .take_while(|&id| page.element(id).tag != "body")
        .find(|&id| {
            let el = page.element(id);
            matches!(el.style.overflow_y.as_str(), "auto" | "scroll")
                && el.scroll_height > el.client_height
                && el.client_height > 200.0
                && el.client_width > 300.0
        })
}
