//! ページのスナップショット（ブラウザ側ブリッジが書き出す DOM の写し）
//!
//! 要素は文書順（pre-order）の配列で、親はインデックスで指す。
//! テキストは innerText 相当（子孫を含む描画テキスト）、矩形はビューポート座標。

use serde::Deserialize;
use std::collections::BTreeMap;

/// 要素インデックス
pub type ElementId = usize;

/// ビューポート座標の矩形
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// 判定に使う算出スタイルだけを持つ
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
    pub position: String,
    pub overflow_y: String,
    pub text_align: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
            position: "static".to_string(),
            overflow_y: "visible".to_string(),
            text_align: "start".to_string(),
        }
    }
}

impl ComputedStyle {
    pub fn is_hidden(&self) -> bool {
        self.display == "none" || self.visibility == "hidden" || self.opacity == 0.0
    }
}

/// 1 要素
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Element {
    pub tag: String,
    pub parent: Option<ElementId>,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub rect: Rect,
    pub style: ComputedStyle,
    pub scroll_height: f64,
    pub client_height: f64,
    pub client_width: f64,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn html_id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// role 属性（小文字）
    pub fn role(&self) -> String {
        self.attr("role").unwrap_or("").to_lowercase()
    }

    /// contenteditable が有効か（自身の属性のみ）
    pub fn is_contenteditable_attr(&self) -> bool {
        matches!(
            self.attr("contenteditable").map(|v| v.to_lowercase()),
            Some(ref v) if v.is_empty() || v == "true" || v == "plaintext-only"
        )
    }

    /// 空白を除いた文字数
    pub fn density(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// ページの場所
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Location {
    pub href: String,
    pub host: String,
    pub path: String,
}

/// ビューポートの大きさ
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
struct PageRaw {
    #[serde(default)]
    location: Location,
    #[serde(default)]
    viewport: Viewport,
    #[serde(default)]
    elements: Vec<Element>,
}

/// ページ全体
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub location: Location,
    pub viewport: Viewport,
    elements: Vec<Element>,
    children: Vec<Vec<ElementId>>,
}

impl Page {
    /// 要素配列から組み立てる
    ///
    /// 親インデックスが自分以降を指す要素は文書順に反するため親なしとして扱う（循環防止）。
    pub fn new(location: Location, viewport: Viewport, mut elements: Vec<Element>) -> Self {
        let mut children = vec![Vec::new(); elements.len()];
        for (i, el) in elements.iter_mut().enumerate() {
            el.tag = el.tag.to_lowercase();
            match el.parent {
                Some(p) if p < i => children[p].push(i),
                Some(_) => el.parent = None,
                None => {}
            }
        }
        Self {
            location,
            viewport,
            elements,
            children,
        }
    }

    /// JSON 文字列から読み込む
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        let raw: PageRaw = serde_json::from_str(s)?;
        Ok(Self::new(raw.location, raw.viewport, raw.elements))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id]
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id).and_then(|e| e.parent)
    }

    /// 祖先（親から根へ）
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            page: self,
            next: self.parent(id),
        }
    }

    /// 子孫（文書順、自身は含まない）
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self
            .children
            .get(root)
            .map(|c| c.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children[id].iter().rev().copied());
        }
        out
    }

    /// 文書全体（文書順）
    pub fn all(&self) -> impl Iterator<Item = ElementId> {
        0..self.elements.len()
    }

    /// body 要素（無ければ先頭の根要素）
    pub fn body(&self) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.tag == "body")
            .or(if self.elements.is_empty() { None } else { Some(0) })
    }

    /// 自身または祖先に contenteditable があるか（isContentEditable 相当）
    pub fn is_editable(&self, id: ElementId) -> bool {
        self.element(id).is_contenteditable_attr()
            || self
                .ancestors(id)
                .any(|a| self.element(a).is_contenteditable_attr())
    }
}

/// 祖先イテレータ
pub struct Ancestors<'a> {
    page: &'a Page,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = self.page.parent(cur);
        Some(cur)
    }
}

/// テスト用のページ組み立て
#[cfg(test)]
pub mod fixture {
    use super::*;

    /// 文書順に要素を積むビルダー
    pub struct PageBuilder {
        location: Location,
        viewport: Viewport,
        elements: Vec<Element>,
    }

    impl PageBuilder {
        pub fn new(host: &str, path: &str) -> Self {
            Self {
                location: Location {
                    href: format!("https://{}{}", host, path),
                    host: host.to_string(),
                    path: path.to_string(),
                },
                viewport: Viewport {
                    width: 1280.0,
                    height: 800.0,
                },
                elements: Vec::new(),
            }
        }

        pub fn href(mut self, href: &str) -> Self {
            self.location.href = href.to_string();
            self
        }

        /// 要素を追加してインデックスを返す
        pub fn push(
            &mut self,
            parent: Option<ElementId>,
            tag: &str,
            attrs: &[(&str, &str)],
            text: &str,
            rect: Rect,
        ) -> ElementId {
            self.elements.push(Element {
                tag: tag.to_string(),
                parent,
                attrs: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                text: text.to_string(),
                rect,
                ..Element::default()
            });
            self.elements.len() - 1
        }

        /// 直前に追加した要素を書き換える
        pub fn last_mut(&mut self) -> &mut Element {
            self.elements.last_mut().expect("no element pushed")
        }

        pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
            &mut self.elements[id]
        }

        pub fn build(self) -> Page {
            Page::new(self.location, self.viewport, self.elements)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_builds_tree() {
        let json = r#"{
            "location": {"href": "https://example.com/t/1", "host": "example.com", "path": "/t/1"},
            "viewport": {"width": 1000, "height": 700},
            "elements": [
                {"tag": "BODY"},
                {"tag": "div", "parent": 0, "attrs": {"role": "Main"}},
                {"tag": "p", "parent": 1, "text": "hello", "rect": {"x": 0, "y": 10, "width": 100, "height": 20}},
                {"tag": "span", "parent": 9}
            ]
        }"#;
        let page = Page::from_json(json).unwrap();
        assert_eq!(page.len(), 4);
        assert_eq!(page.element(0).tag, "body");
        assert_eq!(page.element(1).role(), "main");
        assert_eq!(page.descendants(0), vec![1, 2]);
        assert_eq!(page.ancestors(2).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(page.parent(3), None);
        assert_eq!(page.element(2).rect.bottom(), 30.0);
        assert_eq!(page.body(), Some(0));
        assert!(page.element(2).style.opacity == 1.0);
    }

    #[test]
    fn test_editable_is_inherited() {
        let json = r#"{"elements": [
            {"tag": "body"},
            {"tag": "div", "parent": 0, "attrs": {"contenteditable": "true"}},
            {"tag": "p", "parent": 1},
            {"tag": "p", "parent": 0, "attrs": {"contenteditable": "false"}}
        ]}"#;
        let page = Page::from_json(json).unwrap();
        assert!(page.is_editable(1));
        assert!(page.is_editable(2));
        assert!(!page.is_editable(3));
    }

    #[test]
    fn test_hidden_style() {
        let mut s = ComputedStyle::default();
        assert!(!s.is_hidden());
        s.opacity = 0.0;
        assert!(s.is_hidden());
    }
}
