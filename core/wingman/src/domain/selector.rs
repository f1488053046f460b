//! ページモデル用の最小限の CSS セレクタ
//!
//! 対応: セレクタリスト（`,`）、子孫結合子（空白）、型・`*`・`#id`・`.class`、
//! `[attr]` `[attr=v]` `[attr^=v]` `[attr*=v]` `[attr$=v]`。
//! 解釈できないセレクタは何にもマッチしない。

use crate::domain::page::{ElementId, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Contains(String),
    Suffix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSel {
    name: String,
    op: AttrOp,
}

impl AttrSel {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(v) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(s) => v == s,
            // 空文字の ^= *= $= は CSS 同様にマッチしない
            AttrOp::Prefix(s) => !s.is_empty() && v.starts_with(s.as_str()),
            AttrOp::Contains(s) => !s.is_empty() && v.contains(s.as_str()),
            AttrOp::Suffix(s) => !s.is_empty() && v.ends_with(s.as_str()),
        }
    }
}

/// 複合セレクタ（`div#a.b[c]` の単位）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSel>,
}

impl Compound {
    fn matches(&self, page: &Page, id: ElementId) -> bool {
        let el = page.element(id);
        if let Some(tag) = &self.tag {
            if &el.tag != tag {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if el.html_id() != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = el.attr("class").unwrap_or("");
            let have: Vec<&str> = class.split_whitespace().collect();
            if !self.classes.iter().all(|c| have.contains(&c.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|a| a.matches(el.attr(&a.name)))
    }
}

/// 子孫結合子で連結された複合セレクタ列（末尾が対象）
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

impl Complex {
    fn matches(&self, page: &Page, id: ElementId) -> bool {
        let Some((subject, rest)) = self.parts.split_last() else {
            return false;
        };
        if !subject.matches(page, id) {
            return false;
        }
        // 子孫結合子のみなので、最も近い祖先から貪欲に当てれば十分
        let mut remaining = rest.iter().rev().peekable();
        for anc in page.ancestors(id) {
            match remaining.peek() {
                Some(c) if c.matches(page, anc) => {
                    remaining.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        remaining.peek().is_none()
    }
}

/// 解析済みセレクタリスト
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    alternatives: Vec<Complex>,
}

impl SelectorList {
    /// セレクタ文字列を解析する
    ///
    /// # Errors
    /// 未対応の構文や閉じていない括弧・引用符があるとエラーメッセージを返す。
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut alternatives = Vec::new();
        for part in split_top_level(input, ',')? {
            let part = part.trim();
            if part.is_empty() {
                return Err(format!("empty selector in '{}'", input));
            }
            let mut parts = Vec::new();
            for token in split_whitespace_top_level(part)? {
                parts.push(parse_compound(&token)?);
            }
            alternatives.push(Complex { parts });
        }
        if alternatives.is_empty() {
            return Err("empty selector".to_string());
        }
        Ok(Self { alternatives })
    }

    /// 解析に失敗したら何にもマッチしない空リストを返す
    pub fn lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or_default()
    }

    pub fn matches(&self, page: &Page, id: ElementId) -> bool {
        page.get(id).is_some() && self.alternatives.iter().any(|c| c.matches(page, id))
    }
}

/// `scope` 配下（scope 自身は含まない、None なら文書全体）で文書順最初の一致
pub fn query_selector(page: &Page, scope: Option<ElementId>, selector: &str) -> Option<ElementId> {
    let sel = SelectorList::lenient(selector);
    match scope {
        Some(root) => page
            .descendants(root)
            .into_iter()
            .find(|&id| sel.matches(page, id)),
        None => page.all().find(|&id| sel.matches(page, id)),
    }
}

/// 自身から祖先へたどって最初に一致する要素
pub fn closest(page: &Page, id: ElementId, selector: &SelectorList) -> Option<ElementId> {
    if page.get(id).is_none() {
        return None;
    }
    std::iter::once(id)
        .chain(page.ancestors(id))
        .find(|&e| selector.matches(page, e))
}

/// 角括弧・引用符の外側にある `sep` で分割する
fn split_top_level(input: &str, sep: char) -> Result<Vec<String>, String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in input.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                cur.push(c);
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    cur.push(c);
                }
                '[' => {
                    depth += 1;
                    cur.push(c);
                }
                ']' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| format!("unbalanced ']' in '{}'", input))?;
                    cur.push(c);
                }
                c if c == sep && depth == 0 => out.push(std::mem::take(&mut cur)),
                c => cur.push(c),
            },
        }
    }
    if quote.is_some() || depth != 0 {
        return Err(format!("unterminated selector '{}'", input));
    }
    out.push(cur);
    Ok(out)
}

fn split_whitespace_top_level(input: &str) -> Result<Vec<String>, String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in input.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                cur.push(c);
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    cur.push(c);
                }
                '[' => {
                    depth += 1;
                    cur.push(c);
                }
                ']' => {
                    depth = depth.saturating_sub(1);
                    cur.push(c);
                }
                c if c.is_whitespace() && depth == 0 => {
                    if !cur.is_empty() {
                        out.push(std::mem::take(&mut cur));
                    }
                }
                '>' | '+' | '~' if depth == 0 => {
                    return Err(format!("unsupported combinator '{}' in '{}'", c, input));
                }
                c => cur.push(c),
            },
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    Ok(out)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(token: &str) -> Result<Compound, String> {
    let chars: Vec<char> = token.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if pos < chars.len() && chars[pos] == '*' {
        pos += 1;
    } else if pos < chars.len() && is_ident_char(chars[pos]) {
        compound.tag = Some(take_ident(&chars, &mut pos).to_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                let id = take_ident(&chars, &mut pos);
                if id.is_empty() {
                    return Err(format!("empty id in '{}'", token));
                }
                compound.id = Some(id);
            }
            '.' => {
                pos += 1;
                let class = take_ident(&chars, &mut pos);
                if class.is_empty() {
                    return Err(format!("empty class in '{}'", token));
                }
                compound.classes.push(class);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(&chars, &mut pos, token)?);
            }
            c => return Err(format!("unexpected '{}' in '{}'", c, token)),
        }
    }
    Ok(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize, token: &str) -> Result<AttrSel, String> {
    let name = take_ident(chars, pos).to_lowercase();
    if name.is_empty() {
        return Err(format!("empty attribute name in '{}'", token));
    }
    let op_char = match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            return Ok(AttrSel {
                name,
                op: AttrOp::Exists,
            });
        }
        Some('=') => {
            *pos += 1;
            None
        }
        Some(&c @ ('^' | '*' | '$')) if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            Some(c)
        }
        _ => return Err(format!("bad attribute selector in '{}'", token)),
    };
    let value = match chars.get(*pos) {
        Some(&q @ ('"' | '\'')) => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != q {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err(format!("unterminated string in '{}'", token));
            }
            let v: String = chars[start..*pos].iter().collect();
            *pos += 1;
            v
        }
        _ => take_ident(chars, pos),
    };
    if chars.get(*pos) != Some(&']') {
        return Err(format!("missing ']' in '{}'", token));
    }
    *pos += 1;
    let op = match op_char {
        None => AttrOp::Equals(value),
        Some('^') => AttrOp::Prefix(value),
        Some('*') => AttrOp::Contains(value),
        _ => AttrOp::Suffix(value),
    };
    Ok(AttrSel { name, op })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::page::fixture::PageBuilder;
    use crate::domain::page::Rect;

    fn query_selector_all(page: &Page, scope: Option<ElementId>, selector: &str) -> Vec<ElementId> {
        let sel = SelectorList::lenient(selector);
        match scope {
            Some(root) => page.descendants(root).into_iter().filter(|&id| sel.matches(page, id)).collect(),
            None => page.all().filter(|&id| sel.matches(page, id)).collect(),
        }
    }

    fn sample() -> Page {
        let mut b = PageBuilder::new("example.com", "/");
        let r = Rect::default();
        let body = b.push(None, "body", &[], "", r);
        let main = b.push(Some(body), "main", &[("id", "main")], "", r);
        let region = b.push(Some(main), "div", &[("role", "region")], "", r);
        let _li = b.push(
            Some(region),
            "div",
            &[("role", "listitem"), ("class", "msg out"), ("data-testid", "message-row")],
            "hello",
            r,
        );
        let _edit = b.push(
            Some(main),
            "div",
            &[("contenteditable", "true"), ("aria-label", "Messages in conversation with Bob")],
            "",
            r,
        );
        b.build()
    }

    #[test]
    fn test_parse_rejects_unsupported() {
        assert!(SelectorList::parse("div > p").is_err());
        assert!(SelectorList::parse("[role=\"x\"").is_err());
        assert!(SelectorList::parse("a,,b").is_err());
        assert!(SelectorList::parse(":hover").is_err());
        assert!(SelectorList::parse("main [role=\"main\"] article").is_ok());
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let page = sample();
        assert_eq!(query_selector(&page, None, "div >> p"), None);
        assert!(query_selector_all(&page, None, "[").is_empty());
    }

    #[test]
    fn test_attribute_operators() {
        let page = sample();
        assert_eq!(query_selector(&page, None, "[data-testid*=\"message\"]"), Some(3));
        assert_eq!(query_selector(&page, None, "[data-testid^=message]"), Some(3));
        assert_eq!(query_selector(&page, None, "[data-testid$='row']"), Some(3));
        assert_eq!(
            query_selector(&page, None, "[aria-label^=\"Messages in conversation with \"]"),
            Some(4)
        );
        assert_eq!(query_selector(&page, None, "[contenteditable]"), Some(4));
        assert_eq!(query_selector(&page, None, "[data-testid=\"message\"]"), None);
    }

    #[test]
    fn test_descendant_and_list() {
        let page = sample();
        assert_eq!(
            query_selector_all(&page, None, "#main div[role=\"region\"]"),
            vec![2]
        );
        assert_eq!(
            query_selector_all(&page, None, "main [contenteditable=\"true\"], [role=\"listitem\"]"),
            vec![3, 4]
        );
        assert_eq!(query_selector(&page, None, "body main div.msg.out"), Some(3));
        assert_eq!(query_selector(&page, None, "div.missing"), None);
    }

    #[test]
    fn test_scope_excludes_self_but_ancestors_may_be_outside() {
        let page = sample();
        // scope 自身は候補にならない
        assert_eq!(query_selector(&page, Some(1), "main"), None);
        // 祖先側の一致は scope の外でもよい
        assert_eq!(query_selector(&page, Some(2), "main div"), Some(3));
    }

    #[test]
    fn test_closest_includes_self() {
        let page = sample();
        let bubble = SelectorList::lenient("[role=\"listitem\"], li");
        assert_eq!(closest(&page, 3, &bubble), Some(3));
        let main = SelectorList::lenient("main");
        assert_eq!(closest(&page, 3, &main), Some(1));
        assert_eq!(closest(&page, 0, &main), None);
    }
}
