//! メッセージ要素が自分のものか相手のものかを推定する
//!
//! 優先順: 所有者属性 → アクセシブル名の "you" → 行の text-align。どれも無ければ相手。

use crate::domain::page::{ElementId, Page};
use crate::domain::selector::{closest, SelectorList};
use crate::domain::Role;

const OWNER_SELF: &str = "[data-owner=\"self\"]";
const ROW: &str = "[role=\"listitem\"]";

pub struct RoleClassifier {
    owner_self: SelectorList,
    row: SelectorList,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleClassifier {
    pub fn new() -> Self {
        Self {
            owner_self: SelectorList::lenient(OWNER_SELF),
            row: SelectorList::lenient(ROW),
        }
    }

    pub fn classify(&self, page: &Page, bubble: ElementId) -> Role {
        let Some(el) = page.get(bubble) else {
            return Role::Other;
        };
        if closest(page, bubble, &self.owner_self).is_some() {
            return Role::Own;
        }
        if el.attr("aria-label").is_some_and(mentions_you) {
            return Role::Own;
        }
        let row = closest(page, bubble, &self.row)
            .or_else(|| page.parent(bubble))
            .unwrap_or(bubble);
        match page.element(row).style.text_align.as_str() {
            "end" | "right" => Role::Own,
            _ => Role::Other,
        }
    }
}

/// 単語として "you" を含むか（"young" などは除く）
fn mentions_you(label: &str) -> bool {
    label
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w.eq_ignore_ascii_case("you"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::page::fixture::PageBuilder;
    use crate::domain::page::Rect;

    #[test]
    fn test_owner_attribute_first() {
        let mut b = PageBuilder::new("x.test", "/");
        let body = b.push(None, "body", &[], "", Rect::default());
        let wrap = b.push(Some(body), "div", &[("data-owner", "self")], "", Rect::default());
        let msg = b.push(Some(wrap), "li", &[], "sent by me", Rect::default());
        let page = b.build();
        assert_eq!(RoleClassifier::new().classify(&page, msg), Role::Own);
    }

    #[test]
    fn test_aria_label_word() {
        let mut b = PageBuilder::new("x.test", "/");
        let body = b.push(None, "body", &[], "", Rect::default());
        let mine = b.push(Some(body), "li", &[("aria-label", "You sent: hi")], "hi", Rect::default());
        let theirs = b.push(Some(body), "li", &[("aria-label", "Young Sam: hi")], "hi", Rect::default());
        let page = b.build();
        let c = RoleClassifier::new();
        assert_eq!(c.classify(&page, mine), Role::Own);
        assert_eq!(c.classify(&page, theirs), Role::Other);
    }

    #[test]
    fn test_alignment_of_row() {
        let mut b = PageBuilder::new("x.test", "/");
        let body = b.push(None, "body", &[], "", Rect::default());
        let row = b.push(Some(body), "div", &[("role", "listitem")], "", Rect::default());
        b.last_mut().style.text_align = "right".to_string();
        let inner = b.push(Some(row), "article", &[], "sent", Rect::default());
        let parent = b.push(Some(body), "div", &[], "", Rect::default());
        b.last_mut().style.text_align = "end".to_string();
        let other_inner = b.push(Some(parent), "article", &[], "also sent", Rect::default());
        let plain = b.push(Some(body), "article", &[], "received", Rect::default());
        let page = b.build();
        let c = RoleClassifier::new();
        assert_eq!(c.classify(&page, inner), Role::Own);
        assert_eq!(c.classify(&page, other_inner), Role::Own);
        assert_eq!(c.classify(&page, plain), Role::Other);
    }

    #[test]
    fn test_unknown_element_defaults_to_other() {
        let page = PageBuilder::new("x.test", "/").build();
        assert_eq!(RoleClassifier::new().classify(&page, 5), Role::Other);
    }
}
