//! ページスナップショットを読んで MessageSource を満たす実装
//!
//! サイト定義・抽出器・役割推定を束ねる。呼ぶたびにスナップショットを読み直す。

use crate::adapter::dom_extractor::DomExtractor;
use crate::adapter::role_classifier::RoleClassifier;
use crate::adapter::site_adapter::SiteAdapter;
use crate::domain::page::{ElementId, Page};
use crate::domain::{Observation, ObservedMessage, ThreadId};
use crate::ports::outbound::{MessageSource, PageSource};
use std::sync::Arc;

pub struct DomMessageSource {
    pages: Arc<dyn PageSource>,
    extractor: DomExtractor,
    classifier: RoleClassifier,
}

impl DomMessageSource {
    pub fn new(pages: Arc<dyn PageSource>, overlay_id: &str) -> Self {
        Self {
            pages,
            extractor: DomExtractor::new(overlay_id),
            classifier: RoleClassifier::new(),
        }
    }

    fn read_bubble(&self, page: &Page, node: ElementId) -> Option<ObservedMessage> {
        let bubble = self.extractor.to_bubble(page, node);
        let msg = ObservedMessage::new(
            self.classifier.classify(page, bubble),
            &page.element(bubble).text,
        );
        (!msg.text.is_empty()).then_some(msg)
    }
}

impl MessageSource for DomMessageSource {
    fn thread_id(&self) -> Option<ThreadId> {
        let page = self.pages.snapshot()?;
        let site = SiteAdapter::for_host(&page.location.host);
        Some(site.thread_id(&page.location))
    }

    fn observe(&self) -> Option<Observation> {
        let page = self.pages.snapshot()?;
        let site = SiteAdapter::for_host(&page.location.host);
        let latest = self
            .extractor
            .message_nodes(&page, site)
            .last()
            .and_then(|&last| self.read_bubble(&page, last));
        Some(Observation {
            thread: site.thread_id(&page.location),
            latest,
        })
    }

    fn messages(&self) -> Vec<ObservedMessage> {
        let Some(page) = self.pages.snapshot() else {
            return Vec::new();
        };
        let site = SiteAdapter::for_host(&page.location.host);
        self.extractor
            .message_nodes(&page, site)
            .into_iter()
            .filter_map(|id| self.read_bubble(&page, id))
            .collect()
    }

    fn site(&self) -> String {
        self.pages
            .snapshot()
            .map(|p| p.location.host)
            .unwrap_or_default()
    }
}
