use async_trait::async_trait;
use std::path::Path;

use super::{same_path, unsupported};
use crate::kernel::tabs::{
    OpenOptions, RestoreContext, RestoreError, ReviewPayload, ReviewStatus, Tab, TabError,
    TabKind, TabPayload, TabSeed, TabSource, TabTypeDefinition,
};

/// Review of a suggested edit against the current file.
pub struct ReviewTabType;

#[async_trait]
impl TabTypeDefinition for ReviewTabType {
    fn kind(&self) -> TabKind {
        TabKind::REVIEW
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        let TabSource::SuggestedEdit {
            path,
            original,
            suggested,
            description,
        } = source
        else {
            return Err(unsupported(self.kind(), source));
        };
        let payload = ReviewPayload {
            original: Some(original.clone()),
            suggested: suggested.clone(),
            description: description.clone(),
            status: ReviewStatus::Pending,
        };
        let tab = Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            Some(path.clone()),
            TabPayload::Review(payload),
        );
        let title = options
            .title
            .clone()
            .unwrap_or_else(|| format!("Review: {}", tab.title));
        Ok(tab.with_title(title))
    }

    /// Same file and same suggestion. A different suggestion opens its own tab.
    fn should_reuse_tab(
        &self,
        existing: &Tab,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        let (TabPayload::Review(payload), TabSource::SuggestedEdit { suggested, .. }) =
            (&existing.payload, source)
        else {
            return Ok(false);
        };
        Ok(same_path(existing, source) && payload.suggested == *suggested)
    }

    /// Unsaved edits only mark the tab dirty; `original` follows persisted text.
    fn update_content(&self, tab: &mut Tab, content: &str, dirty: bool) -> bool {
        let TabPayload::Review(payload) = &mut tab.payload else {
            return false;
        };
        let mut changed = tab.dirty != dirty;
        tab.dirty = dirty;
        if !dirty && payload.original.as_deref() != Some(content) {
            payload.original = Some(content.to_string());
            changed = true;
        }
        changed
    }

    fn update_reference(&self, tab: &mut Tab, content: &str) -> bool {
        let TabPayload::Review(payload) = &mut tab.payload else {
            return false;
        };
        if payload.original.as_deref() == Some(content) {
            return false;
        }
        payload.original = Some(content.to_string());
        true
    }

    fn content_path<'a>(&self, tab: &'a Tab) -> Option<&'a Path> {
        tab.path()
    }

    fn current_content<'a>(&self, tab: &'a Tab) -> Option<&'a str> {
        match &tab.payload {
            TabPayload::Review(payload) => payload.original.as_deref(),
            _ => None,
        }
    }

    fn include_in_session(&self, tab: &Tab) -> bool {
        matches!(
            &tab.payload,
            TabPayload::Review(ReviewPayload {
                status: ReviewStatus::Pending,
                ..
            })
        )
    }

    fn serialize_for_session(&self, tab: &Tab) -> Tab {
        let mut out = tab.clone();
        if let TabPayload::Review(payload) = &mut out.payload {
            payload.original = None;
        }
        out.dirty = false;
        out
    }

    fn needs_restore(&self) -> bool {
        true
    }

    async fn restore_content(&self, mut tab: Tab, ctx: &RestoreContext) -> Result<Tab, RestoreError> {
        let path = tab.path().ok_or(RestoreError::MissingPath)?.to_path_buf();
        let text = ctx.read_text(&path).await?;
        let TabPayload::Review(payload) = &mut tab.payload else {
            return Err(RestoreError::Payload(self.kind()));
        };
        payload.original = Some(text);
        Ok(tab)
    }
}
