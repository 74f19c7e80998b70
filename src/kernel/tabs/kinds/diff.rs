use async_trait::async_trait;
use std::path::Path;

use super::{same_path, unsupported};
use crate::kernel::language::LanguageId;
use crate::kernel::tabs::{
    DiffPayload, ModelSeed, OpenOptions, RestoreContext, RestoreError, Tab, TabError, TabKind,
    TabPayload, TabSeed, TabSource, TabTypeDefinition,
};

/// Side-by-side view of a file against a reference version.
///
/// The modified side follows the shared content record; the original side is
/// reference text and only moves when the file changes on disk.
pub struct DiffTabType;

#[async_trait]
impl TabTypeDefinition for DiffTabType {
    fn kind(&self) -> TabKind {
        TabKind::DIFF
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        let TabSource::Diff {
            path,
            original,
            modified,
            original_label,
        } = source
        else {
            return Err(unsupported(self.kind(), source));
        };
        let payload = DiffPayload {
            original: Some(original.clone()),
            modified: Some(modified.clone()),
            original_label: original_label.clone().unwrap_or_else(|| "HEAD".to_string()),
        };
        let tab = Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            Some(path.clone()),
            TabPayload::Diff(payload),
        );
        let title = options
            .title
            .clone()
            .unwrap_or_else(|| format!("{} (diff)", tab.title));
        Ok(tab.with_title(title))
    }

    fn should_reuse_tab(
        &self,
        existing: &Tab,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        Ok(*existing.kind() == TabKind::DIFF && same_path(existing, source))
    }

    fn update_content(&self, tab: &mut Tab, content: &str, dirty: bool) -> bool {
        let TabPayload::Diff(payload) = &mut tab.payload else {
            return false;
        };
        if payload.modified.as_deref() == Some(content) && tab.dirty == dirty {
            return false;
        }
        payload.modified = Some(content.to_string());
        tab.dirty = dirty;
        true
    }

    fn update_reference(&self, tab: &mut Tab, content: &str) -> bool {
        let TabPayload::Diff(payload) = &mut tab.payload else {
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

    fn model_seed<'a>(&self, tab: &'a Tab) -> Option<ModelSeed<'a>> {
        let TabPayload::Diff(payload) = &tab.payload else {
            return None;
        };
        Some(ModelSeed {
            content: payload.modified.as_deref()?,
            language: tab.path().map(LanguageId::for_path).unwrap_or_default(),
        })
    }

    fn serialize_for_session(&self, tab: &Tab) -> Tab {
        let mut out = tab.clone();
        if let TabPayload::Diff(payload) = &mut out.payload {
            payload.original = None;
            payload.modified = None;
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
        let TabPayload::Diff(payload) = &mut tab.payload else {
            return Err(RestoreError::Payload(self.kind()));
        };
        // Without a version-control collaborator the reference side starts at
        // the on-disk text until the next status refresh replaces it.
        payload.original.get_or_insert_with(|| text.clone());
        payload.modified = Some(text);
        Ok(tab)
    }
}
