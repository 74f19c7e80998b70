use async_trait::async_trait;
use std::path::Path;

use super::{same_path, unsupported};
use crate::kernel::language::LanguageId;
use crate::kernel::tabs::{
    EditorPayload, ModelSeed, OpenOptions, RestoreContext, RestoreError, Tab, TabCapabilities,
    TabError, TabKind, TabPayload, TabSeed, TabSource, TabTypeDefinition,
};

/// Plain text editor backed by the editing widget.
pub struct EditorTabType;

#[async_trait]
impl TabTypeDefinition for EditorTabType {
    fn kind(&self) -> TabKind {
        TabKind::EDITOR
    }

    fn capabilities(&self) -> TabCapabilities {
        TabCapabilities::editable()
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        let TabSource::File { path, content } = source else {
            return Err(unsupported(self.kind(), source));
        };
        let payload = EditorPayload {
            content: Some(content.clone()),
            language: LanguageId::for_path(path),
        };
        Ok(Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            Some(path.clone()),
            TabPayload::Editor(payload),
        ))
    }

    fn should_reuse_tab(
        &self,
        existing: &Tab,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        Ok(*existing.kind() == TabKind::EDITOR && same_path(existing, source))
    }

    fn update_content(&self, tab: &mut Tab, content: &str, dirty: bool) -> bool {
        let TabPayload::Editor(payload) = &mut tab.payload else {
            return false;
        };
        if payload.content.as_deref() == Some(content) && tab.dirty == dirty {
            return false;
        }
        if payload.content.as_deref() != Some(content) {
            payload.content = Some(content.to_string());
        }
        tab.dirty = dirty;
        true
    }

    fn content_path<'a>(&self, tab: &'a Tab) -> Option<&'a Path> {
        tab.path()
    }

    fn model_seed<'a>(&self, tab: &'a Tab) -> Option<ModelSeed<'a>> {
        let TabPayload::Editor(payload) = &tab.payload else {
            return None;
        };
        Some(ModelSeed {
            content: payload.content.as_deref()?,
            language: payload.language,
        })
    }

    fn serialize_for_session(&self, tab: &Tab) -> Tab {
        let mut out = tab.clone();
        if let TabPayload::Editor(payload) = &mut out.payload {
            payload.content = None;
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
        match &mut tab.payload {
            TabPayload::Editor(payload) => payload.content = Some(text),
            _ => return Err(RestoreError::Payload(self.kind())),
        }
        Ok(tab)
    }
}
