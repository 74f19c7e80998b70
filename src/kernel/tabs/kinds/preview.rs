use async_trait::async_trait;
use std::path::Path;

use super::{same_path, unsupported};
use crate::kernel::language::LanguageId;
use crate::kernel::tabs::{
    OpenOptions, PreviewMode, PreviewPayload, RestoreContext, RestoreError, Tab, TabCapabilities,
    TabError, TabKind, TabPayload, TabSeed, TabSource, TabTypeDefinition,
};

/// Rendered markdown or web preview of a file.
pub struct PreviewTabType;

#[async_trait]
impl TabTypeDefinition for PreviewTabType {
    fn kind(&self) -> TabKind {
        TabKind::PREVIEW
    }

    fn capabilities(&self) -> TabCapabilities {
        TabCapabilities::previewable()
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        let (path, text, mode) = match source {
            TabSource::Preview { path, source, mode } => (path, source, *mode),
            TabSource::File { path, content } => {
                let mode = match LanguageId::for_path(path) {
                    LanguageId::Html => PreviewMode::Web,
                    _ => PreviewMode::Markdown,
                };
                (path, content, mode)
            }
            _ => return Err(unsupported(self.kind(), source)),
        };
        let payload = PreviewPayload {
            source: Some(text.clone()),
            mode,
        };
        let tab = Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            Some(path.clone()),
            TabPayload::Preview(payload),
        );
        let title = format!("Preview {}", tab.title);
        Ok(tab.with_title(title))
    }

    fn should_reuse_tab(
        &self,
        existing: &Tab,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        Ok(*existing.kind() == TabKind::PREVIEW && same_path(existing, source))
    }

    fn update_content(&self, tab: &mut Tab, content: &str, dirty: bool) -> bool {
        let TabPayload::Preview(payload) = &mut tab.payload else {
            return false;
        };
        if payload.source.as_deref() == Some(content) && tab.dirty == dirty {
            return false;
        }
        payload.source = Some(content.to_string());
        tab.dirty = dirty;
        true
    }

    fn content_path<'a>(&self, tab: &'a Tab) -> Option<&'a Path> {
        tab.path()
    }

    fn current_content<'a>(&self, tab: &'a Tab) -> Option<&'a str> {
        match &tab.payload {
            TabPayload::Preview(payload) => payload.source.as_deref(),
            _ => None,
        }
    }

    fn serialize_for_session(&self, tab: &Tab) -> Tab {
        let mut out = tab.clone();
        if let TabPayload::Preview(payload) = &mut out.payload {
            payload.source = None;
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
        let TabPayload::Preview(payload) = &mut tab.payload else {
            return Err(RestoreError::Payload(self.kind()));
        };
        payload.source = Some(text);
        Ok(tab)
    }
}
