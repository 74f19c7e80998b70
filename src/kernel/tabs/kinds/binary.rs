use async_trait::async_trait;

use super::{same_path, unsupported};
use crate::kernel::tabs::{
    BinaryPayload, OpenOptions, RestoreContext, RestoreError, Tab, TabError, TabKind, TabPayload,
    TabSeed, TabSource, TabTypeDefinition,
};

/// Read-only viewer for non-text files.
pub struct BinaryTabType;

#[async_trait]
impl TabTypeDefinition for BinaryTabType {
    fn kind(&self) -> TabKind {
        TabKind::BINARY
    }

    fn create_tab(
        &self,
        seed: TabSeed,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<Tab, TabError> {
        let TabSource::Bytes { path, bytes } = source else {
            return Err(unsupported(self.kind(), source));
        };
        let payload = BinaryPayload {
            size: bytes.len() as u64,
            bytes: Some(bytes.clone()),
        };
        Ok(Tab::new(
            seed.id,
            seed.pane,
            self.kind(),
            Some(path.clone()),
            TabPayload::Binary(payload),
        ))
    }

    fn should_reuse_tab(
        &self,
        existing: &Tab,
        source: &TabSource,
        _options: &OpenOptions,
    ) -> Result<bool, TabError> {
        Ok(*existing.kind() == TabKind::BINARY && same_path(existing, source))
    }

    fn serialize_for_session(&self, tab: &Tab) -> Tab {
        let mut out = tab.clone();
        if let TabPayload::Binary(payload) = &mut out.payload {
            payload.bytes = None;
        }
        out
    }

    fn needs_restore(&self) -> bool {
        true
    }

    async fn restore_content(&self, mut tab: Tab, ctx: &RestoreContext) -> Result<Tab, RestoreError> {
        let path = tab.path().ok_or(RestoreError::MissingPath)?.to_path_buf();
        let bytes = ctx.read_bytes(&path).await?;
        let TabPayload::Binary(payload) = &mut tab.payload else {
            return Err(RestoreError::Payload(self.kind()));
        };
        payload.size = bytes.len() as u64;
        payload.bytes = Some(bytes);
        Ok(tab)
    }
}
