//! Editing-widget contract. The engine only creates, queries, decorates and
//! disposes models; rendering belongs to the presentation layer.

use crate::kernel::language::LanguageId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(u64);

impl DecorationId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub trait TextModel: Send {
    /// Identity the model was created under; unique per creation.
    fn uri(&self) -> &str;

    fn language(&self) -> LanguageId;

    fn line_count(&self) -> usize;

    fn text(&self) -> String;

    fn set_text(&mut self, text: &str);

    /// Removes `remove` and adds one line decoration per entry of `add_lines`
    /// (1-based). Returns ids for the added decorations, in order.
    fn delta_decorations(&mut self, remove: &[DecorationId], add_lines: &[u32])
        -> Vec<DecorationId>;

    /// Lines currently carrying a decoration, ascending.
    fn decorated_lines(&self) -> Vec<u32>;

    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

pub trait ModelFactory: Send + Sync {
    fn create(&self, uri: &str, content: &str, language: LanguageId) -> Box<dyn TextModel>;
}
