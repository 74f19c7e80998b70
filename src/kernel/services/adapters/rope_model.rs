//! Headless editing widget on top of `ropey`.

use ropey::Rope;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::kernel::language::LanguageId;
use crate::kernel::services::ports::{DecorationId, ModelFactory, TextModel};

pub struct RopeModel {
    uri: String,
    language: LanguageId,
    rope: Rope,
    decorations: FxHashMap<DecorationId, u32>,
    next_decoration: u64,
    disposed: bool,
}

impl RopeModel {
    pub fn new(uri: &str, content: &str, language: LanguageId) -> Self {
        Self {
            uri: uri.to_string(),
            language,
            rope: Rope::from_str(content),
            decorations: FxHashMap::default(),
            next_decoration: 1,
            disposed: false,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }
}

impl TextModel for RopeModel {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn language(&self) -> LanguageId {
        self.language
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    fn delta_decorations(&mut self, remove: &[DecorationId], add_lines: &[u32]) -> Vec<DecorationId> {
        if self.disposed {
            return Vec::new();
        }
        for id in remove {
            self.decorations.remove(id);
        }
        add_lines
            .iter()
            .map(|&line| {
                let id = DecorationId::new(self.next_decoration);
                self.next_decoration += 1;
                self.decorations.insert(id, line);
                id
            })
            .collect()
    }

    fn decorated_lines(&self) -> Vec<u32> {
        let mut lines: Vec<u32> = self.decorations.values().copied().collect();
        lines.sort_unstable();
        lines
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.decorations.clear();
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[derive(Default)]
pub struct RopeModelFactory {
    created: AtomicU64,
}

impl RopeModelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models created so far.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }
}

impl ModelFactory for RopeModelFactory {
    fn create(&self, uri: &str, content: &str, language: LanguageId) -> Box<dyn TextModel> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(RopeModel::new(uri, content, language))
    }
}
