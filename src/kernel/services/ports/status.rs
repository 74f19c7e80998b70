use std::path::Path;

/// Told after every successful write, e.g. so version-control status can refresh.
pub trait StatusRefresher: Send + Sync {
    fn refresh(&self, path: &Path);
}

pub struct NoopStatusRefresher;

impl StatusRefresher for NoopStatusRefresher {
    fn refresh(&self, _path: &Path) {}
}
