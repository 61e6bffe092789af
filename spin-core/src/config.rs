//! Options for fold operations.

use std::sync::Arc;

/// Observes one reduction step before the primary reducer runs.
///
/// Receives the current accumulated value and the incoming value. It
/// cannot alter either; its only effect is its own side effect.
pub type Middleware<R, V> = Arc<dyn Fn(&R, &V) + Send + Sync>;

/// Options for [`Producer::scan_with`](crate::Producer::scan_with) and
/// [`Producer::feedback_with`](crate::Producer::feedback_with).
///
/// The default runs no middleware and attaches no label.
#[non_exhaustive]
pub struct FoldOptions<R, V> {
    /// Run for every value, in order, before the primary reducer.
    pub middlewares: Vec<Middleware<R, V>>,

    /// Attached to the fold's tracing events.
    pub label: Option<String>,
}

impl<R, V> Default for FoldOptions<R, V> {
    fn default() -> Self {
        Self {
            middlewares: Vec::new(),
            label: None,
        }
    }
}

impl<R: 'static, V: 'static> FoldOptions<R, V> {
    /// Create options with no middleware and no label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware after the ones already registered.
    pub fn middleware<F>(mut self, middleware: F) -> Self
    where
        F: Fn(&R, &V) + Send + Sync + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Label the fold in tracing output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl<R, V> std::fmt::Debug for FoldOptions<R, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoldOptions")
            .field("middlewares", &self.middlewares.len())
            .field("label", &self.label)
            .finish()
    }
}
