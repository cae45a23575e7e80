use quire_types::{ContentBlock, Theme};

/// Turns one content block into markup.
///
/// Rendering is a pure function of the block and theme. Blocks the renderer
/// cannot express produce an empty string (and a logged warning) rather than
/// an error, so one bad block never aborts a document.
pub trait BlockRenderer: Send + Sync {
    fn render(&self, block: &ContentBlock, theme: &Theme) -> String;

    /// Returns a human-readable name for this renderer (for logging/debugging).
    fn name(&self) -> &'static str;
}
