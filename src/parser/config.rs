//! Configuration for the template dialect

/// Comment markers recognized by the template parser.
///
/// Line comments swallow the whole line; block comments swallow everything
/// between the markers, joining the surrounding text. The defaults match
/// the dialect used by the configuration templates (`##` and
/// `<%doc>`/`</%doc>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxConfig {
    /// Marker that starts a single-line comment
    pub line_comment: String,
    /// Opening marker of a block comment
    pub block_comment_open: String,
    /// Closing marker of a block comment
    pub block_comment_close: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            line_comment: "##".to_string(),
            block_comment_open: "<%doc>".to_string(),
            block_comment_close: "</%doc>".to_string(),
        }
    }
}

impl SyntaxConfig {
    /// Create a new configuration with default markers
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the single-line comment marker
    pub fn with_line_comment(mut self, marker: impl Into<String>) -> Self {
        self.line_comment = marker.into();
        self
    }

    /// Set the block comment marker pair
    pub fn with_block_comment(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.block_comment_open = open.into();
        self.block_comment_close = close.into();
        self
    }
}
