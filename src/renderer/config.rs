//! Configuration for rendered output

/// Options for the rendering pass
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Remove output lines that render exactly empty
    pub strip_blank_lines: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strip_blank_lines: true,
        }
    }
}

impl RenderOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether blank output lines are removed
    pub fn with_strip_blank_lines(mut self, strip: bool) -> Self {
        self.strip_blank_lines = strip;
        self
    }
}
