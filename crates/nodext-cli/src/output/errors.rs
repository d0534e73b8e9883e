//! Error reports with `help:` suggestions and the source chain

use std::error::Error;

use nodext_core::error::NodextError;

use super::colors::ColorSupport;

/// Formats errors for the terminal
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Message, causes, then a suggestion when one is known
    pub fn format_error(&self, error: &NodextError) -> String {
        let mut output = format!("{}: {}", self.colors.red("error"), error);

        let mut source = error.source();
        while let Some(cause) = source {
            output.push_str(&format!("\n  {}: {}", self.colors.dim("caused by"), cause));
            source = cause.source();
        }

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("\n\n{}: {}", self.colors.cyan("help"), suggestion));
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
