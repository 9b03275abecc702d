//! Strip the analytics snippet from pages before PDF rendering.

use regex::Regex;

/// Removes every span that opens with a marker comment and runs up to the
/// next closing script tag.
#[derive(Debug, Clone)]
pub struct SnippetScrubber {
    pattern: Regex,
}

impl SnippetScrubber {
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?is){}.*?</script\s*>", regex::escape(marker)))?;
        Ok(Self { pattern })
    }

    /// Returns the scrubbed text, or `None` when nothing matched.
    pub fn scrub(&self, html: &str) -> Option<String> {
        if !self.pattern.is_match(html) {
            return None;
        }
        Some(self.pattern.replace_all(html, "").into_owned())
    }
}
