//! Template token substitution.

use crate::config::TokensConfig;

/// Literal replacements applied to every staged template.
#[derive(Debug, Clone)]
pub struct TokenValues<'a> {
    pub tokens: &'a TokensConfig,
    pub date: &'a str,
    pub version: &'a str,
}

impl TokenValues<'_> {
    /// Replace every date and version token in `text`.
    ///
    /// Replacement values are inserted verbatim and never rescanned, so a
    /// value that happens to contain a token survives as-is.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        loop {
            let date_at = rest.find(&self.tokens.date);
            let version_at = rest.find(&self.tokens.version);

            let (at, token, value) = match (date_at, version_at) {
                (None, None) => break,
                (Some(d), Some(v)) if v < d => (v, &self.tokens.version, self.version),
                (Some(d), _) => (d, &self.tokens.date, self.date),
                (None, Some(v)) => (v, &self.tokens.version, self.version),
            };

            out.push_str(&rest[..at]);
            out.push_str(value);
            rest = &rest[at + token.len()..];
        }

        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &TokensConfig) -> TokenValues<'_> {
        TokenValues {
            tokens,
            date: "October 19, 2026",
            version: "4.2.0",
        }
    }

    #[test]
    fn test_both_tokens_replaced() {
        let tokens = TokensConfig::default();
        let template = "<footer>v@VERSION@ built @DATE@ ($body$)</footer>";

        let out = values(&tokens).substitute(template);

        assert_eq!(out, "<footer>v4.2.0 built October 19, 2026 ($body$)</footer>");
        assert!(!out.contains("@DATE@"));
        assert!(!out.contains("@VERSION@"));
    }

    #[test]
    fn test_repeated_tokens() {
        let tokens = TokensConfig::default();
        let out = values(&tokens).substitute("@DATE@|@DATE@|@VERSION@@VERSION@");
        assert_eq!(out, "October 19, 2026|October 19, 2026|4.2.04.2.0");
    }

    #[test]
    fn test_text_without_tokens_unchanged() {
        let tokens = TokensConfig::default();
        let text = "no markers here, just an @ sign";
        assert_eq!(values(&tokens).substitute(text), text);
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let tokens = TokensConfig::default();
        let values = TokenValues {
            tokens: &tokens,
            date: "@VERSION@",
            version: "1.0",
        };
        assert_eq!(values.substitute("@DATE@ @VERSION@"), "@VERSION@ 1.0");
    }

    #[test]
    fn test_custom_tokens() {
        let tokens = TokensConfig {
            date: "{{date}}".to_string(),
            version: "{{version}}".to_string(),
        };
        assert_eq!(
            values(&tokens).substitute("{{version}} / {{date}}"),
            "4.2.0 / October 19, 2026"
        );
    }
}
