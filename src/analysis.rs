// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Text analysis: turning a string into the terms the index stores.
//!
//! Each analyzer is a tantivy [`TextAnalyzer`] pipeline behind the
//! [`Analyzer`] trait, so mappers and conditions stay independent of the
//! tokenizer machinery.

use std::fmt;

use tantivy::tokenizer::{
    LowerCaser, RawTokenizer, SimpleTokenizer, TextAnalyzer, Token, TokenStream,
    WhitespaceTokenizer,
};

/// Tokenizes text into index terms.
///
/// The same analyzer must be used at index time and query time for a field,
/// otherwise phrase and term predicates can't line up with stored terms.
pub trait Analyzer: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Terms in position order.
    fn analyze(&self, text: &str) -> Vec<String>;
}

/// Run `text` through `analyzer`, keeping every non-empty token.
fn collect_terms(mut analyzer: TextAnalyzer, text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut stream = analyzer.token_stream(text);
    stream.process(&mut |token: &Token| {
        if !token.text.is_empty() {
            terms.push(token.text.clone());
        }
    });
    terms
}

/// Lower-cased runs of alphanumeric characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAnalyzer;

impl StandardAnalyzer {
    pub fn pipeline() -> TextAnalyzer {
        TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .build()
    }
}

impl Analyzer for StandardAnalyzer {
    fn name(&self) -> &str {
        "standard"
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        collect_terms(Self::pipeline(), text)
    }
}

/// The whole input as a single term.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn pipeline() -> TextAnalyzer {
        TextAnalyzer::from(RawTokenizer::default())
    }
}

impl Analyzer for KeywordAnalyzer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        collect_terms(Self::pipeline(), text)
    }
}

/// Whitespace-separated terms, case preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceAnalyzer;

impl WhitespaceAnalyzer {
    pub fn pipeline() -> TextAnalyzer {
        TextAnalyzer::from(WhitespaceTokenizer::default())
    }
}

impl Analyzer for WhitespaceAnalyzer {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        collect_terms(Self::pipeline(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lowercases_and_splits() {
        assert_eq!(
            StandardAnalyzer.analyze("The Quick-brown fox, 42!"),
            vec!["the", "quick", "brown", "fox", "42"]
        );
        assert!(StandardAnalyzer.analyze("  ,;  ").is_empty());
    }

    #[test]
    fn test_keyword_keeps_input() {
        assert_eq!(KeywordAnalyzer.analyze("New York"), vec!["New York"]);
        assert!(KeywordAnalyzer.analyze("").is_empty());
    }

    #[test]
    fn test_whitespace_preserves_case() {
        assert_eq!(WhitespaceAnalyzer.analyze("Hello  World"), vec!["Hello", "World"]);
    }

    #[test]
    fn test_standard_handles_unicode_words() {
        assert_eq!(StandardAnalyzer.analyze("Ça Va? Grüße"), vec!["ça", "va", "grüße"]);
    }
}
