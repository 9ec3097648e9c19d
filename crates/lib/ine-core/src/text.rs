//! Text folding for local catalog matching.
//!
//! Applied symmetrically to the query and to every candidate field so that
//! "Índice de Precios", "indice de precios" and "INDICE  DE PRECIOS" compare
//! equal.

use ine_models::MatchedField;

/// Folds text for comparison.
///
/// The pipeline:
/// 1. Lowercase
/// 2. Strip Latin diacritics (á→a, ü→u, ñ→n, ç→c, ...)
/// 3. Collapse whitespace and trim
#[must_use]
pub fn fold(input: &str) -> String {
    let folded: String = input.chars().flat_map(char::to_lowercase).map(strip_accent).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

const fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Case- and accent-insensitive substring matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Returns `None` when the query folds to nothing.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        let needle = fold(query);
        if needle.is_empty() {
            None
        } else {
            Some(Self { needle })
        }
    }

    #[must_use]
    pub fn needle(&self) -> &str {
        &self.needle
    }

    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        fold(text).contains(&self.needle)
    }

    /// Reports which field matched, preferring `Codigo` over `Nombre`.
    #[must_use]
    pub fn match_fields(&self, code: &str, name: &str) -> Option<MatchedField> {
        if self.matches(code) {
            Some(MatchedField::Codigo)
        } else if self.matches(name) {
            Some(MatchedField::Nombre)
        } else {
            None
        }
    }
}
