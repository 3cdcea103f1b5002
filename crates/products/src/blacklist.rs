use serde::{Deserialize, Serialize};

use stockroom_core::{BlacklistWordId, DomainError, DomainResult, Entity};

/// A word that may not appear anywhere inside a product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistWord {
    pub id: BlacklistWordId,
    pub word: String,
}

impl BlacklistWord {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            id: BlacklistWordId::new(),
            word: word.into(),
        }
    }
}

impl Entity for BlacklistWord {
    type Id = BlacklistWordId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Find the first blacklisted word contained in `name`.
///
/// Matching is a case-insensitive substring search, so "blokuj" matches
/// "SuperBlokujPhone". Empty words never match.
pub fn find_blacklisted_word<'a>(
    name: &str,
    words: &'a [BlacklistWord],
) -> Option<&'a BlacklistWord> {
    let haystack = name.to_lowercase();
    words.iter().find(|w| {
        let needle = w.word.to_lowercase();
        !needle.is_empty() && haystack.contains(&needle)
    })
}

/// Normalize a word submitted for the blacklist (trimmed, non-empty).
pub fn normalize_word(raw: &str) -> DomainResult<String> {
    let word = raw.trim();
    if word.is_empty() {
        return Err(DomainError::validation("blacklist word cannot be empty"));
    }
    Ok(word.to_string())
}
