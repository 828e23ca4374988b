use std::collections::HashSet;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// Classifies user-written text before it is stored.
pub trait Moderator: Send + Sync {
    fn classify(&self, text: &str) -> Verdict;
}

const DEFAULT_BANNED_WORDS: &[&str] = &[
    "fuck", "fucking", "shit", "bitch", "bastard", "asshole", "dick", "cunt", "motherfucker", "slut",
    "whore",
];

/// Rejects text containing any listed word. Matching is per word and
/// case-insensitive, so "Scunthorpe" is fine while "SHIT" is not.
pub struct WordListModerator {
    words: HashSet<String>,
}

impl WordListModerator {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }
}

impl Default for WordListModerator {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_WORDS)
    }
}

impl Moderator for WordListModerator {
    fn classify(&self, text: &str) -> Verdict {
        let banned = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .any(|w| self.words.contains(&w.to_lowercase()));

        if banned { Verdict::Rejected } else { Verdict::Accepted }
    }
}

/// Reject the request if any of `texts` fails moderation.
pub fn check(moderator: &dyn Moderator, texts: &[&str]) -> Result<(), ApiError> {
    if texts.iter().any(|t| moderator.classify(t) == Verdict::Rejected) {
        return Err(ApiError::Moderation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_listed_words_in_any_case() {
        let m = WordListModerator::default();
        assert_eq!(m.classify("What the SHIT is this"), Verdict::Rejected);
        assert_eq!(m.classify("shit."), Verdict::Rejected);
        assert_eq!(m.classify("Scunthorpe United"), Verdict::Accepted);
        assert_eq!(m.classify(""), Verdict::Accepted);
    }

    #[test]
    fn custom_list_replaces_default() {
        let m = WordListModerator::new(["Spoiler", " "]);
        assert_eq!(m.classify("no spoiler please"), Verdict::Rejected);
        assert_eq!(m.classify("shit"), Verdict::Accepted);
    }

    #[test]
    fn check_fails_if_any_text_is_rejected() {
        let m = WordListModerator::default();
        assert!(check(&m, &["fine title", "fine body"]).is_ok());
        assert!(matches!(check(&m, &["fine title", "bitch"]), Err(ApiError::Moderation)));
    }
}
