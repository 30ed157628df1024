//! The clip catalog: word and letter signing clips plus the neutral
//! default clip.
//!
//! Built once at startup from the bundled media directory and read-only
//! afterwards.  Lookups that miss fall back to per-letter spelling, and
//! unknown characters fall back to the default clip — both decisions are
//! made by the sequencer, the catalog only answers lookups.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Words with a dedicated signing clip.
pub const SIGNED_WORDS: [&str; 9] = [
    "night", "became", "family", "question", "study", "tomorrow", "name", "only", "see",
];

/// Immutable word/letter → clip path mappings.
pub struct ClipCatalog {
    words: HashMap<String, PathBuf>,
    letters: HashMap<char, PathBuf>,
    default_clip: PathBuf,
}

impl ClipCatalog {
    /// Build the catalog rooted at `media_dir`.
    ///
    /// Layout: `words/<word>.mkv`, `letters/<letter>1.mkv`, `default.mkv`.
    /// Paths are resolved eagerly but not checked for existence — a missing
    /// file surfaces as a player error at play time.
    pub fn new(media_dir: &Path) -> Self {
        let words = SIGNED_WORDS
            .iter()
            .map(|&word| {
                (
                    word.to_string(),
                    media_dir.join("words").join(format!("{word}.mkv")),
                )
            })
            .collect();

        let letters = ('a'..='z')
            .map(|letter| {
                (
                    letter,
                    media_dir.join("letters").join(format!("{letter}1.mkv")),
                )
            })
            .collect();

        Self {
            words,
            letters,
            default_clip: media_dir.join("default.mkv"),
        }
    }

    /// Clip for a whole word, when one exists.
    pub fn word(&self, token: &str) -> Option<&Path> {
        self.words.get(token).map(PathBuf::as_path)
    }

    /// Clip for a single letter, when one exists.
    pub fn letter(&self, letter: char) -> Option<&Path> {
        self.letters.get(&letter).map(PathBuf::as_path)
    }

    /// The neutral clip played between signs.
    pub fn default_clip(&self) -> &Path {
        &self.default_clip
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ClipCatalog {
        ClipCatalog::new(Path::new("/media"))
    }

    #[test]
    fn known_words_resolve() {
        let cat = catalog();
        for word in SIGNED_WORDS {
            let path = cat.word(word).expect(word);
            assert!(path.starts_with("/media/words"));
            assert!(path.to_string_lossy().ends_with(&format!("{word}.mkv")));
        }
    }

    #[test]
    fn unknown_words_miss() {
        let cat = catalog();
        assert!(cat.word("you").is_none());
        assert!(cat.word("").is_none());
        // Lookup is exact: no case folding inside the catalog.
        assert!(cat.word("See").is_none());
    }

    #[test]
    fn all_ascii_letters_resolve() {
        let cat = catalog();
        for letter in 'a'..='z' {
            let path = cat.letter(letter).expect("letter clip");
            assert!(path.to_string_lossy().ends_with(&format!("{letter}1.mkv")));
        }
    }

    #[test]
    fn non_catalog_characters_miss() {
        let cat = catalog();
        assert!(cat.letter('A').is_none());
        assert!(cat.letter('3').is_none());
        assert!(cat.letter('é').is_none());
    }

    #[test]
    fn default_clip_lives_at_media_root() {
        assert_eq!(catalog().default_clip(), Path::new("/media/default.mkv"));
    }
}
