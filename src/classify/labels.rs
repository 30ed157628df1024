//! The gesture label set.
//!
//! Labels are a fixed, closed set defined once at startup.  The on-disk
//! `labels.txt` carries one label per line, optionally prefixed with a
//! numeric class index (`0 Yes`), as exported by common training tools.

use std::path::Path;

use super::engine::ClassifyError;

/// The compiled-in default label set, in model output order.
pub const GESTURE_LABELS: [&str; 30] = [
    "Yes",
    "I love you",
    "Thank you",
    "No",
    "Sorry",
    "a",
    "b",
    "c",
    "d",
    "e",
    "f",
    "g",
    "h",
    "i",
    "l",
    "o",
    "r",
    "s",
    "u",
    "v",
    "w",
    "x",
    "y",
    "k",
    "m",
    "n",
    "p",
    "q",
    "t",
    "Hello",
];

/// Parse a `labels.txt` file.
///
/// Blank lines are skipped.  A leading integer followed by whitespace is
/// treated as the class index and stripped; everything after it (including
/// internal spaces, e.g. `I love you`) is the label.
pub fn load_labels(path: &Path) -> Result<Vec<String>, ClassifyError> {
    if !path.exists() {
        return Err(ClassifyError::LabelsNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ClassifyError::LabelsNotFound(format!("{}: {e}", path.display())))?;

    let labels: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect();

    if labels.is_empty() {
        return Err(ClassifyError::ModelFormat(format!(
            "label file {} is empty",
            path.display()
        )));
    }

    Ok(labels)
}

/// Strip an optional leading class index from one label line.
fn parse_line(line: &str) -> String {
    match line.split_once(char::is_whitespace) {
        Some((index, rest)) if index.parse::<usize>().is_ok() => rest.trim().to_string(),
        _ => line.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_set_has_thirty_entries() {
        assert_eq!(GESTURE_LABELS.len(), 30);
        assert_eq!(GESTURE_LABELS[0], "Yes");
        assert_eq!(GESTURE_LABELS[29], "Hello");
    }

    #[test]
    fn parses_indexed_lines() {
        assert_eq!(parse_line("0 Yes"), "Yes");
        assert_eq!(parse_line("1 I love you"), "I love you");
    }

    #[test]
    fn parses_plain_lines() {
        assert_eq!(parse_line("Hello"), "Hello");
        // A non-numeric first word is part of the label, not an index.
        assert_eq!(parse_line("Thank you"), "Thank you");
    }

    #[test]
    fn loads_file_with_mixed_lines() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "0 Yes\n1 I love you\n\nHello\n").unwrap();

        let labels = load_labels(&path).expect("labels");
        assert_eq!(labels, vec!["Yes", "I love you", "Hello"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let err = load_labels(&dir.path().join("labels.txt")).unwrap_err();
        assert!(matches!(err, ClassifyError::LabelsNotFound(_)));
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "\n\n").unwrap();
        let err = load_labels(&path).unwrap_err();
        assert!(matches!(err, ClassifyError::ModelFormat(_)));
    }
}
