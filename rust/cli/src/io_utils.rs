//! File helpers for commands that read game records.

/// Reads a text file, dropping a leading UTF-8 byte order mark.
///
/// ```rust,no_run
/// # use deckflow_cli::io_utils::read_text;
/// let records = read_text("data/games.jsonl").unwrap();
/// ```
pub fn read_text(path: &str) -> Result<String, String> {
    let mut content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Non-blank lines paired with their 1-based line numbers.
pub fn record_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l))
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped() {
        let mut s = "\u{feff}{}".to_string();
        strip_utf8_bom(&mut s);
        assert_eq!(s, "{}");
    }

    #[test]
    fn blank_lines_are_skipped_but_numbered() {
        let lines: Vec<_> = record_lines("a\n\n  \nb\n").collect();
        assert_eq!(lines, vec![(1, "a"), (4, "b")]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_text("/nonexistent/games.jsonl").unwrap_err();
        assert!(err.contains("/nonexistent/games.jsonl"));
    }
}
