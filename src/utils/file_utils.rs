//! File system utilities

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

/// Ensure directory exists
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| anyhow!("Failed to create directory {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Sanitize a title for use as a filename
///
/// Replaces each of `< > : " / \ | ? *` (and control characters) with `_`.
/// Idempotent: sanitizing twice equals sanitizing once.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reserved_character_becomes_an_underscore() {
        assert_eq!(
            sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#),
            "a_b_c_d_e_f_g_h_i_j"
        );
    }

    #[test]
    fn sanitizing_is_idempotent() {
        let once = sanitize_filename(r#"Best of 2024: "Top 10" <HD>"#);
        let twice = sanitize_filename(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "Best of 2024_ _Top 10_ _HD_");
    }

    #[test]
    fn ordinary_titles_pass_through_unchanged() {
        assert_eq!(sanitize_filename("Plain Title 123"), "Plain Title 123");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn unicode_is_preserved() {
        assert_eq!(sanitize_filename("日本語のタイトル ñandú"), "日本語のタイトル ñandú");
    }

    #[test]
    fn control_characters_are_replaced() {
        assert_eq!(sanitize_filename("line\nbreak\ttab"), "line_break_tab");
    }
}
