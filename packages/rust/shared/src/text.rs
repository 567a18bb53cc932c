//! Filename sanitization and slug generation.

/// Maximum length of a sanitized filename, before any extension.
pub const MAX_FILENAME_LEN: usize = 100;

/// Turn a raw label into an ASCII filesystem token.
///
/// Every maximal run of characters outside `[A-Za-z0-9]` becomes a single
/// underscore, edge underscores are dropped, and the result is capped at
/// [`MAX_FILENAME_LEN`] characters. Idempotent.
pub fn sanitize_filename(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    // Output is pure ASCII, so byte truncation is char truncation.
    out.truncate(MAX_FILENAME_LEN);
    out.trim_end_matches('_').to_string()
}

/// Filename for a downloaded document: sanitized label with a `.pdf` extension.
///
/// Labels that sanitize to nothing fall back to `document.pdf`.
pub fn document_filename(label: &str) -> String {
    let mut name = sanitize_filename(label);
    if name.is_empty() {
        name.push_str("document");
    }
    if !name.to_lowercase().ends_with(".pdf") {
        name.push_str(".pdf");
    }
    name
}

/// Fold a lower-case accented letter to its ASCII base.
fn fold_accent(ch: char) -> char {
    match ch {
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'à' | 'â' | 'ä' => 'a',
        'î' | 'ï' => 'i',
        'ô' | 'ö' => 'o',
        'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        other => other,
    }
}

/// Generate a path-safe slug matching `^[a-z0-9-]*$`.
///
/// Lower-cases, folds French accents, maps underscores and whitespace to
/// hyphens, drops everything else outside `[a-z0-9-]` and collapses hyphen
/// runs. Idempotent.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.to_lowercase().chars().map(fold_accent) {
        let mapped = match ch {
            '_' => '-',
            c if c.is_whitespace() => '-',
            c if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' => c,
            _ => continue,
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_runs() {
        assert_eq!(
            sanitize_filename("Programme de français - cycle 3 (PDF)"),
            "Programme_de_fran_ais_cycle_3_PDF"
        );
        assert_eq!(sanitize_filename("  --hello--  "), "hello");
        assert_eq!(sanitize_filename("!!!"), "");
    }

    #[test]
    fn sanitize_output_alphabet_and_length() {
        let long = "première générale ".repeat(20);
        let out = sanitize_filename(&long);
        assert!(out.len() <= MAX_FILENAME_LEN);
        assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(!out.starts_with('_'));
        assert!(!out.ends_with('_'));
    }

    #[test]
    fn sanitize_truncation_never_leaves_trailing_underscore() {
        // 99 letters then a separator: the cut lands right after the underscore.
        let raw = format!("{} tail", "a".repeat(99));
        let out = sanitize_filename(&raw);
        assert_eq!(out, "a".repeat(99));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            "Programme d'enseignement de l'option « histoire des arts »",
            "Terminale - voie générale",
            &format!("{} x", "b".repeat(99)),
            "",
            "___",
            "BO n°31 du 30 juillet 2020",
        ];
        for s in samples {
            let once = sanitize_filename(s);
            assert_eq!(sanitize_filename(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn document_filename_appends_pdf() {
        assert_eq!(document_filename("Programme de seconde"), "Programme_de_seconde.pdf");
        assert_eq!(document_filename("annexe.pdf"), "annexe_pdf.pdf");
        assert_eq!(document_filename("«»"), "document.pdf");
        assert!(document_filename(&"x".repeat(300)).len() <= MAX_FILENAME_LEN + 4);
    }

    #[test]
    fn slugify_folds_accents() {
        assert_eq!(slugify("École Secondaire"), "ecole-secondaire");
        assert_eq!(slugify("Histoire-géographie"), "histoire-geographie");
        assert_eq!(slugify("Sciences économiques et sociales"), "sciences-economiques-et-sociales");
        assert_eq!(slugify("Français, Langue & Culture"), "francais-langue-culture");
    }

    #[test]
    fn slugify_maps_underscores_and_collapses() {
        assert_eq!(slugify("Programme_de__premiere"), "programme-de-premiere");
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("Terminale_g_n_rale"), "terminale-g-n-rale");
    }

    #[test]
    fn slugify_output_alphabet() {
        for s in ["Œuvre ñandú", "CAP — 2024 ✓", "Λόγος", "\tTab\nNew"] {
            let out = slugify(s);
            assert!(
                out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{s:?} -> {out:?}"
            );
        }
    }

    #[test]
    fn slugify_is_idempotent() {
        for s in [
            "École Secondaire",
            "Programme_de_fran_ais_cycle_3",
            " leading and trailing ",
            "---",
            "Ärger über Öl",
        ] {
            let once = slugify(s);
            assert_eq!(slugify(&once), once, "input: {s:?}");
        }
    }
}
