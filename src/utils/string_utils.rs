//! Folder-name sanitization for page-supplied text
//!
//! Product titles arrive straight from the remote DOM, so everything in here
//! is total: any `&str` maps to a usable folder name and nothing panics.

use super::constants::PLACEHOLDER_FOLDER_NAME;

/// Transliterate the accented letters common in the catalogs we scrape.
///
/// Covers the Azerbaijani/Turkish alphabet plus the usual Latin-1 vowels.
/// Anything not listed here is left for the character filter to drop.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        'ə' => "e",
        'Ə' => "E",
        'ö' | 'ò' | 'ó' | 'ô' | 'õ' => "o",
        'Ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' => "O",
        'ü' | 'ù' | 'ú' | 'û' => "u",
        'Ü' | 'Ù' | 'Ú' | 'Û' => "U",
        'ğ' => "g",
        'Ğ' => "G",
        'ı' | 'ì' | 'í' | 'î' | 'ï' => "i",
        'İ' | 'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ş' => "s",
        'Ş' => "S",
        'ç' => "c",
        'Ç' => "C",
        'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ä' | 'Ã' | 'Å' => "A",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ñ' => "n",
        'Ñ' => "N",
        'ß' => "ss",
        _ => return None,
    };
    Some(mapped)
}

/// Turn arbitrary page text into an upper-case, filesystem-safe folder name.
///
/// Steps: transliterate known accented letters, drop everything outside
/// `[A-Za-z0-9 _-]`, treat runs of whitespace and hyphens as one separator
/// rendered as `_`, upper-case. Blank results become
/// [`PLACEHOLDER_FOLDER_NAME`]. The output only ever contains `[A-Z0-9_]`.
///
/// # Examples
/// ```
/// # use kodegen_tools_shopscrape::utils::sanitize_folder_name;
/// assert_eq!(sanitize_folder_name("Şam  Yağı - 5W40"), "SAM_YAGI_5W40");
/// assert_eq!(sanitize_folder_name("   "), "UNKNOWN");
/// ```
#[must_use]
pub fn sanitize_folder_name(name: &str) -> String {
    let mut filtered = String::with_capacity(name.len());
    for c in name.chars() {
        if let Some(ascii) = transliterate(c) {
            filtered.push_str(ascii);
        } else if c.is_ascii_alphanumeric() || c == '_' {
            filtered.push(c);
        } else if c == '-' || c.is_whitespace() {
            filtered.push(' ');
        }
    }

    let joined = filtered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_uppercase();

    if joined.trim_matches('_').is_empty() {
        PLACEHOLDER_FOLDER_NAME.to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_and_uppercases() {
        assert_eq!(sanitize_folder_name("Əyləc bəndi"), "EYLEC_BENDI");
        assert_eq!(sanitize_folder_name("Güc sükanı nasosu"), "GUC_SUKANI_NASOSU");
    }

    #[test]
    fn strips_path_and_shell_characters() {
        assert_eq!(sanitize_folder_name(r#"a/b\c*d?e:"f<g>h|i"#), "ABCDEFGHI");
        assert_eq!(sanitize_folder_name("Filter (OEM) #12"), "FILTER_OEM_12");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(sanitize_folder_name("  brake \t\n pad  "), "BRAKE_PAD");
        assert_eq!(sanitize_folder_name("front--left"), "FRONT_LEFT");
    }

    #[test]
    fn blank_input_maps_to_placeholder() {
        assert_eq!(sanitize_folder_name(""), PLACEHOLDER_FOLDER_NAME);
        assert_eq!(sanitize_folder_name("   "), PLACEHOLDER_FOLDER_NAME);
        assert_eq!(sanitize_folder_name("!!!"), PLACEHOLDER_FOLDER_NAME);
        assert_eq!(sanitize_folder_name("___"), PLACEHOLDER_FOLDER_NAME);
        assert_eq!(sanitize_folder_name("日本語"), PLACEHOLDER_FOLDER_NAME);
    }
}
