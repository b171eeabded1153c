//! Character allow-list applied to the finished story.
//!
//! The chat model occasionally slips characters from other scripts into the
//! output. Only the final text is filtered; streamed partials are shown as-is.

const TURKISH_LETTERS: &str = "çğıöşüÇĞİÖŞÜ";
const PUNCTUATION: &str = ".,;!?:\"'-()";

/// Unicode whitespace plus the information separators U+001C..=U+001F,
/// which also count as whitespace for the story text.
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || is_space(c)
        || TURKISH_LETTERS.contains(c)
        || PUNCTUATION.contains(c)
}

/// Drop every character outside the allow-list.
pub fn clean_story(text: &str) -> String {
    text.chars().filter(|&c| is_allowed(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const ALLOWED_SAMPLE: &str =
        "abcxyzABCXYZ0189çğıöşüÇĞİÖŞÜ .,;!?:\"'-()\t\n\r\u{a0}\u{2003}\u{1c}\u{1d}\u{1e}\u{1f}\u{85}\u{2028}";

    fn random_text(rng: &mut StdRng) -> String {
        let allowed: Vec<char> = ALLOWED_SAMPLE.chars().collect();
        let len = rng.gen_range(0..64);
        (0..len)
            .map(|_| {
                if rng.gen_bool(0.5) {
                    allowed[rng.gen_range(0..allowed.len())]
                } else {
                    rng.gen::<char>()
                }
            })
            .collect()
    }

    #[test]
    fn test_keeps_turkish_text() {
        let text = "Güneş doğarken, İstanbul'un sokakları (sessizdi)!\n\nÇocuk koştu: \"Bak!\"";
        assert_eq!(clean_story(text), text);
    }

    #[test]
    fn test_strips_foreign_scripts_and_symbols() {
        assert_eq!(clean_story("Kedi 猫 uyudu。"), "Kedi  uyudu");
        assert_eq!(clean_story("Deniz ★ mavi — ama…"), "Deniz  mavi  ama");
        assert_eq!(clean_story("Ελλάδα"), "");
    }

    #[test]
    fn test_strips_other_latin_diacritics() {
        assert_eq!(clean_story("café naïve ñ"), "caf nave ");
    }

    #[test]
    fn test_keeps_information_separators() {
        let text = "a\u{1c}b\u{1d}c\u{1e}d\u{1f}e\u{85}f\u{2028}g";
        assert_eq!(clean_story(text), text);
        assert_eq!(clean_story("a\u{1b}b\u{7f}c"), "abc");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_story(""), "");
    }

    #[test]
    fn test_filter_is_idempotent_on_random_input() {
        let mut rng = StdRng::seed_from_u64(0x5709);
        for _ in 0..2000 {
            let text = random_text(&mut rng);
            let once = clean_story(&text);
            assert_eq!(clean_story(&once), once);
        }
    }

    #[test]
    fn test_filter_matches_allow_list_on_random_input() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let text = random_text(&mut rng);
            let cleaned = clean_story(&text);

            assert!(cleaned.chars().all(is_allowed), "kept a disallowed char in {cleaned:?}");

            let expected: Vec<char> = text
                .chars()
                .filter(|c| {
                    c.is_ascii_alphanumeric()
                        || "\t\n\u{b}\u{c}\r\u{1c}\u{1d}\u{1e}\u{1f} \u{85}\u{a0}\u{1680}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}"
                            .contains(*c)
                        || ('\u{2000}'..='\u{200a}').contains(c)
                        || "çğıöşüÇĞİÖŞÜ.,;!?:\"'-()".contains(*c)
                })
                .collect();
            assert_eq!(cleaned.chars().collect::<Vec<_>>(), expected);
        }
    }
}
