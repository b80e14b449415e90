//! Slug generation
//!
//! Turns article titles into URL-safe identifiers and resolves collisions
//! against the slugs already in storage by appending `-1`, `-2`, ...
//!
//! The functions here are pure. Callers load the set of taken slugs from the
//! repository and rely on the `UNIQUE` constraint on `articles.slug` as the
//! final guard when two publishers race for the same value.

use std::collections::HashSet;

/// Prefix used when a title normalizes to nothing (e.g. `"!!!"` or `"日本"`).
const FALLBACK_PREFIX: &str = "article";

/// Normalize a title into a slug base without any collision handling.
///
/// Lowercases, folds common Latin accents to ASCII, drops apostrophes and
/// quotes, turns every other run of non-alphanumeric characters into a single
/// hyphen, and trims hyphens from both ends. Characters with no ASCII
/// equivalent are dropped.
pub fn slugify(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if matches!(c, '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}') {
            continue;
        }

        let folded = if c.is_ascii() { Some(c) } else { fold_to_ascii(c) };

        match folded {
            Some(c) if c.is_ascii_alphanumeric() => {
                if pending_hyphen && !result.is_empty() {
                    result.push('-');
                }
                pending_hyphen = false;
                result.push(c);
            }
            Some(_) => pending_hyphen = true,
            // Untranslatable characters vanish instead of splitting words.
            None => {}
        }
    }

    result
}

/// Generate a unique slug for `title`.
///
/// `existing` holds every slug currently in use. When updating an article,
/// pass its current slug as `previous_slug` so the article never collides
/// with itself.
///
/// The result is never empty, never a member of `existing` (other than
/// `previous_slug`), and depends only on the arguments.
pub fn generate_slug(
    title: &str,
    existing: &HashSet<String>,
    previous_slug: Option<&str>,
) -> String {
    let base = base_slug(title);
    let taken = |candidate: &str| {
        existing.contains(candidate) && previous_slug != Some(candidate)
    };

    if !taken(&base) {
        return base;
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Slug base for a title, falling back to a short digest of the raw title
/// when normalization leaves nothing.
fn base_slug(title: &str) -> String {
    let slug = slugify(title);
    if !slug.is_empty() {
        return slug;
    }

    let digest = format!("{:x}", md5::compute(title.as_bytes()));
    format!("{}-{}", FALLBACK_PREFIX, &digest[..8])
}

/// Map accented Latin letters to their ASCII base letter.
fn fold_to_ascii(c: char) -> Option<char> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' | 'ß' => 's',
        'ť' | 'ţ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        // Dashes and spaces from other scripts still separate words.
        '\u{2010}'..='\u{2015}' | '\u{00a0}' | '\u{3000}' => ' ',
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("Multiple   spaces"), "multiple-spaces");
        assert_eq!(slugify("under_score"), "under-score");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Banker's Box"), "bankers-box");
        assert_eq!(slugify("Hack: the planet!"), "hack-the-planet");
        assert_eq!(slugify("--already-slugged--"), "already-slugged");
        assert_eq!(slugify("a/b\\c?d"), "a-b-c-d");
    }

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Café Société"), "cafe-societe");
        assert_eq!(slugify("Zürich Leak"), "zurich-leak");
    }

    #[test]
    fn test_slugify_drops_untranslatable() {
        assert_eq!(slugify("日本 Leak"), "leak");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_generate_slug_no_collision() {
        let existing = set(&["other"]);
        assert_eq!(generate_slug("Hello World", &existing, None), "hello-world");
    }

    #[test]
    fn test_generate_slug_appends_suffix() {
        let existing = set(&["hello-world"]);
        assert_eq!(generate_slug("Hello World", &existing, None), "hello-world-1");

        let existing = set(&["hello-world", "hello-world-1", "hello-world-2"]);
        assert_eq!(generate_slug("Hello, World!", &existing, None), "hello-world-3");
    }

    #[test]
    fn test_generate_slug_fills_gaps_in_order() {
        let existing = set(&["leak", "leak-2"]);
        assert_eq!(generate_slug("Leak", &existing, None), "leak-1");
    }

    #[test]
    fn test_generate_slug_ignores_own_previous_slug() {
        let existing = set(&["hello-world", "other"]);
        assert_eq!(
            generate_slug("Hello World", &existing, Some("hello-world")),
            "hello-world"
        );
    }

    #[test]
    fn test_generate_slug_previous_slug_suffix() {
        // Article currently at "leak-1" is retitled to "Leak" while "leak" is taken.
        let existing = set(&["leak", "leak-1"]);
        assert_eq!(generate_slug("Leak", &existing, Some("leak-1")), "leak-1");
    }

    #[test]
    fn test_generate_slug_empty_title_fallback() {
        let existing = HashSet::new();
        let slug = generate_slug("", &existing, None);
        assert!(slug.starts_with("article-"));
        assert_eq!(slug.len(), "article-".len() + 8);

        let punct = generate_slug("???", &existing, None);
        assert!(punct.starts_with("article-"));
        assert_ne!(slug, punct);
    }

    #[test]
    fn test_generate_slug_fallback_collision() {
        let first = generate_slug("!!!", &HashSet::new(), None);
        let existing = set(&[first.as_str()]);
        assert_eq!(generate_slug("!!!", &existing, None), format!("{}-1", first));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_slug_is_url_safe(title in "\\PC{0,60}") {
            let slug = generate_slug(&title, &HashSet::new(), None);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn prop_slug_not_in_existing(
            title in "[a-zA-Z ]{1,20}",
            extra in prop::collection::vec(0u32..8, 0..8)
        ) {
            let base = slugify(&title);
            let mut existing: HashSet<String> = extra
                .iter()
                .map(|n| if *n == 0 { base.clone() } else { format!("{}-{}", base, n) })
                .collect();
            existing.insert("unrelated".to_string());

            let slug = generate_slug(&title, &existing, None);
            prop_assert!(!existing.contains(&slug));
        }

        #[test]
        fn prop_same_base_titles_get_distinct_slugs(word in "[a-z]{1,12}") {
            let mut existing = HashSet::new();
            let first = generate_slug(&word, &existing, None);
            existing.insert(first.clone());
            let second = generate_slug(&word.to_uppercase(), &existing, None);
            prop_assert_ne!(&first, &second);
            prop_assert_eq!(second, format!("{}-1", first));
        }

        #[test]
        fn prop_generate_slug_idempotent(
            title in "\\PC{0,40}",
            taken in prop::collection::hash_set("[a-z]{1,6}(-[0-9])?", 0..10)
        ) {
            let a = generate_slug(&title, &taken, None);
            let b = generate_slug(&title, &taken, None);
            prop_assert_eq!(a, b);
        }
    }
}
