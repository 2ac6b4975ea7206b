//! Keyword lists and text matching helpers.

/// Openers that make a message a question.
pub const QUESTION_STARTERS: &[&str] = &[
    "come", "cosa", "perché", "perche", "quando", "dove", "chi", "quale", "quanto",
];

/// Technology words the persona finds confusing.
pub const TECH_KEYWORDS: &[&str] = &[
    "app",
    "wifi",
    "internet",
    "computer",
    "telefono",
    "whatsapp",
    "telegram",
    "signal",
    "installare",
    "scaricare",
    "aggiornamento",
    "password",
    "email",
    "foto",
    "video",
    "link",
    "browser",
    "google",
    "facebook",
    "instagram",
];

/// Phrases asking the group for help or opinions.
pub const HELP_PHRASES: &[&str] = &[
    "aiuto",
    "aiutare",
    "spiegare",
    "non capisco",
    "non riesco",
    "come faccio",
    "qualcuno sa",
    "qualcuno può",
    "che ne pensate",
    "cosa fate",
    "consigli",
];

/// Words addressing the whole group.
pub const GROUP_ADDRESS: &[&str] = &[
    "ragazzi", "tutti", "qualcuno", "ciao", "salve", "buongiorno", "buonasera",
];

/// Expressions of confusion.
pub const CONFUSION_WORDS: &[&str] = &["confuso", "capire", "spiegazione", "non so", "boh", "mah"];

/// Lowercased words of `text`, split on anything that is not alphanumeric.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Whether `phrase` (one or more words) appears in `words` as consecutive words.
pub fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle: Vec<String> = self::words(phrase);
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words.windows(needle.len()).any(|window| window == needle.as_slice())
}

/// Whether any of `phrases` appears in `words`.
pub fn contains_any<S: AsRef<str>>(words: &[String], phrases: &[S]) -> bool {
    phrases.iter().any(|p| contains_phrase(words, p.as_ref()))
}

/// Number of distinct `phrases` that appear in `words`.
pub fn count_matches<S: AsRef<str>>(words: &[String], phrases: &[S]) -> usize {
    phrases
        .iter()
        .filter(|p| contains_phrase(words, p.as_ref()))
        .count()
}

/// Non-overlapping, case-insensitive substring occurrences of every keyword.
///
/// Substring counting only grows as text is appended.
pub fn count_occurrences<S: AsRef<str>>(text: &str, keywords: &[S]) -> usize {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| haystack.matches(k.as_str()).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_split_and_lowercase() {
        assert_eq!(
            words("Ciao Nonno! Com'è il WiFi?"),
            vec!["ciao", "nonno", "com", "è", "il", "wifi"]
        );
        assert!(words("  ?! ").is_empty());
    }

    #[test]
    fn test_contains_phrase_respects_word_boundaries() {
        let w = words("io non capisco niente");
        assert!(contains_phrase(&w, "non capisco"));
        assert!(contains_phrase(&w, "capisco"));
        assert!(!contains_phrase(&w, "capisc"));
        assert!(!contains_phrase(&w, "capisco niente ora"));
        assert!(!contains_phrase(&w, ""));
    }

    #[test]
    fn test_count_matches_counts_distinct_keywords() {
        let w = words("la foto sul telefono, un'altra foto");
        assert_eq!(count_matches(&w, TECH_KEYWORDS), 2);
    }

    #[test]
    fn test_count_occurrences_is_substring_based() {
        assert_eq!(count_occurrences("App, apps e WHATSAPP", &["app"]), 3);
        assert_eq!(count_occurrences("niente", TECH_KEYWORDS), 0);
    }
}
