//! Text normalization, language detection and keyword extraction for the
//! intent matcher.
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Letters counted as Arabic by [`detect_language`].
const ARABIC_LETTERS: &str = "ءآأؤإئابةتثجحخدذرزسشصضطظعغفقكلمنهوي";

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "a", "an", "in", "on", "at", "and", "or", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "do", "does", "did", "will", "would", "could", "should", "may",
    "might", "must", "can", "to", "of", "for", "with", "by", "from", "up", "about", "into",
    "through", "during", "before", "after", "above", "below", "between", "among", "this", "that",
    "these", "those", "i", "me", "my", "we", "our", "you", "your", "it", "its",
];

const ARABIC_STOPWORDS: &[&str] = &[
    "في", "من", "على", "إلى", "الى", "عن", "مع", "هذا", "هذه", "ذلك", "تلك", "التي", "الذي",
    "الذين", "أن", "إن", "ان", "كان", "كانت", "لا", "لم", "لن", "قد", "ثم", "أو", "او", "هو",
    "هي", "هم", "نحن", "أنا", "انت", "أنت", "كل", "بعد", "قبل", "عند", "حتى", "إذا", "اذا",
    "لكن", "بين", "كما", "أي", "اي", "ما", "و", "يا",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static STOPWORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOPWORDS.get_or_init(|| {
        ENGLISH_STOPWORDS
            .iter()
            .chain(ARABIC_STOPWORDS.iter())
            .copied()
            .collect()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Arabic,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
        }
    }

    /// Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("ar") {
            Language::Arabic
        } else {
            Language::English
        }
    }
}

/// Arabic diacritics; Arabic letters are already alphanumeric.
fn is_arabic_mark(c: char) -> bool {
    ('\u{064B}'..='\u{065F}').contains(&c) || c == '\u{0670}'
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || is_arabic_mark(c)
}

/// Lowercase, replace ASCII punctuation with spaces and split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Cleaned, stopword-free form of `text`; tokens are joined with one space.
pub fn preprocess(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();

    tokenize(&cleaned)
        .into_iter()
        .filter(|token| token.chars().count() > 1 && !stopwords().contains(token.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Arabic when more than 30% of the letters are Arabic.
pub fn detect_language(text: &str) -> Language {
    let arabic = text.chars().filter(|c| ARABIC_LETTERS.contains(*c)).count();
    let english = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let total = arabic + english;
    if total == 0 {
        return Language::English;
    }
    if arabic as f64 / total as f64 > 0.3 {
        Language::Arabic
    } else {
        Language::English
    }
}

/// Up to `max` tokens longer than two characters, most frequent first, then longest.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let processed = preprocess(text);
    let mut order: Vec<&str> = Vec::new();
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for word in processed.split(' ').filter(|w| w.chars().count() > 2) {
        let count = freq.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among ties.
    order.sort_by(|a, b| {
        freq[b]
            .cmp(&freq[a])
            .then_with(|| b.chars().count().cmp(&a.chars().count()))
    });
    order.into_iter().take(max).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_drops_stopwords_and_punctuation() {
        assert_eq!(preprocess("How to bid on items?"), "how bid items");
        assert_eq!(preprocess("  The   payment,   methods! "), "payment methods");
        assert_eq!(preprocess("a I ?"), "");
    }

    #[test]
    fn test_preprocess_keeps_arabic() {
        assert_eq!(preprocess("كيف أزايد على منتج؟"), "كيف أزايد منتج");
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("مرحبا"), Language::Arabic);
        assert_eq!(detect_language("hello there"), Language::English);
        assert_eq!(detect_language("12345 !!"), Language::English);
        assert_eq!(detect_language("ok مرحبا"), Language::Arabic);
        assert_eq!(detect_language("hello world مر"), Language::English);
    }

    #[test]
    fn test_extract_keywords_ranks_by_frequency_then_length() {
        let keywords = extract_keywords("bid bid auction payment bid auction xy", 5);
        assert_eq!(keywords, vec!["bid", "auction", "payment"]);
        assert_eq!(extract_keywords("shipping delivery tracking", 2).len(), 2);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("ar"), Language::Arabic);
        assert_eq!(Language::from_code("fr"), Language::English);
        assert_eq!(Language::English.code(), "en");
    }
}
