//! Text normalization and word splitting.
//!
//! The same tokenizer instance must be used for indexing and querying:
//! every structure in the index stores normalized output, and a query is
//! only comparable to indexed text after passing through the same pipeline.
//! The pipeline is idempotent: feeding a produced token back through
//! `tokenize` yields the token unchanged.

/// A normalization stage applied to the whole input before splitting.
pub type Stage = fn(&str) -> String;

/// Characters the default tokenizer splits on.
pub const DEFAULT_SPLIT_CHARS: &[char] = &[' ', ',', '.', '?', '!', ':', ';', '\t'];

/// Configurable normalization pipeline + word splitter.
pub struct Tokenizer {
    split_chars: Vec<char>,
    pipeline: Vec<Stage>,
}

impl Default for Tokenizer {
    /// Default pipeline: lowercase, fold diacritics, split on
    /// space/comma/period/`?`/`!`/`:`/`;`/tab, dropping empty tokens.
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_CHARS.to_vec(), vec![lowercase, fold_diacritics])
    }
}

impl Tokenizer {
    pub fn new(split_chars: Vec<char>, pipeline: Vec<Stage>) -> Self {
        Self {
            split_chars,
            pipeline,
        }
    }

    /// Run the normalization pipeline without splitting.
    ///
    /// Used for filter tags and filter alternatives, which are compared
    /// whole rather than word by word.
    pub fn normalize(&self, text: &str) -> String {
        let mut text = text.to_string();
        for stage in &self.pipeline {
            text = stage(&text);
        }
        text
    }

    /// Normalize `text` and split it into words.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split(self.split_chars.as_slice())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    /// True if `c` is one of this tokenizer's split characters.
    pub fn is_split_char(&self, c: char) -> bool {
        self.split_chars.contains(&c)
    }
}

/// Lowercase stage
pub fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// Replace accented Latin characters with their base letter.
///
/// Covers Latin-1 Supplement and Latin Extended-A in lowercase form; the
/// default pipeline lowercases first, so uppercase variants never reach
/// this stage. Unmapped characters pass through unchanged.
pub fn fold_diacritics(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'č' | 'ç' | 'ć' | 'ĉ' | 'ċ' => 'c',
        'ď' | 'đ' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ē' | 'ĕ' | 'ė' | 'ę' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'í' | 'ì' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ł' => 'l',
        'ň' | 'ñ' | 'ń' | 'ņ' => 'n',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ō' | 'ŏ' | 'ő' | 'ø' => 'o',
        'ŕ' | 'ř' | 'ŗ' => 'r',
        'š' | 'ś' | 'ŝ' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ů' | 'ũ' | 'ū' | 'ŭ' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_split_and_lowercase() {
        let tok = Tokenizer::default();
        assert_eq!(tok.tokenize("Hello, World!"), vec!["hello", "world"]);
    }

    #[test]
    fn test_empty_tokens_dropped() {
        let tok = Tokenizer::default();
        assert_eq!(tok.tokenize("  ,. ;  "), Vec::<String>::new());
        assert_eq!(tok.tokenize(""), Vec::<String>::new());
    }

    #[test]
    fn test_diacritics_folded() {
        let tok = Tokenizer::default();
        assert_eq!(
            tok.tokenize("Trojúhelník, nejspíš ŘEŘICHA"),
            vec!["trojuhelnik", "nejspis", "rericha"]
        );
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        let tok = Tokenizer::default();
        for token in tok.tokenize("První kousek, Šíp!") {
            assert_eq!(tok.tokenize(&token), vec![token.clone()]);
        }
    }

    #[test]
    fn test_normalize_does_not_split() {
        let tok = Tokenizer::default();
        assert_eq!(tok.normalize("Kruh Čtverec"), "kruh ctverec");
    }

    #[test]
    fn test_custom_split_chars() {
        let tok = Tokenizer::new(vec!['-'], vec![lowercase]);
        assert_eq!(tok.tokenize("A-B-c"), vec!["a", "b", "c"]);
    }
}
