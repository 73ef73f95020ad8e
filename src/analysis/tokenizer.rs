use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;

    /// Token texts only, for callers that don't care about positions.
    fn token_texts(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|t| t.text).collect()
    }
}

/// Default tokenizer for record normalization.
///
/// Splits on whitespace boundaries, keeps case and order, discards empty
/// fragments. Deterministic: joining the output with single spaces and
/// re-tokenizing is a fixed point, which is what keeps stored `tokens` and
/// `raw_text` consistent with each other.
#[derive(Clone, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for (offset, word) in text.split_whitespace().map(|w| {
            // split_whitespace drops empties; recover the byte offset
            (w.as_ptr() as usize - text.as_ptr() as usize, w)
        }) {
            tokens.push(Token::new(word.to_string(), position, offset));
            position += 1;
        }

        tokens
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

/// Unicode-word tokenizer used on the index side.
///
/// Lowercases so that search terms match case-insensitively. Stored record
/// tokens never go through this path.
#[derive(Clone)]
pub struct StandardTokenizer {
    pub lowercase: bool,
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            lowercase: true,
            max_token_length: 255,
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for (offset, word) in text.unicode_word_indices() {
            if word.len() > self.max_token_length {
                continue;
            }
            let token_text = if self.lowercase {
                word.to_lowercase()
            } else {
                word.to_string()
            };
            tokens.push(Token::new(token_text, position, offset));
            position += 1;
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_splits_and_drops_empty_fragments() {
        let tokenizer = WhitespaceTokenizer;
        let tokens = tokenizer.tokenize("  This is \t a text \n");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["This", "is", "a", "text"]);
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[3].position, 3);
    }

    #[test]
    fn whitespace_join_is_a_fixed_point() {
        let tokenizer = WhitespaceTokenizer;
        let tokens = tokenizer.tokenize("This is a text");
        let joined = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(joined, "This is a text");
        let again = tokenizer.tokenize(&joined);
        assert_eq!(tokens, again);
    }

    #[test]
    fn whitespace_preserves_case() {
        let tokenizer = WhitespaceTokenizer;
        let texts: Vec<_> = tokenizer
            .tokenize("Hello WORLD")
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["Hello", "WORLD"]);
    }

    #[test]
    fn standard_lowercases_for_index_terms() {
        let tokenizer = StandardTokenizer::default();
        let texts: Vec<_> = tokenizer
            .tokenize("This is a Text!")
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["this", "is", "a", "text"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(WhitespaceTokenizer.tokenize("").is_empty());
        assert!(WhitespaceTokenizer.tokenize("   ").is_empty());
        assert!(StandardTokenizer::default().tokenize("").is_empty());
    }
}
