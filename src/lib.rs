pub mod config;
pub mod core;
pub mod error;

use std::cell::RefCell;

use log::{error, info};
use tantivy::tokenizer::{BoxTokenStream, Token, TokenStream, Tokenizer};

pub use crate::config::configuration::GramConfig;
pub use crate::core::char_source::{CharSource, ReaderSource, StrSource};
pub use crate::core::ngram_segmenter::NGramSegmenter;
pub use crate::core::segmentor::Segmenter;
pub use crate::core::term::{Term, TermType};
pub use crate::error::{ConfigError, SegmentError};

thread_local! {
    // buffer of the last finished token stream on this thread, the next
    // stream picks it up instead of allocating
    static SPARE_BUFFER: RefCell<Option<Box<[char]>>> = RefCell::new(None);
}

// reuse the spare buffer when its size is within [capacity, limit],
// else allocate `capacity` chars
fn acquire_buffer(capacity: usize, limit: usize) -> Box<[char]> {
    SPARE_BUFFER
        .with(|spare| {
            let mut spare = spare.borrow_mut();
            match spare.take() {
                Some(buffer) if (capacity..=limit).contains(&buffer.len()) => Some(buffer),
                other => {
                    *spare = other;
                    None
                }
            }
        })
        .unwrap_or_else(|| vec!['\0'; capacity].into_boxed_slice())
}

// keep the larger of the returned and the spare buffer
fn release_buffer(buffer: Box<[char]>) {
    if buffer.is_empty() {
        return;
    }
    SPARE_BUFFER.with(|spare| {
        let mut spare = spare.borrow_mut();
        if spare.as_ref().map_or(true, |kept| kept.len() < buffer.len()) {
            *spare = Some(buffer);
        }
    });
}

#[derive(Clone, Debug, Default)]
pub struct NGramTokenizer {
    config: GramConfig,
}

pub struct NGramTokenStream<'a> {
    text: &'a str,
    segmenter: NGramSegmenter<StrSource<'a>>,
    token: Token,
    // char offset -> byte offset of the last token start
    char_pos: usize,
    byte_pos: usize,
}

impl<'a> NGramTokenStream<'a> {
    // grams come in non decreasing start order, so walk forward only
    fn byte_offset(&mut self, char_offset: usize) -> usize {
        while self.char_pos < char_offset {
            match self.text[self.byte_pos..].chars().next() {
                Some(c) => self.byte_pos += c.len_utf8(),
                None => break,
            }
            self.char_pos += 1;
        }
        self.byte_pos
    }
}

impl Drop for NGramTokenStream<'_> {
    fn drop(&mut self) {
        release_buffer(self.segmenter.take_buffer());
    }
}

impl TokenStream for NGramTokenStream<'_> {
    fn advance(&mut self) -> bool {
        match self.segmenter.next_term() {
            Ok(Some(term)) => {
                let offset_from = self.byte_offset(term.begin());
                self.token.offset_from = offset_from;
                self.token.offset_to = offset_from + term.text().len();
                self.token.position = term.begin();
                self.token.position_length = term.len();
                self.token.text = term.into_text();
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!("n-gram token stream stopped: {}", e);
                false
            }
        }
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}

impl NGramTokenizer {
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self, ConfigError> {
        Ok(Self::from_config(GramConfig::new(min_gram, max_gram)?))
    }

    pub fn from_config(config: GramConfig) -> Self {
        info!(
            "n-gram tokenizer min_gram: {} max_gram: {} buffer_size: {}",
            config.min_gram(),
            config.max_gram(),
            config.buffer_size()
        );
        Self { config }
    }

    pub fn config(&self) -> &GramConfig {
        &self.config
    }
}

impl Tokenizer for NGramTokenizer {
    fn token_stream<'a>(&self, text: &'a str) -> BoxTokenStream<'a> {
        // a field never needs more buffer than its own length
        let capacity = self
            .config
            .buffer_size()
            .min(text.len().max(self.config.max_gram()));
        // capacity >= max_gram: buffer_size >= max_gram is a GramConfig invariant
        let buffer = acquire_buffer(capacity, self.config.buffer_size());
        let mut segmenter = NGramSegmenter::with_buffer(self.config, buffer);
        segmenter.reset(StrSource::new(text));
        BoxTokenStream::from(NGramTokenStream {
            text,
            segmenter,
            token: Token::default(),
            char_pos: 0,
            byte_pos: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use tantivy::tokenizer::*;

    use crate::{GramConfig, NGramTokenizer};

    fn test_once(tokenizer: &NGramTokenizer, text: &str, expect_tokens: Vec<&str>) {
        let mut token_stream = tokenizer.token_stream(text);
        let mut token_text = Vec::new();
        while let Some(token) = token_stream.next() {
            token_text.push(token.text.clone());
        }

        assert_eq!(token_text, expect_tokens);
    }

    #[test]
    fn tantivy_ngram_works() {
        let tokenizer = NGramTokenizer::default();
        test_once(
            &tokenizer,
            "12345",
            vec!["1", "12", "2", "23", "3", "34", "4", "45", "5"],
        );
        // same tokenizer, next field
        test_once(
            &tokenizer,
            "67890",
            vec!["6", "67", "7", "78", "8", "89", "9", "90", "0"],
        );
        test_once(&tokenizer, "", vec![]);
    }

    #[test]
    fn test_chinese_offsets() {
        let tokenizer = NGramTokenizer::new(2, 3).unwrap();
        let text = "北京大学a";
        let mut token_stream = tokenizer.token_stream(text);
        let mut tokens = Vec::new();
        token_stream.process(&mut |token: &Token| {
            tokens.push((
                token.text.clone(),
                token.offset_from,
                token.offset_to,
                token.position,
                token.position_length,
            ));
        });
        let expect = vec![
            ("北京", 0, 6, 0, 2),
            ("北京大", 0, 9, 0, 3),
            ("京大", 3, 9, 1, 2),
            ("京大学", 3, 12, 1, 3),
            ("大学", 6, 12, 2, 2),
            ("大学a", 6, 13, 2, 3),
            ("学a", 9, 13, 3, 2),
        ];
        assert_eq!(tokens.len(), expect.len());
        for (token, (t, from, to, pos, len)) in tokens.iter().zip(expect) {
            assert_eq!(token.0, t);
            assert_eq!(&text[token.1..token.2], t);
            assert_eq!((token.1, token.2, token.3, token.4), (from, to, pos, len));
        }
    }

    #[test]
    fn test_long_field_crosses_buffer() {
        let config = GramConfig::with_buffer_size(1, 3, 4).unwrap();
        let tokenizer = NGramTokenizer::from_config(config);
        let text = "Lark Search 综搜质量小分队";
        let mut token_stream = tokenizer.token_stream(text);
        let mut count = 0;
        while let Some(token) = token_stream.next() {
            assert_eq!(&text[token.offset_from..token.offset_to], token.text);
            count += 1;
        }
        let chars = text.chars().count();
        // every start position yields three grams except the last two
        assert_eq!(count, chars * 3 - 3);
    }

    #[test]
    fn test_buffer_is_recycled() {
        let spare_len =
            || super::SPARE_BUFFER.with(|spare| spare.borrow().as_ref().map(|b| b.len()));
        super::SPARE_BUFFER.with(|spare| spare.borrow_mut().take());
        let tokenizer = NGramTokenizer::default();
        assert_eq!(tokenizer.config(), &GramConfig::default());

        test_once(
            &tokenizer,
            "abcdefgh",
            vec![
                "a", "ab", "b", "bc", "c", "cd", "d", "de", "e", "ef", "f", "fg", "g", "gh", "h",
            ],
        );
        assert_eq!(spare_len(), Some(8));

        // a shorter field takes the spare buffer while it is streaming
        let mut token_stream = tokenizer.token_stream("xyz");
        assert_eq!(spare_len(), None);
        assert_eq!(
            token_stream.next().map(|t| t.text.clone()),
            Some("x".to_string())
        );
        drop(token_stream);
        assert_eq!(spare_len(), Some(8));

        // a spare above the configured buffer size is never handed out
        let small = NGramTokenizer::from_config(GramConfig::with_buffer_size(1, 2, 4).unwrap());
        test_once(&small, "ab", vec!["a", "ab", "b"]);
        assert_eq!(spare_len(), Some(8));
    }

    #[test]
    fn test_invalid_tokenizer() {
        assert!(NGramTokenizer::new(2, 1).is_err());
        assert!(NGramTokenizer::new(0, 1).is_err());
    }
}
