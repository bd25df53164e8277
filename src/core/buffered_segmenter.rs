use std::collections::VecDeque;
use std::io::ErrorKind;

use log::debug;

use crate::config::configuration::GramConfig;
use crate::core::char_source::CharSource;
use crate::core::segmentor::Segmenter;
use crate::core::term::{Term, TermType};
use crate::error::{Result, SegmentError};

const SEGMENTER_NAME: &str = "BUFFERED_NGRAM_SEGMENTER";
const READ_CHUNK: usize = 4096;

/// Reads the whole source, then cuts every gram at once.
///
/// Memory grows with the input, so this is only meant for small, already
/// buffered texts. It yields exactly what `NGramSegmenter` yields.
pub struct BufferedNGramSegmenter<S> {
    config: GramConfig,
    content: Vec<char>,
    terms: VecDeque<Term>,
    source: Option<S>,
    analyzed: bool,
    failed: bool,
}

impl<S: CharSource> BufferedNGramSegmenter<S> {
    pub fn new(config: GramConfig) -> Self {
        BufferedNGramSegmenter {
            config,
            content: Vec::new(),
            terms: VecDeque::new(),
            source: None,
            analyzed: false,
            failed: false,
        }
    }

    // 一次性读取所有待分词的文本
    fn read_content(&mut self) -> Result<()> {
        let source = self.source.as_mut().ok_or(SegmentError::ResetRequired)?;
        let mut chunk = ['\0'; READ_CHUNK];
        loop {
            match source.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => self.content.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn analyze(&mut self) {
        let min_gram = self.config.min_gram();
        let max_gram = self.config.max_gram();
        let length = self.content.len();
        for begin in 0..length {
            for len in min_gram..=max_gram {
                let end = begin + len;
                if end > length {
                    break;
                }
                let text = self.content[begin..end].iter().collect::<String>();
                self.terms
                    .push_back(Term::new(text, begin, end, TermType::NGRAM));
            }
        }
        debug!(
            "{} cut {} grams from {} chars",
            SEGMENTER_NAME,
            self.terms.len(),
            length
        );
    }
}

impl<S: CharSource> Segmenter<S> for BufferedNGramSegmenter<S> {
    fn reset(&mut self, source: S) {
        self.content.clear();
        self.terms.clear();
        self.source = Some(source);
        self.analyzed = false;
        self.failed = false;
    }

    fn next_term(&mut self) -> Result<Option<Term>> {
        if self.failed {
            return Err(SegmentError::ResetRequired);
        }
        if !self.analyzed {
            if let Err(e) = self.read_content() {
                self.failed = true;
                self.source = None;
                self.content.clear();
                return Err(e);
            }
            self.source = None;
            self.analyze();
            self.content.clear();
            self.analyzed = true;
        }
        Ok(self.terms.pop_front())
    }

    fn name(&self) -> &str {
        SEGMENTER_NAME
    }
}

impl<S: CharSource> Iterator for BufferedNGramSegmenter<S> {
    type Item = Result<Term>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || (!self.analyzed && self.source.is_none()) {
            return None;
        }
        self.next_term().transpose()
    }
}
