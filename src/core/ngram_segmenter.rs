use std::io::ErrorKind;

use log::{debug, trace};

use crate::config::configuration::GramConfig;
use crate::core::char_source::CharSource;
use crate::core::segmentor::Segmenter;
use crate::core::term::{Term, TermType};
use crate::error::{ConfigError, Result, SegmentError};

const SEGMENTER_NAME: &str = "NGRAM_SEGMENTER";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    // no source bound yet
    Unbound,
    // bound, nothing read
    Fresh,
    Streaming,
    Exhausted,
    Failed,
}

// outcome of one attempt to grow the gram window
enum Step {
    Emit(Term),
    // every gram starting at the cursor is out, move to the next char
    Slide,
    End,
}

/// Streaming n-gram segmenter.
///
/// Grams are cut from a fixed size char buffer that slides over the source,
/// so memory stays bounded no matter how long the input is. For every start
/// position all gram lengths in `[min_gram, max_gram]` are emitted shortest
/// first, then the window moves one char to the right. Trailing substrings
/// shorter than `min_gram` are never emitted.
///
/// One segmenter is meant to be reused: `reset` rebinds it to a new source
/// and keeps the buffer allocation.
pub struct NGramSegmenter<S> {
    config: GramConfig,
    buffer: Box<[char]>,
    // number of valid chars in buffer
    filled: usize,
    // buffer index of window_begin
    cursor: usize,
    // absolute char offsets of the current gram, end exclusive
    window_begin: usize,
    window_end: usize,
    eof: bool,
    emitted: usize,
    state: State,
    source: Option<S>,
}

impl<S: CharSource> NGramSegmenter<S> {
    /// A segmenter with a `config.buffer_size()` chars buffer, not yet bound
    /// to a source.
    pub fn new(config: GramConfig) -> Self {
        Self::build(config, config.buffer_size())
    }

    /// Same as `new` with an explicit buffer size. The buffer has to hold at
    /// least one `max_gram` long gram.
    pub fn with_capacity(config: GramConfig, capacity: usize) -> Result<Self, ConfigError> {
        if capacity < config.max_gram() {
            return Err(ConfigError::BufferTooSmall {
                buffer_size: capacity,
                max_gram: config.max_gram(),
            });
        }
        Ok(Self::build(config, capacity))
    }

    /// Build on top of a recycled buffer, e.g. one handed back by
    /// `take_buffer`. Only callers that already checked
    /// `buffer.len() >= config.max_gram()` may use this.
    pub(crate) fn with_buffer(config: GramConfig, buffer: Box<[char]>) -> Self {
        debug_assert!(buffer.len() >= config.max_gram());
        NGramSegmenter {
            buffer,
            ..Self::build(config, 0)
        }
    }

    /// Hand the buffer out for reuse. The segmenter is unbound afterwards
    /// and has to be rebuilt before it can cut grams again.
    pub(crate) fn take_buffer(&mut self) -> Box<[char]> {
        self.state = State::Unbound;
        self.source = None;
        self.filled = 0;
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn from_source(config: GramConfig, source: S) -> Self {
        let mut segmenter = Self::new(config);
        segmenter.reset(source);
        segmenter
    }

    fn build(config: GramConfig, capacity: usize) -> Self {
        NGramSegmenter {
            config,
            buffer: vec!['\0'; capacity].into_boxed_slice(),
            filled: 0,
            cursor: 0,
            window_begin: 0,
            window_end: config.min_gram() - 1,
            eof: false,
            emitted: 0,
            state: State::Unbound,
            source: None,
        }
    }

    pub fn config(&self) -> &GramConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    fn gram_len(&self) -> usize {
        self.window_end - self.window_begin
    }

    // 进入下一个字符开头的窗口
    fn init_next_gram(&mut self) {
        self.cursor += 1;
        self.window_begin += 1;
        self.window_end = self.window_begin + self.config.min_gram() - 1;
    }

    // one read into the free part of the buffer, 0 means end of stream
    fn read_some(&mut self) -> Result<usize> {
        let source = self.source.as_mut().ok_or(SegmentError::ResetRequired)?;
        loop {
            match source.read(&mut self.buffer[self.filled..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(0);
                }
                Ok(n) => {
                    self.filled += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    // move the unconsumed chars buffer[cursor..filled] to the buffer head
    fn slide_tail(&mut self) {
        self.buffer.copy_within(self.cursor..self.filled, 0);
        self.filled -= self.cursor;
        self.cursor = 0;
    }

    // make buffer[cursor..cursor + len] valid, unless the stream ends first
    fn ensure_available(&mut self, len: usize) -> Result<()> {
        while !self.eof && self.cursor + len > self.filled {
            if self.cursor + len > self.buffer.len() {
                self.slide_tail();
            }
            let retained = self.filled;
            let read = self.read_some()?;
            trace!(
                "refill at offset {}: retained {} chars, read {} chars",
                self.window_begin,
                retained,
                read
            );
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<Step> {
        let grown = self.gram_len() + 1;
        self.ensure_available(grown)?;
        if self.cursor + grown <= self.filled {
            self.window_end += 1;
            let text = self.buffer[self.cursor..self.cursor + grown]
                .iter()
                .collect::<String>();
            let term = Term::new(text, self.window_begin, self.window_end, TermType::NGRAM);
            if self.gram_len() >= self.config.max_gram() {
                self.init_next_gram();
            }
            Ok(Step::Emit(term))
        } else if grown == self.config.min_gram() {
            // not even the shortest gram fits, later windows start further right
            Ok(Step::End)
        } else {
            Ok(Step::Slide)
        }
    }

    fn fail(&mut self, err: SegmentError) -> SegmentError {
        debug!(
            "{} failed after {} grams: {}",
            SEGMENTER_NAME, self.emitted, err
        );
        self.state = State::Failed;
        self.source = None;
        err
    }
}

impl<S: CharSource> Segmenter<S> for NGramSegmenter<S> {
    fn reset(&mut self, source: S) {
        self.source = Some(source);
        self.filled = 0;
        self.cursor = 0;
        self.window_begin = 0;
        self.window_end = self.config.min_gram() - 1;
        self.eof = false;
        self.emitted = 0;
        self.state = State::Fresh;
        debug!(
            "{} reset, gram {}..={}, buffer {} chars",
            SEGMENTER_NAME,
            self.config.min_gram(),
            self.config.max_gram(),
            self.buffer.len()
        );
    }

    fn next_term(&mut self) -> Result<Option<Term>> {
        loop {
            match self.state {
                State::Unbound | State::Failed => return Err(SegmentError::ResetRequired),
                State::Exhausted => return Ok(None),
                State::Fresh => {
                    // first read, up to the whole buffer
                    if let Err(e) = self.read_some() {
                        return Err(self.fail(e));
                    }
                    self.state = State::Streaming;
                }
                State::Streaming => {}
            }
            match self.advance() {
                Ok(Step::Emit(term)) => {
                    self.emitted += 1;
                    return Ok(Some(term));
                }
                Ok(Step::Slide) => self.init_next_gram(),
                Ok(Step::End) => {
                    debug!("{} exhausted, {} grams", SEGMENTER_NAME, self.emitted);
                    self.state = State::Exhausted;
                    self.source = None;
                }
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    fn name(&self) -> &str {
        SEGMENTER_NAME
    }
}

/// Yields grams until the source is used up. After an error is yielded the
/// iterator stays empty until the next `reset`.
impl<S: CharSource> Iterator for NGramSegmenter<S> {
    type Item = Result<Term>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Unbound | State::Failed) {
            return None;
        }
        self.next_term().transpose()
    }
}
