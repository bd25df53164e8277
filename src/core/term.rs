use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermType {
    // 滑动窗口切出的词元, 无词性
    NGRAM,
}

impl TermType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermType::NGRAM => "n-gram",
        }
    }
}

/// A gram cut out of the input stream.
///
/// `begin` and `end` are char offsets into the whole stream, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    text: String,
    begin: usize,
    end: usize,
    term_type: TermType,
}

impl Term {
    pub fn new(text: String, begin: usize, end: usize, term_type: TermType) -> Self {
        Term {
            text,
            begin,
            end,
            term_type,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    // length in chars
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.text,
            self.begin,
            self.end,
            self.term_type.as_str()
        )
    }
}
