use crate::core::char_source::CharSource;
use crate::core::term::Term;
use crate::error::Result;

pub trait Segmenter<S: CharSource> {
    /// Bind a new source and forget everything about the previous one.
    fn reset(&mut self, source: S);
    /// Next gram, `Ok(None)` once the source is used up.
    fn next_term(&mut self) -> Result<Option<Term>>;
    fn name(&self) -> &str;
}
