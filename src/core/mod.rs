pub mod buffered_segmenter;
pub mod char_source;
pub mod ngram_segmenter;
pub mod segmentor;
pub mod term;
