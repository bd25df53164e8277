use criterion::*;
use ngram_rs::core::buffered_segmenter::BufferedNGramSegmenter;
use ngram_rs::{GramConfig, NGramSegmenter, Segmenter, StrSource};

const TEXT: &str =
    "张华考上了北京大学；李萍进了中等技术学校；我在百货公司当售货员：我们都有光明的前途";

fn bench_text() -> String {
    TEXT.repeat(200)
}

fn streaming<'a>(segmenter: &mut NGramSegmenter<StrSource<'a>>, text: &'a str) -> usize {
    segmenter.reset(StrSource::new(text));
    segmenter.by_ref().filter(Result::is_ok).count()
}

fn buffered<'a>(segmenter: &mut BufferedNGramSegmenter<StrSource<'a>>, text: &'a str) -> usize {
    segmenter.reset(StrSource::new(text));
    segmenter.by_ref().filter(Result::is_ok).count()
}

fn segmenter_benchmark(c: &mut Criterion) {
    let text = bench_text();
    let config = GramConfig::new(1, 3).unwrap();
    c.bench_function("streaming ngram", |b| {
        let mut segmenter = NGramSegmenter::new(config);
        b.iter(|| streaming(&mut segmenter, black_box(&text)))
    });
    c.bench_function("buffered ngram", |b| {
        let mut segmenter = BufferedNGramSegmenter::new(config);
        b.iter(|| buffered(&mut segmenter, black_box(&text)))
    });
}

criterion_group!(benches, segmenter_benchmark);
criterion_main!(benches);
