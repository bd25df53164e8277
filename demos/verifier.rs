use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};

use ngram_rs::{GramConfig, NGramSegmenter, ReaderSource, Segmenter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    // simple command line interface
    // verifier <input> <output> [min_gram max_gram]
    // output is csv, one `text,begin,end` record per gram
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 3 && args.len() != 5 {
        eprintln!("usage: verifier <input> <output.csv> [min_gram max_gram]");
        std::process::exit(2);
    }
    let input_filename = &args[1];
    let output_filename = &args[2];
    let config = if args.len() == 5 {
        GramConfig::new(args[3].parse()?, args[4].parse()?)?
    } else {
        GramConfig::default()
    };

    let input_file = File::open(input_filename)?;
    let mut opts = OpenOptions::new();
    opts.create(true).write(true).truncate(true);
    let output_file = opts.open(output_filename)?;
    let mut writer = BufWriter::new(output_file);

    // the whole file is streamed, it never sits in memory at once
    let mut segmenter = NGramSegmenter::new(config);
    segmenter.reset(ReaderSource::new(BufReader::new(input_file)));
    let mut total = 0_usize;
    while let Some(term) = segmenter.next_term()? {
        writeln!(
            writer,
            "{},{},{}",
            csv_field(term.text()),
            term.begin(),
            term.end()
        )?;
        total += 1;
    }
    writer.flush()?;
    let stderr = io::stderr();
    writeln!(stderr.lock(), "{} grams written to {}", total, output_filename)?;
    Ok(())
}

// rfc 4180 quoting: fields holding a comma, quote or line break are wrapped
// in quotes, inner quotes are doubled
fn csv_field(text: &str) -> String {
    if text.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::csv_field;

    #[test]
    fn plain_grams_are_not_quoted() {
        assert_eq!(csv_field("北京"), "北京");
        assert_eq!(csv_field("a b"), "a b");
        assert_eq!(csv_field("a\\"), "a\\");
    }

    #[test]
    fn special_grams_are_quoted() {
        assert_eq!(csv_field(","), "\",\"");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("\""), "\"\"\"\"");
        assert_eq!(csv_field("say \"hi"), "\"say \"\"hi\"");
        assert_eq!(csv_field("a\nb"), "\"a\nb\"");
        assert_eq!(csv_field("\r"), "\"\r\"");
    }
}
