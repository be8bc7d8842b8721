//! Plain text reports over the corpus counts
//!
//! Keys are written in ascending order; feature combinations in the order of their sorted labels.
use std::io::{self, Write};
use stats::{CorpusStats, UNSURE_BUCKET};

/// Counts keyed by relation: `relation_keys.txt`
pub fn write_relation_report<W: Write>(stats: &CorpusStats, out: &mut W) -> io::Result<()> {
    for (relation, count) in &stats.relation_count {
        write!(out, "{}\t{}\n", relation, count)?;
    }
    // Spans counted once, then every annotation of a span
    write!(out, "\n\nTotal relations: {}/{}\n\n", stats.total_groups(), stats.total_segments())?;

    for (relation, histogram) in &stats.signal_histogram {
        write!(out, "{} ({})\n", relation, stats.relation_count.get(relation).cloned().unwrap_or(0))?;
        for (&signals, count) in histogram {
            if signals == UNSURE_BUCKET {
                write!(out, "\t0 signal(s) (unsure): {}\n", count)?;
            } else {
                write!(out, "\t{} signal(s): {}\n", signals, count)?;
            }
        }
        write!(out, "\n")?;
        if let Some(combinations) = stats.relation_combinations.get(relation) {
            for (combination, count) in combinations {
                write!(out, "\t{}: {}\n", combination, count)?;
            }
        }
    }
    Ok(())
}

/// Counts keyed by signal: `signal_keys.txt`
pub fn write_signal_report<W: Write>(stats: &CorpusStats, out: &mut W) -> io::Result<()> {
    write!(out, "Signal counts isolated:\n\n")?;
    for (signal, count) in &stats.signal_count {
        write!(out, "\t{}: {}\n", signal, count)?;
    }

    write!(out, "\n\nSignal counts in combination:\n\n")?;
    for (combination, count) in &stats.combination_count {
        write!(out, "\t{}: {}\n", combination, count)?;
    }

    write!(out, "\n\nSignal counts (isolated) split up by relations:\n\n")?;
    for (signal, relations) in &stats.signal_relations {
        write!(out, "\t{} ({})\n", signal, stats.signal_count.get(signal).cloned().unwrap_or(0))?;
        for (relation, count) in relations {
            write!(out, "\t\t{}: {}\n", relation, count)?;
        }
    }

    write!(out, "\n\nSignal counts (combined) split up by relations:\n\n")?;
    for (combination, relations) in &stats.combination_relations {
        write!(out, "\t{}: {}\n", combination,
            stats.combination_count.get(combination).cloned().unwrap_or(0))?;
        for (relation, count) in relations {
            write!(out, "\t\t{}: {}\n", relation, count)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus::JoinedText;
    use markup::Segment;

    fn seg(start: i64, end: i64, features: &str) -> Segment {
        Segment { start: start, end: end, features: features.to_string() }
    }

    fn sample() -> CorpusStats {
        let text = JoinedText::new("XY");
        let mut stats = CorpusStats::new();
        stats.add_document("doc", &text, &[
            seg(0, 1, "foo;bar"),
            seg(0, 1, "foo;baz"),
            seg(1, 2, "unsure"),
        ]).unwrap();
        stats
    }

    fn render<F>(write: F) -> String
        where F: Fn(&CorpusStats, &mut Vec<u8>) -> io::Result<()> {
        let mut out = vec![];
        write(&sample(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn relation_report_layout() {
        let expected = "X\t1\n\
                        Y\t1\n\
                        \n\nTotal relations: 2/3\n\n\
                        X (1)\n\
                        \t2 signal(s): 1\n\
                        \n\
                        \t{bar, baz}: 1\n\
                        Y (1)\n\
                        \t0 signal(s) (unsure): 1\n\
                        \n\
                        \t{unsure}: 1\n";
        assert_eq!(render(|s, o| write_relation_report(s, o)), expected);
    }

    #[test]
    fn signal_report_layout() {
        let expected = "Signal counts isolated:\n\n\
                        \tbar: 1\n\
                        \tbaz: 1\n\
                        \tunsure: 1\n\
                        \n\nSignal counts in combination:\n\n\
                        \t{bar, baz}: 1\n\
                        \t{unsure}: 1\n\
                        \n\nSignal counts (isolated) split up by relations:\n\n\
                        \tbar (1)\n\
                        \t\tX: 1\n\
                        \tbaz (1)\n\
                        \t\tX: 1\n\
                        \tunsure (1)\n\
                        \t\tY: 1\n\
                        \n\nSignal counts (combined) split up by relations:\n\n\
                        \t{bar, baz}: 1\n\
                        \t\tX: 1\n\
                        \t{unsure}: 1\n\
                        \t\tY: 1\n";
        assert_eq!(render(|s, o| write_signal_report(s, o)), expected);
    }

    #[test]
    fn empty_corpus_still_has_headings() {
        let mut out = vec![];
        write_relation_report(&CorpusStats::new(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n\nTotal relations: 0/0\n\n");
    }
}
