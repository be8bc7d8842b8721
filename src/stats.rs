//! Corpus-wide relation and signal counts
//!
//! Segments of a document are grouped by their `(start, end)` span. One group is one relation
//! instance, and every segment in it is one signal for that relation. The relation's identity is
//! the text the span covers, so equal text in different documents is the same relation.
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::iter::FromIterator;
use corpus::{Corpus, JoinedText};
use farm::{FarmMap, new_farm};
use markup::{self, Segment};
use errors::*;

/// Feature label meaning the annotator found no confirmed signal
pub const UNSURE: &'static str = "unsure";
/// Histogram bucket that groups containing an `unsure` label are counted in
pub const UNSURE_BUCKET: usize = 0;

/// Counts by key
pub type Counter<K> = BTreeMap<K, usize>;
/// Counts by key, then by a second key
pub type Table<K, J> = BTreeMap<K, Counter<J>>;
/// Group size -> how many groups have that size
pub type SizeHistogram = Counter<usize>;

/// The set of feature labels of one group
///
/// Kept as a sorted, deduplicated list so it can be a map key, and so `[a, a, b]` and `[b, a]`
/// are the same combination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureSet(Vec<String>);

impl FeatureSet {
    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureSet {
    fn from_iter<I: IntoIterator<Item=S>>(labels: I) -> Self {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        FeatureSet(labels)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(", "))
    }
}

/// All segments of one document sharing a span
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationGroup {
    /// Covered text, once per segment
    pub relations: Vec<String>,
    /// Feature label, once per segment
    pub features: Vec<String>,
}

impl AnnotationGroup {
    /// Number of segments (signals) in the group
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Signal count bucket of this group: its size, or 0 if anything in it is unsure
    pub fn bucket(&self) -> usize {
        if self.features.iter().any(|f| f == UNSURE) {
            UNSURE_BUCKET
        } else {
            self.len()
        }
    }

    pub fn combination(&self) -> FeatureSet {
        self.features.iter().cloned().collect()
    }
}

/// Group the segments of one document by span
pub fn group_segments(text: &JoinedText, segments: &[Segment]) -> FarmMap<(i64, i64), AnnotationGroup> {
    let mut groups: FarmMap<(i64, i64), AnnotationGroup> = new_farm();
    for segment in segments {
        let group = groups.entry(segment.span()).or_insert_with(AnnotationGroup::default);
        group.relations.push(text.slice(segment.start, segment.end).to_string());
        group.features.push(segment.feature().to_string());
    }
    groups
}

/// Everything counted over a corpus
///
/// Per-feature ("isolated") counts are per segment, combination counts are per group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    /// Relation -> number of groups
    pub relation_count: Counter<String>,
    /// Relation -> number of segments
    pub relation_full_count: Counter<String>,
    /// Relation -> signal count bucket -> number of groups
    pub signal_histogram: Table<String, usize>,
    /// Relation -> feature combination -> number of groups
    pub relation_combinations: Table<String, FeatureSet>,
    /// Feature -> number of segments
    pub signal_count: Counter<String>,
    /// Feature combination -> number of groups
    pub combination_count: Counter<FeatureSet>,
    /// Feature -> relation -> number of segments
    pub signal_relations: Table<String, String>,
    /// Feature combination -> relation -> number of groups
    pub combination_relations: Table<FeatureSet, String>,
}

fn bump<K: Ord>(counter: &mut Counter<K>, key: K, by: usize) {
    *counter.entry(key).or_insert(0) += by;
}

fn bump_in<K: Ord, J: Ord>(table: &mut Table<K, J>, key: K, inner: J) {
    bump(table.entry(key).or_insert_with(Counter::new), inner, 1);
}

impl CorpusStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Count every visible document of a corpus
    ///
    /// One line per entry of the text folder goes to `debug`, with how many groups of each size
    /// it had. Hidden entries are not read and get an empty line (`{}`).
    pub fn collect<W: Write>(corpus: &Corpus, debug: &mut W) -> Result<CorpusStats> {
        let mut stats = CorpusStats::new();
        for document in corpus.documents()? {
            let sizes = if document.is_hidden() {
                debug!("Skipping hidden entry {}", document.id);
                SizeHistogram::new()
            } else {
                let text = document.read_text()?;
                let segments = markup::parse_segments(&document.read_markup()?,
                                                      &document.markup_path)?;
                let sizes = stats.add_document(&document.id, &text, &segments)?;
                info!("{}: {} segments in {} spans",
                    document.id, segments.len(), sizes.values().sum::<usize>());
                sizes
            };
            writeln!(debug, "FILE: {} {:?}", document.text_path.display(), sizes)?;
        }
        info!("Total relations: {}/{}", stats.total_groups(), stats.total_segments());
        Ok(stats)
    }

    /// Count the segments of one document
    ///
    /// Fails with `InconsistentRelation` if one span covers different text in different
    /// segments. Per-segment counts of the document are already added at that point.
    pub fn add_document(&mut self, document: &str, text: &JoinedText, segments: &[Segment])
        -> Result<SizeHistogram> {
        for segment in segments {
            let feature = segment.feature();
            let relation = text.slice(segment.start, segment.end);
            bump(&mut self.signal_count, feature.to_string(), 1);
            bump_in(&mut self.signal_relations, feature.to_string(), relation.to_string());
        }

        let mut sizes = SizeHistogram::new();
        for ((start, end), group) in group_segments(text, segments) {
            self.add_group(document, start, end, &group)?;
            bump(&mut sizes, group.features.len(), 1);
        }
        Ok(sizes)
    }

    /// Count one group of a document
    ///
    /// Every segment of the group must cover the same text.
    pub fn add_group(&mut self, document: &str, start: i64, end: i64, group: &AnnotationGroup)
        -> Result<()> {
        let relation = match group.relations.split_first() {
            Some((first, rest)) if rest.iter().all(|r| r == first) => first.clone(),
            Some(_) => {
                return Err(Error::InconsistentRelation {
                    document: document.to_string(),
                    start: start,
                    end: end,
                    relations: group.relations.clone(),
                });
            }
            // Groups are only made for a segment
            None => return Ok(()),
        };
        let combination = group.combination();

        bump(&mut self.relation_count, relation.clone(), 1);
        bump(&mut self.relation_full_count, relation.clone(), group.len());
        bump_in(&mut self.signal_histogram, relation.clone(), group.bucket());
        bump_in(&mut self.relation_combinations, relation.clone(), combination.clone());
        bump(&mut self.combination_count, combination.clone(), 1);
        bump_in(&mut self.combination_relations, combination, relation);
        Ok(())
    }

    /// Relation instances, counting a span once however many signals it has
    pub fn total_groups(&self) -> usize {
        self.relation_count.values().sum()
    }

    /// Relation annotations, counting every signal
    pub fn total_segments(&self) -> usize {
        self.relation_full_count.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: i64, end: i64, features: &str) -> Segment {
        Segment { start: start, end: end, features: features.to_string() }
    }

    fn set(labels: &[&str]) -> FeatureSet {
        labels.iter().cloned().collect()
    }

    #[test]
    fn combinations_ignore_order_and_duplicates() {
        assert_eq!(set(&["a", "a", "b"]), set(&["b", "a"]));
        assert_eq!(set(&["b", "a", "b"]).to_string(), "{a, b}");
        assert_eq!(set(&[]).to_string(), "{}");
    }

    #[test]
    fn two_signals_on_one_span() {
        let text = JoinedText::new("X and more");
        let mut stats = CorpusStats::new();
        let sizes = stats.add_document("doc", &text,
            &[seg(0, 1, "foo;bar"), seg(0, 1, "foo;baz")]).unwrap();

        assert_eq!(sizes.get(&2), Some(&1));
        assert_eq!(stats.relation_count["X"], 1);
        assert_eq!(stats.relation_full_count["X"], 2);
        assert_eq!(stats.signal_histogram["X"].get(&2), Some(&1));
        assert_eq!(stats.combination_count[&set(&["bar", "baz"])], 1);
        assert_eq!(stats.relation_combinations["X"][&set(&["baz", "bar"])], 1);
        assert_eq!(stats.combination_relations[&set(&["bar", "baz"])]["X"], 1);
        assert_eq!(stats.signal_count["bar"], 1);
        assert_eq!(stats.signal_count["baz"], 1);
        assert_eq!(stats.signal_relations["bar"]["X"], 1);
    }

    #[test]
    fn unsure_goes_to_bucket_zero() {
        let text = JoinedText::new("Yes");
        let mut stats = CorpusStats::new();
        stats.add_document("doc", &text, &[seg(0, 1, "x;unsure"), seg(0, 1, "y;other")]).unwrap();
        assert_eq!(stats.signal_histogram["Y"].len(), 1);
        assert_eq!(stats.signal_histogram["Y"][&UNSURE_BUCKET], 1);
        assert_eq!(stats.relation_full_count["Y"], 2);
    }

    #[test]
    fn conflicting_text_on_one_span_is_fatal() {
        let text = JoinedText::new("ab");
        let group = AnnotationGroup {
            relations: vec!["a".to_string(), "b".to_string()],
            features: vec!["f".to_string(), "g".to_string()],
        };
        match CorpusStats::new().add_group("doc", 0, 1, &group) {
            Err(Error::InconsistentRelation { start: 0, end: 1, ref relations, .. }) => {
                assert_eq!(relations.len(), 2);
            }
            other => panic!("expected an inconsistent relation, got {:?}", other),
        }
        // Through the public path the same span always slices the same text
        assert!(CorpusStats::new()
            .add_document("doc", &text, &[seg(0, 1, "f"), seg(0, 1, "g")])
            .is_ok());
    }

    #[test]
    fn isolated_counts_are_per_segment() {
        let text = JoinedText::new("abcdef");
        let mut stats = CorpusStats::new();
        stats.add_document("one", &text,
            &[seg(0, 2, "s;lex"), seg(0, 2, "s;lex"), seg(2, 4, "s;lex")]).unwrap();
        stats.add_document("two", &text, &[seg(0, 2, "t;lex")]).unwrap();

        assert_eq!(stats.signal_count["lex"], 4);
        assert_eq!(stats.signal_relations["lex"]["ab"], 3);
        assert_eq!(stats.signal_relations["lex"]["cd"], 1);
        // Same text in two documents is the same relation
        assert_eq!(stats.relation_count["ab"], 2);
        assert_eq!(stats.relation_full_count["ab"], 3);
        assert_eq!(stats.combination_count[&set(&["lex"])], 3);
        assert_eq!(stats.total_groups(), 3);
        assert_eq!(stats.total_segments(), 4);
        assert_eq!(stats.signal_histogram["ab"].get(&1), Some(&1));
        assert_eq!(stats.signal_histogram["ab"].get(&2), Some(&1));
    }

    #[test]
    fn segments_group_by_span() {
        let text = JoinedText::new("a\nb");
        let groups = group_segments(&text, &[seg(0, 3, "p"), seg(1, 3, "q"), seg(0, 3, "r")]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&(0, 3)].relations, vec!["a\n_", "a\n_"]);
        assert_eq!(groups[&(0, 3)].features, vec!["p", "r"]);
        assert_eq!(groups[&(1, 3)].bucket(), 1);
    }

    #[test]
    fn negative_spans_are_their_own_groups() {
        let text = JoinedText::new("abcdef");
        let mut stats = CorpusStats::new();
        let sizes = stats.add_document("doc", &text,
            &[seg(-3, -1, "s;lex"), seg(3, 5, "s;lex"), seg(-3, -1, "s;dm")]).unwrap();
        // Same text, two spans
        assert_eq!(stats.relation_count["de"], 2);
        assert_eq!(stats.relation_full_count["de"], 3);
        assert_eq!(sizes.get(&1), Some(&1));
        assert_eq!(sizes.get(&2), Some(&1));
    }
}
