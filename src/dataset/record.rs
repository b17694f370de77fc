// Records, topic labels and the filtered dataset.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Cell values read as missing. Matched exactly: no trimming, no case folding,
/// so "Nan" or "none" are real text. Same set as pandas' default `na_values`.
const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Topic label meaning "no topic assigned".
const UNASSIGNED_TOPIC: &str = "-1";

/// Whether a raw CSV cell should be read as missing.
pub fn is_null_cell(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw)
}

/// A categorical topic label.
///
/// Only obtainable through [`TopicId::parse`], so a `TopicId` is never null
/// and never the "unassigned" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Parse a raw label. Returns `None` for missing labels and for `-1`.
    ///
    /// Integral numbers lose their fractional part, so `"3"`, `"3.0"` and
    /// `" 3 "` are the same topic.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        // A blank label names no topic, even though blank text is kept
        if is_null_cell(raw) || trimmed.is_empty() {
            return None;
        }
        let label = match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", value as i64)
            }
            _ => trimmed.to_string(),
        };
        if label == UNASSIGNED_TOPIC {
            return None;
        }
        Some(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the dataset.
///
/// `combined_text` is derived once in [`Record::new`] and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    topic: TopicId,
    op_title: Option<String>,
    op_text: Option<String>,
    combined_text: String,
}

impl Record {
    pub fn new(topic: TopicId, op_title: Option<String>, op_text: Option<String>) -> Self {
        let combined_text = format!(
            "{}. {}",
            op_title.as_deref().unwrap_or_default(),
            op_text.as_deref().unwrap_or_default()
        );
        Self {
            topic,
            op_title,
            op_text,
            combined_text,
        }
    }

    pub fn topic(&self) -> &TopicId {
        &self.topic
    }

    pub fn op_title(&self) -> Option<&str> {
        self.op_title.as_deref()
    }

    pub fn op_text(&self) -> Option<&str> {
        self.op_text.as_deref()
    }

    /// Title and body joined as `"<title>. <text>"`.
    pub fn combined_text(&self) -> &str {
        &self.combined_text
    }
}

/// Size of one topic cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSize {
    pub topic: TopicId,
    pub size: usize,
}

/// An immutable, filtered collection of records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every cluster with its size, in order of first appearance.
    pub fn clusters(&self) -> Vec<ClusterSize> {
        let mut index: HashMap<&TopicId, usize> = HashMap::new();
        let mut clusters: Vec<ClusterSize> = Vec::new();
        for record in &self.records {
            match index.get(record.topic()) {
                Some(&i) => clusters[i].size += 1,
                None => {
                    index.insert(record.topic(), clusters.len());
                    clusters.push(ClusterSize {
                        topic: record.topic().clone(),
                        size: 1,
                    });
                }
            }
        }
        clusters
    }

    /// Records belonging to `topic`, in dataset order.
    pub fn members(&self, topic: &TopicId) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.topic() == topic)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_parse_normalizes_numbers() {
        assert_eq!(TopicId::parse("3").unwrap().as_str(), "3");
        assert_eq!(TopicId::parse("3.0").unwrap().as_str(), "3");
        assert_eq!(TopicId::parse(" 12 ").unwrap().as_str(), "12");
        assert_eq!(TopicId::parse("2.5").unwrap().as_str(), "2.5");
        assert_eq!(TopicId::parse("sports").unwrap().as_str(), "sports");
    }

    #[test]
    fn test_topic_parse_rejects_null_and_sentinel() {
        assert!(TopicId::parse("").is_none());
        assert!(TopicId::parse("  ").is_none());
        assert!(TopicId::parse("NaN").is_none());
        assert!(TopicId::parse("-1").is_none());
        assert!(TopicId::parse("-1.0").is_none());
        assert!(TopicId::parse("-2").is_some());
    }

    #[test]
    fn test_null_cells_match_exactly() {
        assert!(is_null_cell(""));
        assert!(is_null_cell("NaN"));
        assert!(is_null_cell("N/A"));
        assert!(is_null_cell("None"));
        assert!(!is_null_cell("Nan"));
        assert!(!is_null_cell("none"));
        assert!(!is_null_cell(" NaN"));
        assert!(!is_null_cell("  "));
    }

    #[test]
    fn test_combined_text() {
        let topic = TopicId::parse("1").unwrap();
        let r = Record::new(topic.clone(), Some("Title".into()), Some("Body".into()));
        assert_eq!(r.combined_text(), "Title. Body");

        let r = Record::new(topic.clone(), None, Some("Body".into()));
        assert_eq!(r.combined_text(), ". Body");

        let r = Record::new(topic, None, None);
        assert_eq!(r.combined_text(), ". ");
    }

    #[test]
    fn test_clusters_in_first_appearance_order() {
        let rec = |t: &str| Record::new(TopicId::parse(t).unwrap(), None, None);
        let ds = Dataset::new(vec![rec("b"), rec("a"), rec("b"), rec("c"), rec("a"), rec("b")]);
        let clusters = ds.clusters();
        let got: Vec<(&str, usize)> = clusters
            .iter()
            .map(|c| (c.topic.as_str(), c.size))
            .collect();
        assert_eq!(got, vec![("b", 3), ("a", 2), ("c", 1)]);
        assert_eq!(ds.members(&TopicId::parse("a").unwrap()).len(), 2);
    }
}
