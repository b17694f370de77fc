// CSV loader — parses rows, drops unassigned topics, derives combined_text.
//
// Only the `topic`, `op_title` and `op_text` columns are read; anything else
// in the file is ignored. Short rows are tolerated and their missing cells
// read as null.

use std::io::Read;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::{debug, info};

use super::record::{is_null_cell, Dataset, Record, TopicId};

const TOPIC_COLUMN: &str = "topic";
const TITLE_COLUMN: &str = "op_title";
const TEXT_COLUMN: &str = "op_text";

/// Parse a CSV document into a filtered [`Dataset`].
///
/// Rows whose topic is missing or `-1` are dropped. A file without a
/// `topic` column is an error; missing `op_title` / `op_text` columns read
/// as null in every row.
pub fn load_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let topic_idx = column(TOPIC_COLUMN).with_context(|| {
        format!(
            "Dataset has no `{TOPIC_COLUMN}` column (found: {})",
            headers.iter().collect::<Vec<_>>().join(", ")
        )
    })?;
    let title_idx = column(TITLE_COLUMN);
    let text_idx = column(TEXT_COLUMN);

    if title_idx.is_none() || text_idx.is_none() {
        debug!(
            has_title = title_idx.is_some(),
            has_text = text_idx.is_some(),
            "Text columns missing, treating them as empty"
        );
    }

    let mut records = Vec::new();
    let mut rows_read = 0usize;

    for (line, row) in csv_reader.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row = row.with_context(|| format!("Malformed CSV row near line {}", line + 2))?;
        rows_read += 1;

        let Some(topic) = row.get(topic_idx).and_then(TopicId::parse) else {
            continue;
        };

        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .filter(|raw| !is_null_cell(raw))
                .map(str::to_string)
        };

        records.push(Record::new(topic, cell(title_idx), cell(text_idx)));
    }

    let dataset = Dataset::new(records);
    info!(
        rows = rows_read,
        kept = dataset.len(),
        dropped = rows_read - dataset.len(),
        clusters = dataset.clusters().len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_filters_unassigned_topics() {
        let csv = "topic,op_title,op_text\n\
                   1,Hello,World\n\
                   -1,Dropped,Row\n\
                   ,Also,Dropped\n\
                   2.0,,Only text\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].combined_text(), "Hello. World");
        assert_eq!(ds.records()[1].topic().as_str(), "2");
        assert_eq!(ds.records()[1].op_title(), None);
        assert_eq!(ds.records()[1].combined_text(), ". Only text");
    }

    #[test]
    fn test_load_missing_topic_column_fails() {
        let csv = "op_title,op_text\nHello,World\n";
        let err = load_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("topic"), "unexpected error: {err}");
    }

    #[test]
    fn test_load_extra_and_missing_columns() {
        let csv = "id,topic,op_text,score\n\
                   a,7,\"Quoted, with comma\",0.5\n\
                   b,7\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].combined_text(), ". Quoted, with comma");
        assert_eq!(ds.records()[1].op_text(), None);
    }
}
