// Dataset — records, CSV loading and the sources the bytes come from.

pub mod loader;
pub mod record;
pub mod source;

pub use loader::load_csv;
pub use record::{ClusterSize, Dataset, Record, TopicId};
pub use source::{load_dataset, source_for, DatasetSource, FileSource, UrlSource};
