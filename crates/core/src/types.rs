/// Catalog identifiers are small positive integers assigned by the data set.
pub type LocationId = i64;

/// All persisted timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
