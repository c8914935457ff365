//! Raw grouping results returned by the document store.
//!
//! Keys are the stored string labels; interpreting and ordering them is the
//! caller's job.

/// Number of documents sharing one value of a grouped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBucket {
    pub key: String,
    pub count: u64,
}

impl GroupBucket {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Number of documents created in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// Several groupings computed by a single query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryBuckets {
    pub total: u64,
    /// Documents whose value is `high` or `critical`.
    pub high_or_critical: u64,
    pub by_type: Vec<GroupBucket>,
    pub by_status: Vec<GroupBucket>,
    pub by_value: Vec<GroupBucket>,
    pub by_classification: Vec<GroupBucket>,
}
