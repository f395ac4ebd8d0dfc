//! Assembled CSV records (§3).

use indexmap::IndexMap;

/// One assembled record.
///
/// `Object` fields use `Some(String)` for a field that was present (even if
/// empty, e.g. a trailing delimiter) and `None` for a field the row never
/// reached (only possible when the `Pad` column-count strategy stretches a
/// short row out to the header's length).
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Object(IndexMap<String, Option<String>>),
    Array(Vec<Option<String>>),
}

impl Record {
    /// The number of fields this record carries, regardless of shape.
    pub fn len(&self) -> usize {
        match self {
            Record::Object(map) => map.len(),
            Record::Array(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
