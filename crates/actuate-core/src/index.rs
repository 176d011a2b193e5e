//! Snapshot of installed automations.

use serde::{Deserialize, Serialize};

/// A single installed automation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AutomationRecord {
    pub name: String,

    /// Opaque identifier, when the index provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl AutomationRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
        }
    }
}

/// Ordered set of installed automations, fetched fresh for every resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutomationIndex {
    records: Vec<AutomationRecord>,
}

impl AutomationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index, dropping exact duplicate records and records without a name.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = AutomationRecord>,
    {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Insert a record unless an identical one is already present.
    ///
    /// Returns `false` when the record was rejected.
    pub fn insert(&mut self, record: AutomationRecord) -> bool {
        if record.name.is_empty() || self.records.contains(&record) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &AutomationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<AutomationRecord> for AutomationIndex {
    fn from_iter<I: IntoIterator<Item = AutomationRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl<'a> IntoIterator for &'a AutomationIndex {
    type Item = &'a AutomationRecord;
    type IntoIter = std::slice::Iter<'a, AutomationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
