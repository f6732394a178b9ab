use crate::domain::is_falsy;
use serde_json::{Map, Value};

/// Static source-key → target-key translation table.
pub type KeyTable = [(&'static str, &'static str)];

/// Whether falsy values (`0`, `""`, `false`, `null`) survive the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FalsyPolicy {
    Keep,
    Drop,
}

/// Renames the keys of a flat record through a [`KeyTable`].
///
/// Keys missing from the table and keys in the omit list are dropped; the
/// output keeps the source record's key order.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper {
    table: &'static KeyTable,
    omit: &'static [&'static str],
    policy: FalsyPolicy,
}

impl FieldMapper {
    pub const fn keep_falsy(table: &'static KeyTable) -> Self {
        Self {
            table,
            omit: &[],
            policy: FalsyPolicy::Keep,
        }
    }

    /// Used for outgoing request parameters so absent or zero values are left
    /// out rather than sent.
    pub const fn drop_falsy(table: &'static KeyTable) -> Self {
        Self {
            table,
            omit: &[],
            policy: FalsyPolicy::Drop,
        }
    }

    pub const fn omitting(self, omit: &'static [&'static str]) -> Self {
        Self { omit, ..self }
    }

    pub fn translate(&self, key: &str) -> Option<&'static str> {
        self.table
            .iter()
            .find(|(source, _)| *source == key)
            .map(|(_, target)| *target)
    }

    /// Maps an object; any other value maps to an empty record.
    pub fn map(&self, source: &Value) -> Map<String, Value> {
        source
            .as_object()
            .map(|record| self.map_record(record))
            .unwrap_or_default()
    }

    pub fn map_record(&self, record: &Map<String, Value>) -> Map<String, Value> {
        record
            .iter()
            .filter(|(key, _)| !self.omit.contains(&key.as_str()))
            .filter(|(_, value)| self.policy == FalsyPolicy::Keep || !is_falsy(value))
            .filter_map(|(key, value)| {
                self.translate(key)
                    .map(|target| (target.to_string(), value.clone()))
            })
            .collect()
    }
}
