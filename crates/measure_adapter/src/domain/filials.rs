use crate::domain::display_value;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

fn default_mrf() -> String {
    "mrf".to_string()
}

/// Region → filial lookup, plus the MRF prefix used to name the
/// customer-DN request parameter (`"<mrf>.customer_dn"`).
///
/// Loaded once at start and shared read-only by every dispatch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilialDirectory {
    #[serde(default = "default_mrf")]
    mrf: String,
    #[serde(default)]
    filials: HashMap<String, Value>,
}

impl Default for FilialDirectory {
    fn default() -> Self {
        Self {
            mrf: default_mrf(),
            filials: HashMap::new(),
        }
    }
}

impl FilialDirectory {
    pub fn new(mrf: impl Into<String>, filials: HashMap<String, Value>) -> Self {
        Self {
            mrf: mrf.into(),
            filials,
        }
    }

    pub fn mrf(&self) -> &str {
        &self.mrf
    }

    /// Parameter key carrying the customer DN.
    pub fn customer_dn_key(&self) -> String {
        format!("{}.customer_dn", self.mrf)
    }

    /// Filial of a region; region ids are matched by their string form so
    /// `42` and `"42"` resolve alike.
    pub fn lookup(&self, region_id: &Value) -> Option<&Value> {
        self.filials.get(&display_value(region_id))
    }
}
