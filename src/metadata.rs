//!
//! Database-wide descriptive settings.
//!
//! A `Database` owns exactly one `Metadata`. It is never merged field by field: loading a
//! database replaces it as a whole through `Database::set_metadata`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Descriptive settings of a database.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    /// Name of the generating application, informational only.
    pub generator: String,
    name: String,
    name_changed: DateTime<Utc>,
    description: String,
    description_changed: DateTime<Utc>,
    pub default_user_name: String,
    /// Number of days history items are kept, `0` disables pruning.
    pub maintenance_history_days: u32,
    pub recycle_bin_enabled: bool,
    /// Group that receives deleted entries when the recycle bin is enabled.
    pub recycle_bin: Option<Uuid>,
    pub entry_templates_group: Option<Uuid>,
    pub last_selected_group: Option<Uuid>,
    pub last_top_visible_group: Option<Uuid>,
    /// Custom icon images keyed by the UUID that groups and entries refer to.
    pub custom_icons: BTreeMap<Uuid, Vec<u8>>,
    /// Free-form string data for plugins and integrations.
    pub custom_data: BTreeMap<String, String>,
}

impl Default for Metadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            generator: env!("CARGO_PKG_NAME").to_string(),
            name: String::new(),
            name_changed: now,
            description: String::new(),
            description_changed: now,
            default_user_name: String::new(),
            maintenance_history_days: 365,
            recycle_bin_enabled: true,
            recycle_bin: None,
            entry_templates_group: None,
            last_selected_group: None,
            last_top_visible_group: None,
            custom_icons: BTreeMap::new(),
            custom_data: BTreeMap::new(),
        }
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_changed(&self) -> DateTime<Utc> {
        self.name_changed
    }

    /// Sets the database name and stamps the change time.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.name_changed = Utc::now();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn description_changed(&self) -> DateTime<Utc> {
        self.description_changed
    }

    /// Sets the database description and stamps the change time.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.description_changed = Utc::now();
    }

    /// Stores a custom icon and returns the UUID to reference it by.
    pub fn add_custom_icon(&mut self, image: Vec<u8>) -> Uuid {
        let uuid = Uuid::new_v4();
        self.custom_icons.insert(uuid, image);
        uuid
    }

    pub fn custom_icon(&self, uuid: &Uuid) -> Option<&[u8]> {
        self.custom_icons.get(uuid).map(Vec::as_slice)
    }
}
