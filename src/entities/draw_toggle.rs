use chrono::{DateTime, Utc};

/// Global draw on/off switch, stored as a single config row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawToggle {
    pub enabled: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl DrawToggle {
    /// Missing config rows and read failures fall back to "enabled".
    pub fn default_enabled() -> Self {
        Self {
            enabled: true,
            updated_at: None,
            updated_by: None,
        }
    }
}
