use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The only rank list the application uses.
pub const MAIN_LIST: &str = "main";

/// Current `version` written into the data file.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Park {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coaster {
    pub id: String,
    pub name: String,
    pub park_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One coaster's slot in a rank list. Position 1 is the best slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rank {
    pub list_id: String,
    pub coaster_id: String,
    #[serde(deserialize_with = "lenient_position")]
    pub position: i64,
    pub updated_at: DateTime<Utc>,
}

/// The whole persisted state: read in full, written in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFile {
    pub version: u32,
    #[serde(default)]
    pub parks: Vec<Park>,
    #[serde(default)]
    pub manufacturers: Vec<Manufacturer>,
    #[serde(default)]
    pub coasters: Vec<Coaster>,
    #[serde(default)]
    pub ranks: Vec<Rank>,
}

impl Default for DataFile {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            parks: Vec::new(),
            manufacturers: Vec::new(),
            coasters: Vec::new(),
            ranks: Vec::new(),
        }
    }
}

impl DataFile {
    pub fn park(&self, id: &str) -> Option<&Park> {
        self.parks.iter().find(|p| p.id == id)
    }

    pub fn manufacturer(&self, id: &str) -> Option<&Manufacturer> {
        self.manufacturers.iter().find(|m| m.id == id)
    }

    pub fn coaster(&self, id: &str) -> Option<&Coaster> {
        self.coasters.iter().find(|c| c.id == id)
    }

    /// Park of a coaster, if the reference resolves
    pub fn park_of(&self, coaster: &Coaster) -> Option<&Park> {
        self.park(&coaster.park_id)
    }

    /// Manufacturer of a coaster, if it has one and the reference resolves
    pub fn manufacturer_of(&self, coaster: &Coaster) -> Option<&Manufacturer> {
        coaster
            .manufacturer_id
            .as_deref()
            .and_then(|id| self.manufacturer(id))
    }

    /// Rank entry for a coaster in a list
    pub fn rank_of(&self, list_id: &str, coaster_id: &str) -> Option<&Rank> {
        self.ranks
            .iter()
            .find(|r| r.list_id == list_id && r.coaster_id == coaster_id)
    }
}

/// Older files sometimes stored positions as strings ("3").
fn lenient_position<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPosition {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match RawPosition::deserialize(deserializer)? {
        RawPosition::Int(n) => Ok(n),
        RawPosition::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        RawPosition::Float(f) => Err(serde::de::Error::custom(format!(
            "position must be a whole number, got {}",
            f
        ))),
        RawPosition::Text(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("position must be a number, got '{}'", s))
        }),
    }
}
