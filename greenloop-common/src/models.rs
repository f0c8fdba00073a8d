//! Domain models shared across the GreenLoop crates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A registered user, looked up by email.
///
/// Created on first sight of an email with a placeholder display name;
/// never updated by the reporting flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted waste report. Created exactly once per accepted
/// submission and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub location: String,
    pub waste_type: String,
    pub amount: String,
    /// Data-URL preview of the uploaded image, when one was attached
    pub image_url: Option<String>,
    /// Serialized `VerificationResult` JSON, when verification ran
    pub verification: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Reward points granted to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: i64,
    pub user_id: i64,
    pub points: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// A waste collection task. The `amount` field encodes a leading
/// number plus unit ("2.5 kg") which the impact aggregation parses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionTask {
    pub id: i64,
    pub location: String,
    pub waste_type: String,
    pub amount: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// The fixed set of waste categories the classifier may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteType {
    Plastic,
    Paper,
    Glass,
    Metal,
    Organic,
}

impl WasteType {
    pub const ALL: [WasteType; 5] = [
        WasteType::Plastic,
        WasteType::Paper,
        WasteType::Glass,
        WasteType::Metal,
        WasteType::Organic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteType::Plastic => "plastic",
            WasteType::Paper => "paper",
            WasteType::Glass => "glass",
            WasteType::Metal => "metal",
            WasteType::Organic => "organic",
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WasteType {
    type Err = Error;

    /// Case-insensitive parse; the classifier is told to reply in
    /// lowercase but is not always obedient.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plastic" => Ok(WasteType::Plastic),
            "paper" => Ok(WasteType::Paper),
            "glass" => Ok(WasteType::Glass),
            "metal" => Ok(WasteType::Metal),
            "organic" => Ok(WasteType::Organic),
            other => Err(Error::InvalidInput(format!(
                "unknown waste type: {}",
                other
            ))),
        }
    }
}

/// Validated output of one classification call.
///
/// Serialized with the wire field names the classification prompt
/// demands (`wasteType`, `quantity`, `confidence`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub waste_type: WasteType,
    /// Numeric value plus unit, e.g. "2.5 kg"
    pub quantity: String,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}
