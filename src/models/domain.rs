use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a report
///
/// Serialized with the labels the hosted store uses; the English labels are
/// accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportState {
    #[serde(rename = "PERDIDO", alias = "LOST")]
    Lost,
    #[serde(rename = "ENCONTRADO", alias = "FOUND")]
    Found,
    #[serde(rename = "ARQUIVADO", alias = "ARCHIVED")]
    Archived,
}

impl ReportState {
    /// Label stored in the `estado` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportState::Lost => "PERDIDO",
            ReportState::Found => "ENCONTRADO",
            ReportState::Archived => "ARQUIVADO",
        }
    }

    /// States whose reports are still open and shown to other users
    pub fn open() -> [ReportState; 2] {
        [ReportState::Lost, ReportState::Found]
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ReportState::Archived)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "CACHORRO", alias = "DOG")]
    Dog,
    #[serde(rename = "GATO", alias = "CAT")]
    Cat,
    #[serde(rename = "AVE", alias = "BIRD")]
    Bird,
    #[serde(rename = "ROEDOR", alias = "RODENT")]
    Rodent,
    #[serde(rename = "REPTIL", alias = "REPTILE")]
    Reptile,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "CACHORRO",
            Species::Cat => "GATO",
            Species::Bird => "AVE",
            Species::Rodent => "ROEDOR",
            Species::Reptile => "REPTIL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "PEQUENO", alias = "SMALL")]
    Small,
    #[serde(rename = "MEDIO", alias = "MEDIUM")]
    Medium,
    #[serde(rename = "GRANDE", alias = "LARGE")]
    Large,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "PEQUENO",
            Size::Medium => "MEDIO",
            Size::Large => "GRANDE",
        }
    }
}

/// Error returned when a stored label does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} label: {label}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

impl FromStr for ReportState {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERDIDO" | "LOST" => Ok(ReportState::Lost),
            "ENCONTRADO" | "FOUND" => Ok(ReportState::Found),
            "ARQUIVADO" | "ARCHIVED" => Ok(ReportState::Archived),
            _ => Err(UnknownLabel { kind: "state", label: s.to_string() }),
        }
    }
}

impl FromStr for Species {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CACHORRO" | "DOG" => Ok(Species::Dog),
            "GATO" | "CAT" => Ok(Species::Cat),
            "AVE" | "BIRD" => Ok(Species::Bird),
            "ROEDOR" | "RODENT" => Ok(Species::Rodent),
            "REPTIL" | "REPTILE" => Ok(Species::Reptile),
            _ => Err(UnknownLabel { kind: "species", label: s.to_string() }),
        }
    }
}

impl FromStr for Size {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PEQUENO" | "SMALL" => Ok(Size::Small),
            "MEDIO" | "MEDIUM" => Ok(Size::Medium),
            "GRANDE" | "LARGE" => Ok(Size::Large),
            _ => Err(UnknownLabel { kind: "size", label: s.to_string() }),
        }
    }
}

impl fmt::Display for ReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lost or found pet report
///
/// Field names follow the columns of the `registros` table so the same type
/// deserializes straight from the hosted store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(rename = "usuario_id")]
    pub owner_id: String,
    #[serde(rename = "estado")]
    pub state: ReportState,
    #[serde(rename = "especie")]
    pub species: Species,
    #[serde(rename = "raca", default)]
    pub breed: Option<String>,
    #[serde(rename = "tamanho")]
    pub size: Size,
    #[serde(rename = "cor_pelagem")]
    pub fur_color: String,
    #[serde(rename = "cor_olhos", default)]
    pub eye_color: Option<String>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
    #[serde(rename = "imagem_url", default)]
    pub image_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub last_seen_at: Option<String>,
    #[serde(rename = "arquivado_em", default)]
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Coordinates as a `(latitude, longitude)` pair
    #[inline]
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Fields supplied when a report is first registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    #[serde(rename = "estado")]
    pub state: ReportState,
    #[serde(rename = "especie")]
    pub species: Species,
    #[serde(rename = "raca", default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(rename = "tamanho")]
    pub size: Size,
    #[serde(rename = "cor_pelagem")]
    pub fur_color: String,
    #[serde(rename = "cor_olhos", default, skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<String>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<String>,
}

/// Owner-editable fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    #[serde(rename = "raca", default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(rename = "tamanho", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(rename = "cor_pelagem", default, skip_serializing_if = "Option::is_none")]
    pub fur_color: Option<String>,
    #[serde(rename = "cor_olhos", default, skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<String>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "imagem_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<String>,
}

impl ReportUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ReportUpdate::default()
    }

    /// Apply the set fields onto a report in place
    pub fn apply_to(&self, report: &mut Report) {
        if let Some(breed) = &self.breed {
            report.breed = Some(breed.clone());
        }
        if let Some(size) = self.size {
            report.size = size;
        }
        if let Some(fur_color) = &self.fur_color {
            report.fur_color = fur_color.clone();
        }
        if let Some(eye_color) = &self.eye_color {
            report.eye_color = Some(eye_color.clone());
        }
        if let Some(notes) = &self.notes {
            report.notes = Some(notes.clone());
        }
        if let Some(image_url) = &self.image_url {
            report.image_url = Some(image_url.clone());
        }
        if let Some(last_seen_at) = &self.last_seen_at {
            report.last_seen_at = Some(last_seen_at.clone());
        }
    }
}
