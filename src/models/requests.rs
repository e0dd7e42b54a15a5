use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{NewReport, ReportState, Size, Species};

/// Query for reports around a point
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_nearby_radius"))]
pub struct NearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
}

/// Query for a user's probable matches
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_matches_radius"))]
pub struct MatchesQuery {
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
}

/// Request to register a new lost or found report
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_new_report"))]
pub struct CreateReportRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "usuario_id", rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "estado")]
    pub state: ReportState,
    #[serde(rename = "especie")]
    pub species: Species,
    #[serde(rename = "raca", default)]
    pub breed: Option<String>,
    #[serde(rename = "tamanho")]
    pub size: Size,
    #[validate(length(min = 1))]
    #[serde(rename = "cor_pelagem")]
    pub fur_color: String,
    #[serde(rename = "cor_olhos", default)]
    pub eye_color: Option<String>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
    #[serde(rename = "imagem_url", default)]
    pub image_url: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub last_seen_at: Option<String>,
}

impl CreateReportRequest {
    /// Split into the owner id and the fields handed to the store
    pub fn into_parts(self) -> (String, NewReport) {
        let report = NewReport {
            state: self.state,
            species: self.species,
            breed: self.breed,
            size: self.size,
            fur_color: self.fur_color,
            eye_color: self.eye_color,
            notes: self.notes,
            image_url: self.image_url,
            latitude: self.latitude,
            longitude: self.longitude,
            last_seen_at: self.last_seen_at,
        };
        (self.owner_id, report)
    }

    pub fn from_parts(owner_id: impl Into<String>, report: NewReport) -> Self {
        Self {
            owner_id: owner_id.into(),
            state: report.state,
            species: report.species,
            breed: report.breed,
            size: report.size,
            fur_color: report.fur_color,
            eye_color: report.eye_color,
            notes: report.notes,
            image_url: report.image_url,
            latitude: report.latitude,
            longitude: report.longitude,
            last_seen_at: report.last_seen_at,
        }
    }
}

fn validate_radius(radius_km: Option<f64>) -> Result<(), ValidationError> {
    match radius_km {
        Some(r) if !r.is_finite() || r < 0.0 => Err(ValidationError::new("radius_out_of_range")),
        _ => Ok(()),
    }
}

fn validate_nearby_radius(query: &NearbyQuery) -> Result<(), ValidationError> {
    validate_radius(query.radius_km)
}

fn validate_matches_radius(query: &MatchesQuery) -> Result<(), ValidationError> {
    validate_radius(query.radius_km)
}

fn validate_new_report(request: &CreateReportRequest) -> Result<(), ValidationError> {
    if !request.state.is_open() {
        return Err(ValidationError::new("initial_state_must_be_lost_or_found"));
    }

    // (0, 0) means the device location was never acquired
    if request.latitude == 0.0 && request.longitude == 0.0 {
        return Err(ValidationError::new("location_not_acquired"));
    }

    if !request.latitude.is_finite() || !request.longitude.is_finite() {
        return Err(ValidationError::new("location_not_finite"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(lat: f64, lon: f64) -> CreateReportRequest {
        CreateReportRequest {
            owner_id: "owner".to_string(),
            state: ReportState::Lost,
            species: Species::Cat,
            breed: None,
            size: Size::Small,
            fur_color: "Cinza".to_string(),
            eye_color: Some("Azul".to_string()),
            notes: None,
            image_url: None,
            latitude: lat,
            longitude: lon,
            last_seen_at: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(create_request(-23.55, -46.60).validate().is_ok());
    }

    #[test]
    fn test_unacquired_location_rejected() {
        assert!(create_request(0.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        assert!(create_request(91.0, -46.60).validate().is_err());
    }

    #[test]
    fn test_archived_initial_state_rejected() {
        let mut request = create_request(-23.55, -46.60);
        request.state = ReportState::Archived;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_fur_color_rejected() {
        let mut request = create_request(-23.55, -46.60);
        request.fur_color.clear();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let query = MatchesQuery { radius_km: Some(-1.0) };
        assert!(query.validate().is_err());

        let query = MatchesQuery { radius_km: None };
        assert!(query.validate().is_ok());
    }
}
