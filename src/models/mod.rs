// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{NewReport, Report, ReportState, ReportUpdate, Size, Species, UnknownLabel};
pub use requests::{CreateReportRequest, MatchesQuery, NearbyQuery};
pub use responses::{ErrorResponse, HealthResponse, ReportsResponse};
