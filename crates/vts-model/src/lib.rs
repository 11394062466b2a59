pub mod conformance;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod report;
pub mod trial;
pub mod variety;

pub use conformance::{IssueSeverity, ValidationReport, ValueIssue};
pub use error::{ModelError, Result};
pub use ids::{CultureId, IndicatorKey, ParticipantId, SiteId, TrialId, VarietyId};
pub use numeric::parse_decimal;
pub use report::{
    ReportFilter, ReportGroup, ReportRegion, ReportRow, ReportSite, ReportTree, YearIndicators,
};
pub use trial::{Participant, ResultRecord, Trial, TrialDraft, ValuesMap};
pub use variety::{OutcomeRow, RegionOutcomes, VarietyMetadata, VarietyStatus, YearOutcome};
