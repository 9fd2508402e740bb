use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record row as delivered by the hospital data API. No schema is
/// enforced beyond the fields the builder reads; everything else is
/// passed through to the snapshot untouched.
pub type Row = serde_json::Map<String, Value>;

/// Maximum rows retained per directly-filtered category.
pub const RECORDS_PER_CATEGORY: usize = 3;

/// Maximum reactions attached to a single allergy record.
pub const REACTIONS_PER_ALLERGY: usize = 2;

/// Date fields tried in priority order when ranking a category.
pub const MEDICAL_HISTORY_DATE_FIELDS: &[&str] = &["last_updated", "diagnosis_date"];
pub const PRESCRIPTION_DATE_FIELDS: &[&str] = &["issued_on", "start_date", "end_date"];
pub const ALLERGY_DATE_FIELDS: &[&str] = &["recorded_on"];
pub const LAB_DATE_FIELDS: &[&str] = &["test_date", "uploaded_on"];
pub const DIAGNOSIS_DATE_FIELDS: &[&str] = &["diagnosis_date"];

/// The aggregated, trimmed view of one patient's recent records.
///
/// Built fresh on every request; never cached or mutated after
/// construction. Each list holds at most its trim limit, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub patient_id: i64,
    pub visits: Vec<Row>,
    pub medical_history: Vec<Row>,
    pub medications: Vec<Row>,
    pub allergies: Vec<Row>,
    pub labs: Vec<Row>,
    pub diagnoses: Vec<Row>,
}
