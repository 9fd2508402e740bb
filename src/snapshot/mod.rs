//! Patient snapshot assembly — the aggregation core.
//!
//! Fetches six record tables from the hospital data API concurrently,
//! filters each to one patient, ranks by best-available date, trims to
//! the most recent rows per category, and attaches the two newest
//! reactions to each kept allergy record. Returns everything in a
//! single `Snapshot` payload.

mod dates;
mod shape;
mod source;
mod types;

pub use dates::{resolve_date, MIN_DATE};
pub use shape::{attach_reactions, select_recent};
pub use source::{SourceError, TableClient};
pub use types::*;

/// A snapshot build failure. One failed table fetch fails the whole
/// build; no partial snapshot is ever produced.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to fetch {table}: {source}")]
    Fetch {
        table: &'static str,
        #[source]
        source: SourceError,
    },
}

impl SnapshotError {
    /// The name of the table whose fetch failed.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Fetch { table, .. } => table,
        }
    }
}

/// Builds per-patient snapshots against one remote table source.
pub struct SnapshotBuilder {
    tables: TableClient,
}

impl SnapshotBuilder {
    pub fn new(tables: TableClient) -> Self {
        Self { tables }
    }

    /// Build a fresh snapshot for one patient.
    ///
    /// All six table fetches run concurrently; the first failure
    /// aborts the build. Consent is not checked here — that is the
    /// route layer's responsibility.
    pub async fn build(&self, patient_id: i64) -> Result<Snapshot, SnapshotError> {
        let (history, prescriptions, allergy_records, reactions, lab_tests, diagnosis) =
            tokio::try_join!(
                self.table("medical_history"),
                self.table("prescription"),
                self.table("allergy_records"),
                self.table("allergy_reaction"),
                self.table("lab_tests"),
                self.table("diagnosis"),
            )?;

        let medical_history = select_recent(
            history,
            patient_id,
            MEDICAL_HISTORY_DATE_FIELDS,
            RECORDS_PER_CATEGORY,
        );
        let medications = select_recent(
            prescriptions,
            patient_id,
            PRESCRIPTION_DATE_FIELDS,
            RECORDS_PER_CATEGORY,
        );
        let kept_allergies = select_recent(
            allergy_records,
            patient_id,
            ALLERGY_DATE_FIELDS,
            RECORDS_PER_CATEGORY,
        );
        let labs = select_recent(lab_tests, patient_id, LAB_DATE_FIELDS, RECORDS_PER_CATEGORY);
        let diagnoses = select_recent(
            diagnosis,
            patient_id,
            DIAGNOSIS_DATE_FIELDS,
            RECORDS_PER_CATEGORY,
        );

        let allergies = attach_reactions(kept_allergies, reactions);

        tracing::debug!(
            patient_id,
            history = medical_history.len(),
            medications = medications.len(),
            allergies = allergies.len(),
            labs = labs.len(),
            diagnoses = diagnoses.len(),
            "snapshot assembled"
        );

        Ok(Snapshot {
            patient_id,
            // The upstream API exposes no encounters table, so visits
            // stays empty.
            visits: Vec::new(),
            medical_history,
            medications,
            allergies,
            labs,
            diagnoses,
        })
    }

    async fn table(&self, name: &'static str) -> Result<Vec<Row>, SnapshotError> {
        self.tables.fetch_table(name).await.map_err(|source| {
            tracing::warn!(table = name, error = %source, "table fetch failed");
            SnapshotError::Fetch {
                table: name,
                source,
            }
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
