//! Supporting documents attached to a claim
//!
//! Blobs go to the document store; the claim only keeps the URIs the store
//! hands back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::UserId;
use crate::error::ClaimError;

/// Kind of supporting document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdProof,
    HospitalBill,
    DischargeSummary,
    Prescription,
    DiagnosticReport,
    PharmacyBill,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::IdProof,
        DocumentKind::HospitalBill,
        DocumentKind::DischargeSummary,
        DocumentKind::Prescription,
        DocumentKind::DiagnosticReport,
        DocumentKind::PharmacyBill,
    ];

    /// Name of the upload field carrying this kind
    pub fn field_name(&self) -> &'static str {
        match self {
            DocumentKind::IdProof => "id_proof",
            DocumentKind::HospitalBill => "hospital_bill",
            DocumentKind::DischargeSummary => "discharge_summary",
            DocumentKind::Prescription => "prescription",
            DocumentKind::DiagnosticReport => "diagnostic_report",
            DocumentKind::PharmacyBill => "pharmacy_bill",
        }
    }

    /// Prefix used in storage paths
    pub fn path_slug(&self) -> &'static str {
        match self {
            DocumentKind::IdProof => "id-proof",
            DocumentKind::HospitalBill => "hospital-bill",
            DocumentKind::DischargeSummary => "discharge-summary",
            DocumentKind::Prescription => "prescription",
            DocumentKind::DiagnosticReport => "diagnostic-report",
            DocumentKind::PharmacyBill => "pharmacy-bill",
        }
    }

    /// Diagnostic reports and pharmacy bills may be attached more than once
    pub fn is_repeatable(&self) -> bool {
        matches!(self, DocumentKind::DiagnosticReport | DocumentKind::PharmacyBill)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .into_iter()
            .find(|kind| kind.field_name() == s)
            .ok_or_else(|| format!("unknown document kind '{}'", s))
    }
}

/// A document as uploaded by the filer, before it reaches the store
#[derive(Clone)]
pub struct DocumentUpload {
    pub kind: DocumentKind,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for DocumentUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentUpload")
            .field("kind", &self.kind)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl DocumentUpload {
    pub fn new(kind: DocumentKind, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Storage path: `<holder>/<kind>-<millis>-<file name>`
    pub fn storage_path(&self, holder: UserId, at: DateTime<Utc>) -> String {
        format!(
            "{}/{}-{}-{}",
            holder.as_uuid(),
            self.kind.path_slug(),
            at.timestamp_millis(),
            sanitize_file_name(&self.file_name)
        )
    }
}

/// Holder a stored document belongs to, read back from the first segment
/// of its storage path
pub fn document_owner(path: &str) -> Option<UserId> {
    let first = path.trim_start_matches('/').split('/').next()?;
    Uuid::parse_str(first).ok().map(UserId::from_uuid)
}

/// Keeps the last path component and replaces anything outside
/// `[A-Za-z0-9._-]` so a file name can never escape its directory
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Rejects a second upload for any single-valued kind
pub fn check_uploads(uploads: &[DocumentUpload]) -> Result<(), ClaimError> {
    for kind in DocumentKind::ALL.into_iter().filter(|k| !k.is_repeatable()) {
        if uploads.iter().filter(|u| u.kind == kind).count() > 1 {
            return Err(ClaimError::validation(
                kind.field_name(),
                "Only one document of this kind may be attached",
            ));
        }
    }
    Ok(())
}

/// URIs of the documents attached to a claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingDocuments {
    pub id_proof: Option<String>,
    pub hospital_bill: Option<String>,
    pub discharge_summary: Option<String>,
    pub prescription: Option<String>,
    #[serde(default)]
    pub diagnostic_reports: Vec<String>,
    #[serde(default)]
    pub pharmacy_bills: Vec<String>,
}

impl SupportingDocuments {
    /// Records the URI for `kind`; single-valued kinds accept one URI only
    pub fn attach(&mut self, kind: DocumentKind, uri: String) -> Result<(), ClaimError> {
        let slot = match kind {
            DocumentKind::IdProof => &mut self.id_proof,
            DocumentKind::HospitalBill => &mut self.hospital_bill,
            DocumentKind::DischargeSummary => &mut self.discharge_summary,
            DocumentKind::Prescription => &mut self.prescription,
            DocumentKind::DiagnosticReport => {
                self.diagnostic_reports.push(uri);
                return Ok(());
            }
            DocumentKind::PharmacyBill => {
                self.pharmacy_bills.push(uri);
                return Ok(());
            }
        };
        if slot.is_some() {
            return Err(ClaimError::validation(
                kind.field_name(),
                "Only one document of this kind may be attached",
            ));
        }
        *slot = Some(uri);
        Ok(())
    }

    pub fn uris(&self, kind: DocumentKind) -> Vec<&str> {
        match kind {
            DocumentKind::IdProof => self.id_proof.as_deref().into_iter().collect(),
            DocumentKind::HospitalBill => self.hospital_bill.as_deref().into_iter().collect(),
            DocumentKind::DischargeSummary => self.discharge_summary.as_deref().into_iter().collect(),
            DocumentKind::Prescription => self.prescription.as_deref().into_iter().collect(),
            DocumentKind::DiagnosticReport => self.diagnostic_reports.iter().map(String::as_str).collect(),
            DocumentKind::PharmacyBill => self.pharmacy_bills.iter().map(String::as_str).collect(),
        }
    }

    pub fn count(&self, kind: DocumentKind) -> usize {
        self.uris(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        DocumentKind::ALL.iter().all(|kind| self.count(*kind) == 0)
    }
}
