use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Value of `document_type` on every record this pipeline produces.
pub const REFERRAL_ORDER: &str = "referral_order";

/// Referring provider information from the referral order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferringProviderInfo {
    pub name: Option<String>,
    pub institution_name: Option<String>,
    pub npi: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// Patient demographics from the referral order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub phone_home: Option<String>,
    pub phone_mobile: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub patient_id: Option<String>,
    pub medical_record_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsuranceInfo {
    pub primary_insurance_provider: Option<String>,
    pub primary_policy_number: Option<String>,
    pub primary_group_number: Option<String>,
    pub primary_subscriber_name: Option<String>,

    pub secondary_insurance_provider: Option<String>,
    pub secondary_policy_number: Option<String>,
    pub secondary_group_number: Option<String>,
    pub secondary_subscriber_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInfo {
    /// Sorted, de-duplicated ICD-10-like codes.
    pub diagnosis_codes: Vec<String>,
    pub diagnosis_descriptions: Vec<String>,
    pub reason_for_referral: Option<String>,
    pub clinical_notes: Option<String>,
    pub specialty_requested: Option<String>,
    pub urgency: Option<String>,
    pub orders_count: Option<String>,
    pub schedule_within: Option<String>,
}

/// Provider or institution the patient is being referred to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub provider_name: Option<String>,
    pub institution_name: Option<String>,
    pub specialty: Option<String>,
    pub npi: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
}

/// Canonical record for one processed referral document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReferralData {
    pub referring_provider: ReferringProviderInfo,
    pub patient: PatientInfo,
    pub insurance: InsuranceInfo,
    pub clinical: ClinicalInfo,
    pub target: TargetInfo,

    pub referral_date: Option<NaiveDate>,
    pub document_type: String,
    pub signed_by: Option<String>,
    /// Mean of positive entity confidences, 0.0–1.0.
    pub confidence_score: Option<f32>,
    pub raw_text: Option<String>,
}

impl Default for ExtractedReferralData {
    fn default() -> Self {
        Self {
            referring_provider: ReferringProviderInfo::default(),
            patient: PatientInfo::default(),
            insurance: InsuranceInfo::default(),
            clinical: ClinicalInfo::default(),
            target: TargetInfo::default(),
            referral_date: None,
            document_type: REFERRAL_ORDER.to_string(),
            signed_by: None,
            confidence_score: None,
            raw_text: None,
        }
    }
}

impl ExtractedReferralData {
    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
