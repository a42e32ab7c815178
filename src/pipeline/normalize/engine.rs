use super::codes::{extract_codes, extract_descriptions};
use super::dates::parse_date;
use super::names::split_name;
use super::raw::{RawInsurance, RawPatient, RawProvider, RawReferralDocument};
use super::rules::{apply_marker_rules, default_rules, MarkerRule};
use super::types::{
    ClinicalInfo, ExtractedReferralData, InsuranceInfo, PatientInfo, ReferringProviderInfo,
    TargetInfo, REFERRAL_ORDER,
};

/// Maps a raw processor document onto the canonical referral record.
///
/// Total: every heuristic degrades to an absent field, nothing here fails.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<MarkerRule>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Replace the marker rule table (specialty / schedule / urgency).
    pub fn with_rules(rules: Vec<MarkerRule>) -> Self {
        Self { rules }
    }

    pub fn normalize(&self, doc: &RawReferralDocument) -> ExtractedReferralData {
        ExtractedReferralData {
            referring_provider: referring_provider(doc.originating_provider.as_ref()),
            patient: patient(doc.patient.as_ref()),
            insurance: insurance(
                doc.primary_insurance.as_ref(),
                doc.secondary_insurance.as_ref(),
            ),
            clinical: self.clinical(doc),
            target: target(doc.referred_provider.as_ref()),
            referral_date: parse_date(doc.referral_date.as_deref()),
            document_type: REFERRAL_ORDER.to_string(),
            signed_by: resolve_signed_by(
                doc.originating_provider.as_ref(),
                doc.electronically_signed_by.as_deref(),
            ),
            confidence_score: doc.confidence_score,
            raw_text: doc.raw_text.clone(),
        }
    }

    fn clinical(&self, doc: &RawReferralDocument) -> ClinicalInfo {
        let diagnosis = doc.diagnosis.as_deref();
        let order_details = doc.order_details.as_deref();
        let markers = apply_marker_rules(order_details, &self.rules);

        ClinicalInfo {
            diagnosis_codes: extract_codes(diagnosis).into_iter().collect(),
            diagnosis_descriptions: extract_descriptions(diagnosis),
            reason_for_referral: doc.diagnosis.clone(),
            clinical_notes: compose_notes(doc.notes.as_deref(), order_details),
            specialty_requested: markers.specialty_requested,
            urgency: markers.urgency,
            orders_count: doc.order_name.clone(),
            schedule_within: markers.schedule_within,
        }
    }
}

/// Normalize with the default marker rules.
pub fn normalize(doc: &RawReferralDocument) -> ExtractedReferralData {
    Normalizer::new().normalize(doc)
}

/// Notes first, then order details, separated by a blank line.
pub fn compose_notes(notes: Option<&str>, order_details: Option<&str>) -> Option<String> {
    match (notes, order_details) {
        (Some(n), Some(d)) => Some(format!("{n}\n\n{d}")),
        (Some(n), None) => Some(n.to_string()),
        (None, Some(d)) => Some(d.to_string()),
        (None, None) => None,
    }
}

/// Provider-level signature wins over the document-level one.
pub fn resolve_signed_by(
    provider: Option<&RawProvider>,
    document_level: Option<&str>,
) -> Option<String> {
    provider
        .and_then(|p| p.electronically_signed_by.clone())
        .or_else(|| document_level.map(str::to_string))
}

fn patient(raw: Option<&RawPatient>) -> PatientInfo {
    let Some(raw) = raw else {
        return PatientInfo::default();
    };
    let (first_name, last_name) = split_name(raw.name.as_deref());

    PatientInfo {
        first_name,
        last_name,
        full_name: raw.name.clone(),
        date_of_birth: parse_date(raw.date_of_birth.as_deref()),
        age: raw.age.clone(),
        sex: raw.sex.clone(),
        // The order form carries one phone number for both.
        phone_home: raw.phone.clone(),
        phone_mobile: raw.phone.clone(),
        address: raw.address.clone(),
        patient_id: raw.id.clone(),
        medical_record_number: raw.id.clone(),
        ..Default::default()
    }
}

fn referring_provider(raw: Option<&RawProvider>) -> ReferringProviderInfo {
    let Some(raw) = raw else {
        return ReferringProviderInfo::default();
    };
    ReferringProviderInfo {
        name: raw.name.clone(),
        institution_name: raw.facility_name.clone(),
        phone: raw.phone.clone(),
        fax: raw.fax.clone(),
        address: raw.address.clone(),
        ..Default::default()
    }
}

fn insurance(primary: Option<&RawInsurance>, secondary: Option<&RawInsurance>) -> InsuranceInfo {
    let primary = primary.cloned().unwrap_or_default();
    let secondary = secondary.cloned().unwrap_or_default();

    InsuranceInfo {
        primary_insurance_provider: primary.plan_name,
        primary_policy_number: primary.id,
        primary_group_number: primary.group_number,
        primary_subscriber_name: primary.policy_holder,
        secondary_insurance_provider: secondary.plan_name,
        secondary_policy_number: secondary.id,
        secondary_group_number: secondary.group_number,
        secondary_subscriber_name: secondary.policy_holder,
    }
}

fn target(raw: Option<&RawProvider>) -> TargetInfo {
    let Some(raw) = raw else {
        return TargetInfo::default();
    };
    TargetInfo {
        provider_name: raw.name.clone(),
        institution_name: raw.facility_name.clone(),
        // No specialty entity on the order form; the referred provider name
        // is the closest signal.
        specialty: raw.name.clone(),
        phone: raw.phone.clone(),
        fax: raw.fax.clone(),
        npi: None,
    }
}
