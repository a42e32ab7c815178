//! Lenient typed view over the intermediate entity tree.
//!
//! Every field is optional. A node with the wrong shape is dropped rather
//! than rejected, so vocabulary drift in the extraction processor degrades
//! to absent fields instead of failed requests.

use super::tree::{EntityMap, EntityNode, CONFIDENCE_KEY, RAW_TEXT_KEY};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPatient {
    pub name: Option<String>,
    pub id: Option<String>,
    pub date_of_birth: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProvider {
    pub name: Option<String>,
    pub facility_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub electronically_signed_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInsurance {
    pub plan_name: Option<String>,
    /// Policy number
    pub id: Option<String>,
    pub group_number: Option<String>,
    pub policy_holder: Option<String>,
}

/// Top-level processor output for a referral order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReferralDocument {
    pub patient: Option<RawPatient>,
    pub originating_provider: Option<RawProvider>,
    pub referred_provider: Option<RawProvider>,
    pub primary_insurance: Option<RawInsurance>,
    pub secondary_insurance: Option<RawInsurance>,

    pub diagnosis: Option<String>,
    pub order_details: Option<String>,
    pub order_name: Option<String>,
    pub notes: Option<String>,
    pub referral_date: Option<String>,
    pub electronically_signed_by: Option<String>,

    pub raw_text: Option<String>,
    pub confidence_score: Option<f32>,
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

fn non_blank(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Text field. A repeated entity contributes its first text occurrence.
fn text_field(map: &EntityMap, key: &str) -> Option<String> {
    match map.get(key)? {
        EntityNode::Text(s) => non_blank(s),
        EntityNode::List(items) => items.iter().find_map(EntityNode::as_text).and_then(non_blank),
        EntityNode::Number(_) | EntityNode::Map(_) => None,
    }
}

/// Nested group. A repeated group contributes its first map occurrence.
fn group_field<'a>(map: &'a EntityMap, key: &str) -> Option<&'a EntityMap> {
    match map.get(key)? {
        EntityNode::Map(m) => Some(m),
        EntityNode::List(items) => items.iter().find_map(EntityNode::as_map),
        EntityNode::Text(_) | EntityNode::Number(_) => None,
    }
}

fn score_field(map: &EntityMap, key: &str) -> Option<f32> {
    let score = match map.get(key)? {
        EntityNode::Number(n) => Some(*n),
        EntityNode::Text(s) => s.trim().parse::<f32>().ok(),
        EntityNode::Map(_) | EntityNode::List(_) => None,
    };
    score.filter(|n| n.is_finite())
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl RawPatient {
    pub fn from_map(map: &EntityMap) -> Self {
        Self {
            name: text_field(map, "name"),
            id: text_field(map, "id"),
            date_of_birth: text_field(map, "date_of_birth"),
            age: text_field(map, "age"),
            sex: text_field(map, "sex"),
            address: text_field(map, "address"),
            phone: text_field(map, "phone"),
        }
    }
}

impl RawProvider {
    pub fn from_map(map: &EntityMap) -> Self {
        Self {
            name: text_field(map, "name"),
            facility_name: text_field(map, "facility_name"),
            address: text_field(map, "address"),
            phone: text_field(map, "phone"),
            fax: text_field(map, "fax"),
            electronically_signed_by: text_field(map, "electronically_signed_by"),
        }
    }
}

impl RawInsurance {
    pub fn from_map(map: &EntityMap) -> Self {
        Self {
            plan_name: text_field(map, "plan_name"),
            id: text_field(map, "id"),
            group_number: text_field(map, "group_number"),
            policy_holder: text_field(map, "policy_holder"),
        }
    }
}

impl RawReferralDocument {
    /// Never fails: unknown keys are ignored, mistyped ones become `None`.
    pub fn from_tree(tree: &EntityMap) -> Self {
        let doc = Self {
            patient: group_field(tree, "patient").map(RawPatient::from_map),
            originating_provider: group_field(tree, "originating_provider")
                .map(RawProvider::from_map),
            referred_provider: group_field(tree, "referred_provider").map(RawProvider::from_map),
            primary_insurance: group_field(tree, "primary_insurance").map(RawInsurance::from_map),
            secondary_insurance: group_field(tree, "secondary_insurance")
                .map(RawInsurance::from_map),

            diagnosis: text_field(tree, "diagnosis"),
            order_details: text_field(tree, "order_details"),
            order_name: text_field(tree, "order_name"),
            notes: text_field(tree, "notes"),
            referral_date: text_field(tree, "referral_date"),
            electronically_signed_by: text_field(tree, "electronically_signed_by"),

            raw_text: text_field(tree, RAW_TEXT_KEY),
            confidence_score: score_field(tree, CONFIDENCE_KEY),
        };

        if tree.get(CONFIDENCE_KEY).is_some() && doc.confidence_score.is_none() {
            tracing::warn!("Ignoring non-numeric confidence_score in entity tree");
        }

        doc
    }
}
