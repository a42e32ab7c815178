//! Marker rules: literal substrings in the order details that set a
//! clinical field. New document templates add rows, not code.

/// Clinical field a marker rule can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerField {
    SpecialtyRequested,
    ScheduleWithin,
    Urgency,
}

/// What to store once the marker is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerAction {
    /// Store a fixed value.
    Literal(String),
    /// Store the text following the marker, up to the marker's next
    /// occurrence, trimmed.
    TextAfter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRule {
    pub marker: String,
    pub field: MarkerField,
    pub action: MarkerAction,
}

impl MarkerRule {
    pub fn literal(marker: &str, field: MarkerField, value: &str) -> Self {
        Self {
            marker: marker.to_string(),
            field,
            action: MarkerAction::Literal(value.to_string()),
        }
    }

    pub fn text_after(marker: &str, field: MarkerField) -> Self {
        Self {
            marker: marker.to_string(),
            field,
            action: MarkerAction::TextAfter,
        }
    }

    /// Value this rule yields for `text`, if the marker occurs.
    fn apply(&self, text: &str) -> Option<String> {
        let (_, after) = text.split_once(self.marker.as_str())?;
        match &self.action {
            MarkerAction::Literal(value) => Some(value.clone()),
            MarkerAction::TextAfter => {
                let segment = after
                    .split_once(self.marker.as_str())
                    .map_or(after, |(head, _)| head)
                    .trim();
                if segment.is_empty() {
                    None
                } else {
                    Some(segment.to_string())
                }
            }
        }
    }
}

/// Rules for the physical-therapy referral order template.
pub fn default_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::literal(
            "PHYSICAL THERAPIST",
            MarkerField::SpecialtyRequested,
            "PHYSICAL THERAPIST REFERRAL",
        ),
        MarkerRule::text_after("Schedule Within:", MarkerField::ScheduleWithin),
    ]
}

/// Fields populated by marker rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerMatches {
    pub specialty_requested: Option<String>,
    pub schedule_within: Option<String>,
    pub urgency: Option<String>,
}

impl MarkerMatches {
    fn slot(&mut self, field: MarkerField) -> &mut Option<String> {
        match field {
            MarkerField::SpecialtyRequested => &mut self.specialty_requested,
            MarkerField::ScheduleWithin => &mut self.schedule_within,
            MarkerField::Urgency => &mut self.urgency,
        }
    }
}

/// Apply `rules` in order; the first rule to produce a value for a field
/// keeps it.
pub fn apply_marker_rules(text: Option<&str>, rules: &[MarkerRule]) -> MarkerMatches {
    let mut matches = MarkerMatches::default();
    let Some(text) = text else {
        return matches;
    };

    for rule in rules {
        let slot = matches.slot(rule.field);
        if slot.is_some() {
            continue;
        }
        *slot = rule.apply(text);
    }

    matches
}
