use chrono::NaiveDate;

/// Formats tried in priority order; the first successful parse wins.
///
/// Both `%m/%d/%Y` and `%d/%m/%Y` are listed, so a slash date whose day and
/// month are both <= 12 is always read month-first. The list order is the
/// only disambiguation.
pub const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%d/%m/%Y", "%m-%d-%Y", "%Y/%m/%d"];

/// Parse a referral date string.
pub fn parse_date(date_str: Option<&str>) -> Option<NaiveDate> {
    let trimmed = date_str?.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}
