/// Split a full name into `(first, last)`.
///
/// "LAST, FIRST" splits on the first comma. Otherwise the first whitespace
/// token is the first name and the remainder the last name; a single token
/// is treated as a last name.
pub fn split_name(full_name: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(full_name) = full_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return (None, None);
    };

    if let Some((last, first)) = full_name.split_once(',') {
        return (non_empty(first.trim()), non_empty(last.trim()));
    }

    let mut tokens = full_name.split_whitespace();
    let first = tokens.next().map(str::to_string);
    let rest: Vec<&str> = tokens.collect();

    if rest.is_empty() {
        (None, first)
    } else {
        (first, Some(rest.join(" ")))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
