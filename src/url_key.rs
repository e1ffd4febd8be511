/// A query-string classification rule: every marker must be present.
struct QueryRule {
    markers: &'static [&'static str],
    suffix: &'static str,
}

// Evaluated in order, first match wins.
const QUERY_RULES: &[QueryRule] = &[
    QueryRule {
        markers: &["onlyscheduled=true"],
        suffix: "_scheduled",
    },
    QueryRule {
        markers: &["onlypastvisits=true"],
        suffix: "_vistList",
    },
    QueryRule {
        markers: &["onlyscheduled=false", "onlypastvisits=false"],
        suffix: "_visithistory",
    },
];

fn classify_query(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();
    QUERY_RULES
        .iter()
        .find(|rule| rule.markers.iter().all(|marker| query.contains(marker)))
        .map(|rule| rule.suffix)
}

/// Builds the grouping key shared by the URL, high-cost and byte accumulators.
pub fn derive_url_key(stem: &str, query: &str) -> String {
    let mut key = stem.to_lowercase();
    if let Some(suffix) = classify_query(query) {
        key.push_str(suffix);
    }
    key
}
