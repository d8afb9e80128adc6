pub fn query_param(search: &str, key: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.to_string())
}

pub fn debug_enabled(search: &str) -> bool {
    matches!(
        query_param(search, "debug").as_deref(),
        Some("1") | Some("true")
    )
}

/// Raw, still percent-encoded `api` value, if one was given.
pub fn api_override(search: &str) -> Option<String> {
    query_param(search, "api").filter(|value| !value.is_empty())
}
