use regex::Regex;

/// First full match of `re` in `text`, or an empty string.
pub fn extract_pattern(re: &Regex, text: &str) -> String {
    re.find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Drop every `:` and trim. Labels scraped as "RELATOR :" or ": NAME" end up bare.
pub fn clean_text(value: &str) -> String {
    value.replace(':', "").trim().to_string()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_space(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
