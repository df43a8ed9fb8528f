pub const DEFAULT_DOWNLOAD_PREFIX: &str = "ottawa-leads";

/// Filesystem-safe download name: `{prefix}-{run_id}.csv`.
pub fn download_filename(prefix: &str, run_id: &str) -> String {
    let prefix = sanitize(prefix);
    let prefix = if prefix.is_empty() {
        DEFAULT_DOWNLOAD_PREFIX.to_string()
    } else {
        prefix
    };
    format!("{prefix}-{}.csv", sanitize(run_id))
}

fn sanitize(input: &str) -> String {
    let cleaned: String = input
        .trim()
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned.trim_matches(&['_', ' ', '.'][..]).to_string()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}
