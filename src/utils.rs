/// Convert a URL to a sanitized filename stem
pub fn sanitize_filename(url: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = url.replace("http://", "").replace("https://", "");
    name = name.trim_end_matches('/').to_string();
    name = name.replace(['/', ':', '?', '&', '=', '#', '%', '.'], "_");

    // Limit filename length
    match name.char_indices().nth(100) {
        Some((end, _)) => name[..end].to_string(),
        None => name,
    }
}

/// File name for one report table of an audit
pub fn report_file_name(input_url: &str, table: &str) -> String {
    format!("{}_{}.json", sanitize_filename(input_url), table)
}
