//! HTML text helpers

/// Escape text for element content and quoted attribute values
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Percent-encode a query parameter value
#[must_use]
pub fn encode_query(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// ` disabled` when `flag` is set
pub(crate) fn disabled(flag: bool) -> &'static str {
    if flag {
        " disabled"
    } else {
        ""
    }
}
