//! HTTP date handling for `Last-Modified` and `If-Modified-Since`.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format used by RFC 9110 `IMF-fixdate`, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Parse a `Last-Modified` header value. Unparseable dates yield `None`.
pub fn parse(value: &str) -> Option<SystemTime> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| SystemTime::from(dt.with_timezone(&Utc)))
}

/// Render a timestamp as an `If-Modified-Since` value (second precision).
pub fn format(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}
