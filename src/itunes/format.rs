//! Value formatting for the iTunes library XML.

use chrono::{NaiveDateTime, TimeDelta};
use quick_xml::escape::escape;
use std::borrow::Cow;

/// Fixed offset applied to local timestamps before they are written as UTC.
const UTC_OFFSET_HOURS: i64 = 9;

/// Escape text for use inside an XML element (`&`, `<`, `>`, `"` and `'`).
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    escape(s)
}

/// Render a local timestamp as a plist `<date>` value.
///
/// The offset is a constant, not the machine's time zone, and sub-second
/// precision is dropped.
pub fn to_utc_string(dt: NaiveDateTime) -> String {
    let shifted = dt
        .checked_sub_signed(TimeDelta::hours(UTC_OFFSET_HOURS))
        .unwrap_or(dt);
    shifted.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Convert a file path into an iTunes `Location` URL.
///
/// Windows paths are split on `\`; the drive segment is kept verbatim and
/// every other segment is percent-encoded (space becomes `%20`). Paths without
/// a backslash are treated as POSIX paths: split on `/`, the empty root
/// segment dropped and every segment encoded.
pub fn path_to_location(path: &str) -> String {
    let posix = !path.contains('\\');
    let mut segments = path.split(if posix { '/' } else { '\\' });

    let mut parts: Vec<Cow<'_, str>> = Vec::new();
    match segments.next() {
        // Drive letters ("C:") cannot be URL-encoded
        Some(drive) if !posix => parts.push(Cow::Borrowed(drive)),
        Some("") | None => {}
        Some(first) => parts.push(urlencoding::encode(first)),
    }
    parts.extend(segments.map(urlencoding::encode));

    format!("file://localhost/{}", parts.join("/"))
}
