//! Serial number blocks inside item descriptions.
//!
//! Descriptions are host HTML. A serial block looks like:
//!
//! ```text
//! <existing description><br><br><p><strong>S/N:</strong></p><p>SN-001</p><p>SN-002</p>
//! ```
//!
//! The marker check runs on the tag-stripped plain text, so a block typed by
//! hand (`S/N : ...`) also counts as already annotated.

/// Plain-text markers that mean a description already lists serial numbers.
pub const SERIAL_MARKERS: [&str; 2] = ["S/N:", "S/N :"];

const LABEL: &str = "S/N:";

/// HTML escape for a single text value.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn unescape_html(s: &str) -> String {
    // &amp; goes last so "&amp;lt;" decodes to "&lt;", not "<".
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Walk `html`, handing each complete `<...>` tag body to `on_tag` and
/// copying text through. A `<` with no closing `>` is kept as text.
fn walk_tags(html: &str, mut on_tag: impl FnMut(&str, &mut String)) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        out.push_str(&rest[..start]);
        on_tag(&rest[start + 1..start + len], &mut out);
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Remove tags and decode entities.
pub fn strip_html(html: &str) -> String {
    unescape_html(&walk_tags(html, |_, _| {}))
}

/// Like [`strip_html`], but paragraph and line-break tags become newlines.
fn html_to_lines(html: &str) -> String {
    let text = walk_tags(html, |tag, out| {
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if matches!(name.as_str(), "p" | "br" | "div" | "li") {
            out.push('\n');
        }
    });
    unescape_html(&text)
}

/// Whether the description already contains a serial number section.
pub fn has_serial_marker(description: &str) -> bool {
    if description.is_empty() {
        return false;
    }
    let plain = strip_html(description);
    SERIAL_MARKERS.iter().any(|marker| plain.contains(marker))
}

/// Append a serial block to the end of `description`.
///
/// Each serial number is escaped. An empty (or whitespace-only) description
/// becomes just the block; otherwise the block follows two line breaks.
pub fn append_serial_numbers(description: &str, serial_numbers: &[String]) -> String {
    if serial_numbers.is_empty() {
        return description.to_string();
    }

    let lines: String = serial_numbers
        .iter()
        .map(|sn| format!("<p>{}</p>", escape_html(sn)))
        .collect();
    let section = format!("<p><strong>{LABEL}</strong></p>{lines}");

    let description = description.trim();
    if description.is_empty() {
        section
    } else {
        format!("{description}<br><br>{section}")
    }
}

/// Add a serial block unless there is nothing to add or one is already there.
/// Returns the input unchanged in both no-op cases.
pub fn annotate(description: &str, serial_numbers: &[String]) -> String {
    if serial_numbers.is_empty() || has_serial_marker(description) {
        return description.to_string();
    }
    append_serial_numbers(description, serial_numbers)
}

/// Read back the serial numbers listed after the first marker.
///
/// Text on the marker's own line (`S/N: A1`) counts as a value.
pub fn extract_serial_numbers(description: &str) -> Vec<String> {
    let text = html_to_lines(description);
    let mut serials = Vec::new();
    let mut found = false;

    for line in text.lines().map(str::trim) {
        if !found {
            if let Some(rest) = after_marker(line) {
                found = true;
                if !rest.is_empty() {
                    serials.push(rest.to_string());
                }
            }
            continue;
        }
        if !line.is_empty() {
            serials.push(line.to_string());
        }
    }

    serials
}

fn after_marker(line: &str) -> Option<&str> {
    SERIAL_MARKERS
        .iter()
        .find_map(|marker| line.find(marker).map(|pos| line[pos + marker.len()..].trim()))
}

/// Plain-text rendering for logs and non-HTML output.
pub fn format_serial_numbers_for_display(serial_numbers: &[String]) -> String {
    if serial_numbers.is_empty() {
        return String::new();
    }
    format!("{LABEL}\n{}", serial_numbers.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sns(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_marker_detected_on_plain_text() {
        assert!(has_serial_marker("<p>Laptop</p><p><strong>S/N:</strong></p>"));
        assert!(has_serial_marker("Laptop S/N : 123"));
        assert!(has_serial_marker("<b>S/N</b>:"));
        assert!(!has_serial_marker("<p>Laptop</p>"));
        assert!(!has_serial_marker(""));
        // Case-sensitive.
        assert!(!has_serial_marker("s/n: 123"));
        // Spacing other than the two accepted forms does not count.
        assert!(!has_serial_marker("S / N: 123"));
    }

    #[test]
    fn test_strip_html_keeps_unclosed_angle() {
        assert_eq!(strip_html("<p>a &amp; b</p>"), "a & b");
        assert_eq!(strip_html("size < 5"), "size < 5");
        assert_eq!(strip_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_append_to_empty_description() {
        let out = append_serial_numbers("   ", &sns(&["SN-001", "SN-002"]));
        assert_eq!(out, "<p><strong>S/N:</strong></p><p>SN-001</p><p>SN-002</p>");
    }

    #[test]
    fn test_append_after_existing_text() {
        let out = append_serial_numbers(" <p>Laptop Computer</p> ", &sns(&["SN-001"]));
        assert_eq!(
            out,
            "<p>Laptop Computer</p><br><br><p><strong>S/N:</strong></p><p>SN-001</p>"
        );
    }

    #[test]
    fn test_append_escapes_values() {
        let out = append_serial_numbers("", &sns(&["<script>x</script>", "A&B"]));
        assert!(out.contains("<p>&lt;script&gt;x&lt;/script&gt;</p>"));
        assert!(out.contains("<p>A&amp;B</p>"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let serials = sns(&["SN-001", "SN-002"]);
        let once = annotate("<p>Laptop</p>", &serials);
        let twice = annotate(&once, &serials);
        assert_eq!(once, twice);
        assert_ne!(once, "<p>Laptop</p>");
    }

    #[test]
    fn test_annotate_noop_when_marker_present() {
        let desc = "<p>Laptop</p><p>S/N : 123</p>";
        assert_eq!(annotate(desc, &sns(&["SN-001"])), desc);
    }

    #[test]
    fn test_annotate_noop_when_no_serials() {
        assert_eq!(annotate("<p>Laptop</p>", &[]), "<p>Laptop</p>");
    }

    #[test]
    fn test_extract_reads_back_annotated_values() {
        let serials = sns(&["SN-001", "A<B>&\"C'", "&lt;"]);
        let out = annotate("<div>Laptop<br>16GB</div>", &serials);
        let extracted = extract_serial_numbers(&out);
        for sn in &serials {
            assert!(extracted.contains(sn), "missing {sn} in {extracted:?}");
        }
        assert!(!extracted.iter().any(|s| s.contains("Laptop")));
    }

    #[test]
    fn test_extract_handles_hand_typed_marker() {
        let extracted = extract_serial_numbers("<p>Laptop</p><p>S/N : X1</p><p>X2</p>");
        assert_eq!(extracted, vec!["X1", "X2"]);
        assert!(extract_serial_numbers("<p>Laptop</p>").is_empty());
    }

    #[test]
    fn test_display_format() {
        assert_eq!(
            format_serial_numbers_for_display(&sns(&["SN-001", "SN-002"])),
            "S/N:\nSN-001\nSN-002"
        );
        assert_eq!(format_serial_numbers_for_display(&[]), "");
    }
}
