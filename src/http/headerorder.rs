//! Response header ordering.
//!
//! Every header name falls into exactly one [`HeaderClass`]. Print order is
//! `Server` first, then end-to-end headers, then hop-by-hop headers
//! (RFC 2616 §13.5.1); names inside a class compare ordinally.
//!
//! Ordering decides print sequence only. Duplicate values are never merged or
//! dropped here.

use http::HeaderMap;
use std::cmp::Ordering;

/// Hop-by-hop headers, RFC 2616 §13.5.1.
pub const HOP_BY_HOP: [&str; 8] = [
    "Connection",
    "Keep-Alive",
    "Proxy-Authenticate",
    "Proxy-Authorization",
    "TE",
    "Trailers",
    "Transfer-Encoding",
    "Upgrade",
];

/// Ordering class of a header name. Variant order is print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderClass {
    Server,
    EndToEnd,
    ConnectionScoped,
}

/// Classify a header name. Depends on the name only, case-insensitively.
pub fn classify(name: &str) -> HeaderClass {
    if name.eq_ignore_ascii_case("Server") {
        HeaderClass::Server
    } else if HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name)) {
        HeaderClass::ConnectionScoped
    } else {
        HeaderClass::EndToEnd
    }
}

/// Three-way comparison implementing print order.
pub fn compare(a: &str, b: &str) -> Ordering {
    classify(a).cmp(&classify(b)).then_with(|| a.cmp(b))
}

/// Sort names in place into print order (stable).
pub fn sort_names<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
}

/// Canonical MIME form: first letter and every letter after `-` upper-cased,
/// the rest lower-cased (`content-type` → `Content-Type`).
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// A header name with every value it carried, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub name: String,
    pub values: Vec<String>,
}

impl HeaderLine {
    /// Values joined with `,` in arrival order.
    pub fn joined(&self) -> String {
        self.values.join(",")
    }
}

/// Group a header map by name and return the groups in print order.
pub fn sorted_lines(headers: &HeaderMap) -> Vec<HeaderLine> {
    let mut lines: Vec<HeaderLine> = headers
        .keys()
        .map(|name| HeaderLine {
            name: canonical_name(name.as_str()),
            values: headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect(),
        })
        .collect();
    lines.sort_by(|a, b| compare(&a.name, &b.name));
    lines
}
