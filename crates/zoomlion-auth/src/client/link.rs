//! `link` response header lookup for pagination.
//!
//! Parsing is delegated to `parse_link_header`; only the `next` relation is
//! of interest here.

/// Returns the raw target of the `rel="next"` link, if any.
///
/// A header that does not parse yields no next link, which ends pagination.
#[must_use]
pub fn next_link(header: &str) -> Option<String> {
    let links = parse_link_header::parse_with_rel(header).ok()?;

    links
        .get("next")
        .or_else(|| {
            links
                .iter()
                .find(|(rel, _)| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("next")))
                .map(|(_, link)| link)
        })
        .map(|link| link.raw_uri.clone())
}
