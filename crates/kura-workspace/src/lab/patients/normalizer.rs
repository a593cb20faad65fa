use crate::lab::format::fold;

/// Header text reduced for matching: no BOM or zero-width characters,
/// lowercased, accents folded, whitespace collapsed.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    fold(&collapsed)
}
