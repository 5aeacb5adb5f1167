/// Header names are matched case-insensitively, and may be decorated with `*` to mark required columns.
pub fn sanitize_header(header: &str) -> String {
    header.replace('*', "").trim().to_lowercase()
}

/// Data cells are folded the same way as headers, minus the marker stripping. Every required column is an id or a
/// number, so folding never changes what a cell parses to.
pub fn sanitize_field(value: &str) -> String {
    value.trim().to_lowercase()
}
