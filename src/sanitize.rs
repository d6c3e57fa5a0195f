/// Neutralises traversal tokens in a client-supplied upload name.
///
/// Forward slashes, backslashes and every `..` run are replaced with `_`, so the
/// result joined onto a trusted directory always names a direct child of it.
/// Names are not made unique; uploading the same name twice overwrites the first file.
pub fn sanitize_filename(raw: &str) -> String {
    raw.replace('/', "_")
        .replace('\\', "_")
        .replace("..", "_")
}
