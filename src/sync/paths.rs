use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left untouched by URI component encoding (besides alphanumerics)
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Whole-URI encoding also keeps the reserved characters
const URI_ENCODE_SET: &AsciiSet = &COMPONENT_ENCODE_SET
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Convert Windows separators to forward slashes
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Forward slashes, no trailing separator
pub fn normalize_local(path: &str) -> String {
    let path = to_forward_slashes(path);
    path.trim_end_matches('/').to_string()
}

/// Join path fragments into an absolute remote path.
///
/// Every fragment may use either separator style and may carry leading,
/// trailing or repeated separators; empty segments are dropped so the result
/// always starts with a single `/` and never contains `//`.
pub fn join_remote(parts: &[&str]) -> String {
    let segments: Vec<&str> = parts
        .iter()
        .flat_map(|part| part.split(is_separator))
        .filter(|segment| !segment.is_empty())
        .collect();

    format!("/{}", segments.join("/"))
}

/// Prefix a path with `/` unless it already has one
pub fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Case-insensitive `strip_prefix`.
///
/// Characters are compared pairwise after lowercasing, and the returned slice
/// is cut at the byte offset of the *original* string, so characters whose
/// lowercase form has a different UTF-8 length cannot shift the cut.
pub fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = path.char_indices();
    let mut offset = 0;

    for expected in prefix.chars() {
        let (idx, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        offset = idx + actual.len_utf8();
    }

    Some(&path[offset..])
}

/// Last path component, accepting either separator
pub fn file_name(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Everything before the last separator (empty when there is none)
pub fn parent_folder(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Percent-encode each segment of a remote path, keeping the separators
pub fn encode_remote_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, COMPONENT_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode a whole URI, leaving reserved characters intact
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI_ENCODE_SET).to_string()
}
