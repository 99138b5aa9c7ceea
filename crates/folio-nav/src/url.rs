//! Link derivation and display names.

/// Extensions stripped by [`path_to_url`].
const DOCUMENT_EXTENSIONS: [&str; 5] = ["md", "markdown", "json", "yaml", "yml"];

/// Convert a source-relative document path to a site URL.
///
/// Examples:
/// - `None` -> `/`
/// - `index.md` -> `/`
/// - `guide.md` -> `/guide`
/// - `api/index.md` -> `/api/`
/// - `api/users.md` -> `/api/users`
///
/// Applying it to its own output is a no-op.
#[must_use]
pub fn path_to_url(path: Option<&str>) -> String {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return "/".to_owned();
    };
    let path = path.replace('\\', "/");
    let without_ext = strip_document_extension(&path);

    let mut url = if without_ext.starts_with('/') {
        without_ext.to_owned()
    } else {
        format!("/{without_ext}")
    };
    if url == "/index" {
        url.truncate(1);
    } else if url.ends_with("/index") {
        url.truncate(url.len() - "index".len());
    }
    url
}

fn strip_document_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = name_start + dot;
            let ext = &path[dot + 1..];
            if DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
            {
                &path[..dot]
            } else {
                path
            }
        }
        _ => path,
    }
}

/// Human-readable title from a file or directory name.
///
/// `-` and `_` become spaces; every word and every dot-separated segment
/// starts with a capital letter.
///
/// ```
/// use folio_nav::prettify_name;
///
/// assert_eq!(prettify_name("getting-started"), "Getting Started");
/// assert_eq!(prettify_name("release_notes.v2"), "Release Notes.V2");
/// ```
#[must_use]
pub fn prettify_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for word in name.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        for (i, segment) in word.split('.').enumerate() {
            if i > 0 {
                result.push('.');
            }
            capitalize_first_into(segment, &mut result);
        }
    }
    result
}

fn capitalize_first_into(word: &str, buf: &mut String) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        buf.extend(first.to_uppercase());
        buf.push_str(chars.as_str());
    }
}
