use std::collections::HashSet;

const JPEG_EXTENSION: &str = "jpeg";
const MAX_STEM_LEN: usize = 120;

/// Archive-safe entry name for a converted file: original stem, `.jpeg` extension.
///
/// `IMG_0001.HEIC` becomes `IMG_0001.jpeg`; a name without extension gets one appended.
pub fn archive_entry_name(original: &str) -> String {
    let stem = sanitize_stem(strip_extension(original));
    format!("{stem}.{JPEG_EXTENSION}")
}

/// Entry names for a whole batch, with ` (2)`, ` (3)`, ... inserted on collisions.
///
/// Collisions are detected case-insensitively so the archive extracts cleanly on
/// case-insensitive file systems.
pub fn unique_entry_names<'a>(originals: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    let mut names = Vec::new();
    for original in originals {
        let base = archive_entry_name(original);
        let stem = base
            .strip_suffix(&format!(".{JPEG_EXTENSION}"))
            .unwrap_or(&base)
            .to_string();
        let mut candidate = base;
        let mut counter = 2;
        while !taken.insert(candidate.to_lowercase()) {
            candidate = format!("{stem} ({counter}).{JPEG_EXTENSION}");
            counter += 1;
        }
        names.push(candidate);
    }
    names
}

fn strip_extension(name: &str) -> &str {
    // Only the last path component counts; browsers and pickers hand over bare names
    // but paths may come from the command line.
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

fn sanitize_stem(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&[' ', '.'][..]);

    let mut stem = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        if stem.len() + c.len_utf8() > MAX_STEM_LEN {
            break;
        }
        stem.push(c);
    }
    if stem.is_empty() {
        stem.push_str("image");
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
