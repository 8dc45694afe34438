//! Upstream cleanup of a raw v101 transcription before transliteration.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::RemapError;

// Pre-compile cleanup patterns at module load time
lazy_static! {
    // Inline annotations such as <f1r.P1.1;H> or <!plant>, brackets included
    static ref ANNOTATION: Regex = Regex::new(r"<[^>]*>").unwrap();
    // v101 line-end markers; not word boundaries for our purposes
    static ref LINE_END_MARKERS: Regex = Regex::new(r"[-=]").unwrap();
    static ref CARRIAGE_RETURN: Regex = Regex::new(r"\r\n?").unwrap();
}

/// Strip annotations and line-end markers, normalise line endings.
/// Returns the cleaned text and the number of removals made.
pub fn clean_transcription(text: &str) -> (String, u64) {
    let mut removed: u64 = 0;

    let annotations = ANNOTATION.find_iter(text).count();
    let result = if annotations > 0 {
        removed += annotations as u64;
        ANNOTATION.replace_all(text, "").into_owned()
    } else {
        text.to_string()
    };

    let markers = LINE_END_MARKERS.find_iter(&result).count();
    let result = if markers > 0 {
        removed += markers as u64;
        LINE_END_MARKERS.replace_all(&result, "").into_owned()
    } else {
        result
    };

    let result = CARRIAGE_RETURN.replace_all(&result, "\n").into_owned();
    (result, removed)
}

/// Clean a transcription file into another file.
/// Returns (removals, bytes_read).
pub fn clean_file_to_file(input: &Path, output: &Path) -> Result<(u64, u64), RemapError> {
    let content = fs::read_to_string(input).map_err(|e| RemapError::read(input, e))?;
    let bytes_read = content.len() as u64;

    let (cleaned, removed) = clean_transcription(&content);

    // Ensure parent directory exists
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RemapError::write(parent, e))?;
    }
    fs::write(output, cleaned).map_err(|e| RemapError::write(output, e))?;

    Ok((removed, bytes_read))
}
