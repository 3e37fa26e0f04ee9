//! INI-style settings file reader.
//!
//! Lines look like `key = value` or `key: value`; `#` and `;` start comment
//! lines; keys are lower-cased. An indented line continues the previous
//! value. Keys in `[DEFAULT]` apply to every section that exists.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Section the relay reads its settings from.
pub const DEFAULT_SECTION: &str = "default";

/// Read `section` from the file at `path`.
///
/// A missing file is not an error and yields an empty map.
pub fn read_section(path: &Path, section: &str) -> Result<HashMap<String, String>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No settings file");
            return Ok(HashMap::new());
        }
        Err(e) => return Err(e.into()),
    };

    let values = parse_section(&contents, section);
    debug!(path = %path.display(), keys = values.len(), "Read settings file");
    Ok(values)
}

/// Section whose keys every other section inherits.
const INHERITED_SECTION: &str = "DEFAULT";

/// Extract the key/value pairs of one section from INI text.
///
/// Yields nothing when `section` does not appear, even if `[DEFAULT]` does.
pub fn parse_section(contents: &str, section: &str) -> HashMap<String, String> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;
    let mut last_key: Option<String> = None;

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let indented = raw.starts_with([' ', '\t']);
        if indented {
            if let (Some(name), Some(key)) = (&current, &last_key) {
                if let Some(value) = sections.get_mut(name).and_then(|s| s.get_mut(key)) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(line);
                    continue;
                }
            }
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            last_key = None;
            continue;
        }

        let Some(name) = &current else {
            continue;
        };
        let Some(split) = line.find(['=', ':']) else {
            continue;
        };
        let key = line[..split].trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let value = line[split + 1..].trim().to_string();
        sections.entry(name.clone()).or_default().insert(key.clone(), value);
        last_key = Some(key);
    }

    let inherited = sections.get(INHERITED_SECTION).cloned().unwrap_or_default();
    match sections.remove(section) {
        Some(mut values) if section != INHERITED_SECTION => {
            for (key, value) in inherited {
                values.entry(key).or_insert(value);
            }
            values
        }
        _ => HashMap::new(),
    }
}
