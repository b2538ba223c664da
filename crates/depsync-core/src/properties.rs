use std::collections::BTreeMap;
use std::path::Path;

use depsync_util::errors::{DepsyncError, SettingsLocation};

/// Parse a properties file body (`key=value` or `key: value` lines).
///
/// Blank lines and lines starting with `#` or `!` are skipped.
pub fn parse_properties(content: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        let split = trimmed
            .find(['=', ':'])
            .map(|i| (&trimmed[..i], &trimmed[i + 1..]));
        if let Some((key, value)) = split {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

/// Load and merge properties files for `module`.
///
/// Files listed first have priority: they are loaded last so their values
/// overwrite those of files listed after them. Relative paths are taken
/// relative to `base_dir`.
pub fn load_properties(
    module: &str,
    base_dir: &Path,
    files: &[String],
) -> Result<BTreeMap<String, String>, DepsyncError> {
    let mut merged = BTreeMap::new();
    for file in files.iter().rev() {
        let path = base_dir.join(file);
        if !path.is_file() {
            return Err(DepsyncError::SettingsNotFound {
                message: format!(
                    "The properties file given in the settings for module {module} does not exist: {}",
                    path.display()
                ),
                location: SettingsLocation::Module,
                module: Some(module.to_string()),
            });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| DepsyncError::SettingsRead {
            path: path.clone(),
            module: module.to_string(),
            message: e.to_string(),
        })?;
        let parsed = parse_properties(&content);
        tracing::debug!("Loaded {} properties from {}", parsed.len(), path.display());
        merged.extend(parsed);
    }
    Ok(merged)
}

/// Expand `${name}` references using `properties`.
///
/// Unknown references are left in place so the engine can report them.
pub fn interpolate(input: &str, properties: &BTreeMap<String, String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };
        let key = &after[..end];
        match properties.get(key) {
            Some(value) => result.push_str(value),
            None => {
                result.push_str("${");
                result.push_str(key);
                result.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_known_and_unknown() {
        let mut props = BTreeMap::new();
        props.insert("cache.dir".to_string(), "/tmp/cache".to_string());
        assert_eq!(
            interpolate("${cache.dir}/org/${missing}", &props),
            "/tmp/cache/org/${missing}"
        );
        assert_eq!(interpolate("no refs", &props), "no refs");
        assert_eq!(interpolate("open ${never", &props), "open ${never");
    }

    #[test]
    fn parse_both_separators() {
        let props = parse_properties("# comment\n! also\na=1\nb : two\n\n");
        assert_eq!(props.get("a").map(String::as_str), Some("1"));
        assert_eq!(props.get("b").map(String::as_str), Some("two"));
        assert_eq!(props.len(), 2);
    }
}
