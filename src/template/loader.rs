//! Language file discovery, parsing and first-run seeding

use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;
use serde_yaml::Value;

use super::types::{LanguageCode, TemplateError, TemplateResult, TemplateSet};

/// Language files bundled into the binary
#[derive(RustEmbed)]
#[folder = "resources/languages/"]
struct BundledLanguages;

/// Every language file is named `lang_<code>.<ext>`
pub const FILE_PREFIX: &str = "lang_";

/// Recognized document extensions; the first one is used when seeding
pub const EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// File name used for a language when writing it to disk
pub fn language_file_name(code: &LanguageCode) -> String {
    format!("{}{}.{}", FILE_PREFIX, code, EXTENSIONS[0])
}

/// Derive the language code from a `lang_<code>.<ext>` path
pub fn language_code_from_path(path: &Path) -> Option<LanguageCode> {
    let name = path.file_name()?.to_str()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if !EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        return None;
    }
    let code = stem.strip_prefix(FILE_PREFIX)?;
    if code.is_empty() {
        return None;
    }
    Some(LanguageCode::new(code))
}

/// Raw bytes of a bundled language file
pub fn bundled_language(code: &LanguageCode) -> Option<Cow<'static, [u8]>> {
    BundledLanguages::get(&language_file_name(code)).map(|file| file.data)
}

/// Languages available in the bundle
pub fn bundled_languages() -> Vec<LanguageCode> {
    let mut codes: Vec<_> = BundledLanguages::iter()
        .filter_map(|name| language_code_from_path(Path::new(name.as_ref())))
        .collect();
    codes.sort();
    codes
}

/// Write the bundled file for `code` into `dir` unless one is already there.
///
/// Returns `true` when a file was written. Existing files are never
/// overwritten, in any recognized extension.
pub fn seed_language(dir: &Path, code: &LanguageCode) -> TemplateResult<bool> {
    let present = EXTENSIONS
        .iter()
        .any(|ext| dir.join(format!("{}{}.{}", FILE_PREFIX, code, ext)).exists());
    if present {
        return Ok(false);
    }

    let Some(data) = bundled_language(code) else {
        tracing::debug!(language = %code, "No bundled file to seed");
        return Ok(false);
    };

    let target = dir.join(language_file_name(code));
    match OpenOptions::new().write(true).create_new(true).open(&target) {
        Ok(mut file) => {
            file.write_all(&data)
                .map_err(|e| TemplateError::io(&target, e))?;
            tracing::info!(language = %code, path = %target.display(), "Seeded bundled language file");
            Ok(true)
        }
        // Another loader won the race
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(TemplateError::io(&target, e)),
    }
}

/// Create the language directory if it does not exist yet
pub fn ensure_language_dir(dir: &Path) -> TemplateResult<()> {
    fs::create_dir_all(dir).map_err(|e| TemplateError::io(dir, e))
}

/// List language files directly inside `dir`, creating the directory if needed
pub fn scan_language_dir(dir: &Path) -> TemplateResult<Vec<(LanguageCode, PathBuf)>> {
    ensure_language_dir(dir)?;

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| TemplateError::io(dir, e))? {
        let entry = entry.map_err(|e| TemplateError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match language_code_from_path(&path) {
            Some(code) => files.push((code, path)),
            None => tracing::debug!(path = %path.display(), "Ignoring non-language file"),
        }
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Read and parse one language file
pub fn read_language_file(path: &Path) -> TemplateResult<TemplateSet> {
    let content = fs::read_to_string(path).map_err(|e| TemplateError::io(path, e))?;
    parse_template_document(&content)
}

/// Parse a YAML document into a flat dotted-key template set.
///
/// Nested mappings become `parent.child` keys, numbers and booleans are
/// stringified, lists of scalars are joined with newlines and nulls are
/// skipped. An empty document yields an empty set.
pub fn parse_template_document(content: &str) -> TemplateResult<TemplateSet> {
    let root: Value = serde_yaml::from_str(content)?;
    let mut entries = Vec::new();

    match root {
        Value::Null => {}
        Value::Mapping(_) => flatten("", &root, &mut entries),
        other => {
            return Err(TemplateError::InvalidDocument(format!(
                "root must be a mapping, found {}",
                value_kind(&other)
            )))
        }
    }

    Ok(entries.into_iter().collect())
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let Some(key) = scalar_to_string(key) else {
                    continue;
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, child, out);
            }
        }
        Value::Sequence(items) => {
            let lines: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
            out.push((prefix.to_string(), lines.join("\n")));
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out),
        Value::Null => {}
        scalar => {
            if let Some(text) = scalar_to_string(scalar) {
                out.push((prefix.to_string(), text));
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_file_name() {
        assert_eq!(
            language_code_from_path(Path::new("/x/lang_it.yml")),
            Some(LanguageCode::new("it"))
        );
        assert_eq!(
            language_code_from_path(Path::new("lang_PT_br.yaml")),
            Some(LanguageCode::new("pt_br"))
        );
        assert_eq!(language_code_from_path(Path::new("lang_.yml")), None);
        assert_eq!(language_code_from_path(Path::new("it.yml")), None);
        assert_eq!(language_code_from_path(Path::new("lang_it.json")), None);
    }

    #[test]
    fn test_flatten_nested_document() {
        let doc = r#"
greeting:
  hello: "Hello &a{name}"
  empty: ""
count: 3
enabled: true
motd:
  - "line one"
  - "line two"
nothing: ~
"#;
        let set = parse_template_document(doc).unwrap();
        assert_eq!(set.get("greeting.hello"), Some("Hello &a{name}"));
        assert_eq!(set.get("greeting.empty"), Some(""));
        assert_eq!(set.get("count"), Some("3"));
        assert_eq!(set.get("enabled"), Some("true"));
        assert_eq!(set.get("motd"), Some("line one\nline two"));
        assert_eq!(set.get("nothing"), None);
        assert_eq!(set.get("greeting"), None);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_template_document("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            parse_template_document("- a\n- b\n"),
            Err(TemplateError::InvalidDocument(_))
        ));
        assert!(matches!(
            parse_template_document("key: [unclosed"),
            Err(TemplateError::Yaml(_))
        ));
    }

    #[test]
    fn test_default_language_is_bundled() {
        assert!(bundled_languages().contains(&LanguageCode::new("en")));
        assert!(bundled_language(&LanguageCode::new("en")).is_some());
    }

    #[test]
    fn test_seed_is_idempotent_and_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let en = LanguageCode::new("en");

        assert!(seed_language(dir.path(), &en).unwrap());
        assert!(!seed_language(dir.path(), &en).unwrap());

        let path = dir.path().join("lang_en.yml");
        fs::write(&path, "custom: value\n").unwrap();
        assert!(!seed_language(dir.path(), &en).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "custom: value\n");
    }

    #[test]
    fn test_seed_without_bundle_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!seed_language(dir.path(), &LanguageCode::new("xx")).unwrap());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_scan_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let languages = dir.path().join("languages");
        fs::write(dir.path().join("ignored.txt"), "").unwrap();

        let files = scan_language_dir(&languages).unwrap();
        assert!(files.is_empty());
        assert!(languages.is_dir());
    }
}
