//! Template loading from files, strings and in-memory declarations.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::decl::TemplateDecl;
use crate::default::default_template_decl;
use crate::error::{Error, SchemaError};
use crate::template::TemplateSpec;

/// Where a template declaration comes from.
#[derive(Debug, Clone, Default)]
pub enum TemplateSource {
    /// The built-in template.
    #[default]
    Default,
    /// A YAML file, or a JSON file when the extension is `.json`.
    Path(PathBuf),
    /// YAML (or JSON) text.
    Text(String),
    /// An already decoded declaration.
    Decl(TemplateDecl),
}

impl From<Option<PathBuf>> for TemplateSource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(TemplateSource::Default, TemplateSource::Path)
    }
}

/// Reads the declaration for `source` without validating it.
pub fn load_decl(source: TemplateSource) -> Result<TemplateDecl, Error> {
    match source {
        TemplateSource::Default => Ok(default_template_decl()?),
        TemplateSource::Path(path) => read_decl(&path),
        TemplateSource::Text(text) => Ok(parse_yaml(&text)?),
        TemplateSource::Decl(decl) => Ok(decl),
    }
}

/// Loads and validates a template.
pub fn load_template(source: TemplateSource) -> Result<TemplateSpec, Error> {
    let decl = load_decl(source)?;
    Ok(TemplateSpec::from_decl(decl)?)
}

pub(crate) fn read_decl(path: &Path) -> Result<TemplateDecl, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), "loading template");

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let decl = if is_json {
        parse_json(&text)
    } else {
        parse_yaml(&text)
    };
    decl.map_err(|e| match e {
        SchemaError::Malformed { message } => SchemaError::Malformed {
            message: format!("{}: {message}", path.display()),
        },
        other => other,
    })
    .map_err(Error::from)
}

/// Top-level keys of a template declaration.
const TEMPLATE_KEYS: [&str; 4] = ["naming_convention", "layout", "file", "version"];

fn malformed(e: impl Display) -> SchemaError {
    SchemaError::Malformed {
        message: e.to_string(),
    }
}

/// Rejects top-level keys other than the template keys and `extra`.
///
/// `TemplateDecl` is flattened into the project metadata file, so it cannot
/// deny unknown fields itself.
fn ensure_known_keys<'a>(
    keys: impl IntoIterator<Item = &'a str>,
    extra: &[&str],
) -> Result<(), SchemaError> {
    for key in keys {
        if !TEMPLATE_KEYS.contains(&key) && !extra.contains(&key) {
            return Err(SchemaError::UnknownKey {
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Decodes YAML holding a template declaration plus the `extra` top-level keys.
pub(crate) fn parse_yaml_with<T: DeserializeOwned>(
    text: &str,
    extra: &[&str],
) -> Result<T, SchemaError> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(malformed)?;
    if let Some(map) = value.as_mapping() {
        ensure_known_keys(map.keys().filter_map(serde_yaml::Value::as_str), extra)?;
    }
    serde_yaml::from_value(value).map_err(malformed)
}

fn parse_yaml(text: &str) -> Result<TemplateDecl, SchemaError> {
    parse_yaml_with(text, &[])
}

fn parse_json(text: &str) -> Result<TemplateDecl, SchemaError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(malformed)?;
    if let Some(map) = value.as_object() {
        ensure_known_keys(map.keys().map(String::as_str), &[])?;
    }
    serde_json::from_value(value).map_err(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_when_no_path_given() {
        let t = load_template(TemplateSource::from(None)).unwrap();
        assert!(t.extensions().contains_key("*"));
    }

    #[test]
    fn loads_json_and_yaml_files() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("t.json");
        fs::write(
            &json,
            r#"{"layout": ["site"], "file": {"bin": {"components": [["site", "[a-z]+"]]}}}"#,
        )
        .unwrap();
        let t = load_template(TemplateSource::Path(json)).unwrap();
        assert!(t.extensions().contains_key("bin"));

        let yaml = dir.path().join("t.yaml");
        fs::write(
            &yaml,
            "layout: [site]\nfile:\n  csv:\n    components: [[site, '[a-z]+']]\n",
        )
        .unwrap();
        let t = load_template(TemplateSource::Path(yaml)).unwrap();
        assert!(t.extensions().contains_key("csv"));
    }

    #[test]
    fn malformed_shape_is_a_schema_error() {
        let err = load_template(TemplateSource::Text("layout: 3\nfile: []\n".into())).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Malformed { .. })));
    }

    #[test]
    fn misspelled_top_level_key_is_rejected() {
        let text = concat!(
            "naming_conventions:\n  structure: [year]\n",
            "layout: [site]\n",
            "file:\n  bin:\n    components: [[site, '[a-z]+']]\n",
        );
        let err = load_template(TemplateSource::Text(text.into())).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::UnknownKey { ref key }) if key == "naming_conventions"
        ));
    }

    #[test]
    fn misspelled_json_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("t.json");
        fs::write(
            &json,
            r#"{"layout": ["site"], "files": {},
                "file": {"bin": {"components": [["site", "[a-z]+"]]}}}"#,
        )
        .unwrap();
        let err = load_template(TemplateSource::Path(json)).unwrap_err();
        assert!(err.to_string().contains("files"));
    }

    #[test]
    fn misspelled_layout_mapping_is_rejected() {
        let text = concat!(
            "layout:\n  structure: [site]\n  mappings: {site: {a: b}}\n",
            "file:\n  bin:\n    components: [[site, '[a-z]+']]\n",
        );
        let err = load_template(TemplateSource::Text(text.into())).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Malformed { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err =
            load_template(TemplateSource::Path("/definitely/not/here.yaml".into())).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
