use std::collections::BTreeMap;

use tracing::debug;

use crate::decl::TemplateDecl;
use crate::error::{Error, SchemaError};
use crate::extension::ExtensionSpec;
use crate::layout::LayoutSpec;
use crate::naming::NamingConventionSpec;

/// Extension key used when no exact declaration exists.
pub const WILDCARD: &str = "*";

/// A fully validated project template.
///
/// Built once from a [`TemplateDecl`]; immutable afterwards and safe to share
/// between threads.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    naming_convention: NamingConventionSpec,
    layout: LayoutSpec,
    extensions: BTreeMap<String, ExtensionSpec>,
    version: Option<String>,
    decl: TemplateDecl,
}

impl TemplateSpec {
    /// Validates `decl`.
    ///
    /// Components are built first (each reports its own errors), then the
    /// layout is checked against every extension.
    pub fn from_decl(decl: TemplateDecl) -> Result<TemplateSpec, SchemaError> {
        let naming_convention = NamingConventionSpec::from_decl(&decl.naming_convention)?;
        let layout = LayoutSpec::from_decl(&decl.layout)?;

        if decl.file.is_empty() {
            return Err(SchemaError::NoExtensions);
        }

        let mut extensions = BTreeMap::new();
        for (key, ext_decl) in &decl.file {
            let ext = ExtensionSpec::from_decl(ext_decl)
                .map_err(|e| SchemaError::in_extension(key, e))?;
            let key = normalize_key(key);
            if extensions.insert(key.to_string(), ext).is_some() {
                return Err(SchemaError::DuplicateExtension {
                    extension: key.to_string(),
                });
            }
        }

        for (key, ext) in &extensions {
            let fields = ext.fields();
            let missing: Vec<String> = layout
                .structure()
                .iter()
                .filter(|f| !fields.contains(*f))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(SchemaError::LayoutNotSubset {
                    extension: key.clone(),
                    missing,
                });
            }
        }

        for (key, ext) in &extensions {
            if let Some(field) = layout
                .structure()
                .iter()
                .find(|f| ext.is_optional(f) && !ext.defaults().contains_key(*f))
            {
                return Err(SchemaError::MissingDefault {
                    extension: key.clone(),
                    field: field.clone(),
                });
            }
        }

        debug!(
            extensions = extensions.len(),
            layout = ?layout.structure(),
            "validated template"
        );

        Ok(TemplateSpec {
            naming_convention,
            layout,
            extensions,
            version: decl.version.clone(),
            decl,
        })
    }

    pub fn naming_convention(&self) -> &NamingConventionSpec {
        &self.naming_convention
    }

    pub fn layout(&self) -> &LayoutSpec {
        &self.layout
    }

    /// Extensions keyed by suffix (without a leading `.`) or [`WILDCARD`].
    pub fn extensions(&self) -> &BTreeMap<String, ExtensionSpec> {
        &self.extensions
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The declaration this template was built from.
    pub fn decl(&self) -> &TemplateDecl {
        &self.decl
    }

    /// The extension responsible for `file_name`: an exact suffix match,
    /// else the wildcard declaration.
    pub fn select_extension(&self, file_name: &str) -> Result<&ExtensionSpec, Error> {
        let suffix = file_suffix(file_name);
        self.extensions
            .get(suffix)
            .or_else(|| self.extensions.get(WILDCARD))
            .ok_or_else(|| Error::UnsupportedFileExtension {
                extension: suffix.to_string(),
                name: file_name.to_string(),
            })
    }
}

/// Text after the last `.` of `file_name`, or `""` when there is none.
pub fn file_suffix(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, suffix)| suffix)
        .unwrap_or("")
}

fn normalize_key(key: &str) -> &str {
    if key == WILDCARD {
        key
    } else {
        key.strip_prefix('.').unwrap_or(key)
    }
}
