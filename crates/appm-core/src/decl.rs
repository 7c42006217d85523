//! Raw template declarations, as loaded from YAML or JSON.
//!
//! Every accepted shape is decoded here into one canonical type. The model
//! types in the rest of the crate are built from these and never look at the
//! raw data again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub(crate) fn default_sep() -> String {
    "_".to_string()
}

fn default_required() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

/// Top level of a template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDecl {
    #[serde(default)]
    pub naming_convention: NamingConventionDecl,

    pub layout: LayoutDecl,

    /// Extension key (`bin`, `.bin` or the wildcard `*`) to declaration.
    pub file: BTreeMap<String, ExtensionDecl>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConventionDecl {
    #[serde(default = "default_sep")]
    pub sep: String,

    #[serde(default = "default_naming_structure")]
    pub structure: Vec<String>,
}

fn default_naming_structure() -> Vec<String> {
    crate::naming::MetadataField::ALL
        .iter()
        .map(|f| f.as_str().to_string())
        .collect()
}

impl Default for NamingConventionDecl {
    fn default() -> Self {
        Self {
            sep: default_sep(),
            structure: default_naming_structure(),
        }
    }
}

/// A layout is either a bare list of field names or a structure with value
/// remapping tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutDecl {
    Structure(Vec<String>),
    Mapped(MappedLayoutDecl),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappedLayoutDecl {
    pub structure: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mapping: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionDecl {
    #[serde(default = "default_sep")]
    pub sep: String,

    #[serde(alias = "format")]
    pub components: Vec<FieldDecl>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default: BTreeMap<String, String>,
}

/// One field of a file name.
///
/// `[name, pattern]` is shorthand for a required leaf field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDecl {
    Pair(String, String),
    Object(FieldObjectDecl),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldObjectDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(
        default,
        alias = "subfields",
        skip_serializing_if = "Option::is_none"
    )]
    pub components: Option<Vec<FieldDecl>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sep: Option<String>,

    #[serde(default = "default_required", skip_serializing_if = "is_true")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FieldDecl {
    pub fn leaf(name: impl Into<String>, pattern: impl Into<String>) -> FieldDecl {
        FieldDecl::Pair(name.into(), pattern.into())
    }

    /// Canonical object form of this declaration.
    pub fn to_object(&self) -> FieldObjectDecl {
        match self {
            FieldDecl::Pair(name, pattern) => FieldObjectDecl {
                name: Some(name.clone()),
                pattern: Some(pattern.clone()),
                components: None,
                sep: None,
                required: true,
                default: None,
            },
            FieldDecl::Object(obj) => obj.clone(),
        }
    }
}
