//! Declarative research-data project templates.
//!
//! A template declares how data file names are structured (per file
//! extension), how files are laid out in directories, and how a project is
//! named. [`TemplateSpec`] validates a declaration; [`MatchEngine`] parses file
//! names with it and computes where each file belongs.

mod compile;
pub mod decl;
mod default;
mod error;
mod extension;
mod field;
mod layout;
mod loader;
mod matcher;
mod naming;
mod project;
mod report;
mod slug;
mod template;
mod walk;

pub use decl::{
    ExtensionDecl, FieldDecl, FieldObjectDecl, LayoutDecl, MappedLayoutDecl, NamingConventionDecl,
    TemplateDecl,
};
pub use default::{DEFAULT_TEMPLATE_YAML, default_template, default_template_decl};
pub use error::{Error, SchemaError};
pub use extension::{ExtensionSpec, RawMatch};
pub use field::{FieldKind, FieldSpec, PATH_SEPARATOR, RESERVED_REST};
pub use layout::{LayoutMapping, LayoutSpec};
pub use loader::{TemplateSource, load_decl, load_template};
pub use matcher::{FieldValues, MatchEngine};
pub use naming::{MetadataField, NamingConventionSpec, ProjectMetadata};
pub use project::{METADATA_NAME, MetadataFile, Project};
pub use report::{Diagnostic, Report, Status};
pub use slug::slugify;
pub use template::{TemplateSpec, WILDCARD, file_suffix};
pub use walk::{PlacedFile, RejectedFile, WalkOutput, scan_dir};

use std::path::Path;

/// Scans `root` with `engine` and summarizes the result.
pub fn check_dir(root: &Path, engine: &MatchEngine) -> Result<Report, Error> {
    let walk = scan_dir(root, engine)?;
    Ok(Report::from_walk_output(&walk))
}
