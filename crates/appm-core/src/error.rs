use std::path::PathBuf;

use thiserror::Error;

/// Violations of the template declaration rules.
///
/// Raised while building a [`crate::TemplateSpec`] or any of its parts.
/// Construction never returns a partially valid template.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed declaration: {message}")]
    Malformed { message: String },

    #[error("Unknown template key: {key}")]
    UnknownKey { key: String },

    #[error("Components cannot be empty: {field}")]
    EmptyComponents { field: String },

    #[error("Either one of pattern or components must be provided: {field}")]
    MissingPatternOrComponents { field: String },

    #[error("pattern and components must not be provided at the same time: {field}")]
    PatternAndComponents { field: String },

    #[error("If components are provided, sep must also be provided: {field}")]
    MissingSeparator { field: String },

    #[error("A field with a pattern must have a name: {pattern}")]
    AnonymousLeaf { pattern: String },

    #[error("Field component must not contain reserved key: rest ({field})")]
    ReservedName { field: String },

    #[error("Non-unique field name: {field}")]
    DuplicateField { field: String },

    #[error("First component must be required: {field}")]
    FirstComponentOptional { field: String },

    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("capture group count mismatch: expected {expected}, compiled pattern has {actual}")]
    CaptureGroupMismatch { expected: usize, actual: usize },

    #[error("Mapping keys must be a subset of structure: {key}")]
    MappingKeyNotInStructure { key: String },

    #[error("Invalid naming structure - empty structure")]
    EmptyNamingStructure,

    #[error("Invalid naming structure - repetition: {field}")]
    RepeatedNamingField { field: String },

    #[error(
        "Invalid naming structure - invalid field: {field}. Structure must be a non empty permutation of {{year, summary, internal, researcherName, organisationName}}"
    )]
    UnknownNamingField { field: String },

    #[error("Empty extension declaration")]
    NoExtensions,

    #[error("Extension declared more than once: {extension}")]
    DuplicateExtension { extension: String },

    #[error(
        "Component fields must be a superset of layout fields. Extension: {extension}. Missing: {missing:?}"
    )]
    LayoutNotSubset {
        extension: String,
        missing: Vec<String>,
    },

    #[error(
        "Optional field that is also a layout field must have a default value. Extension: {extension}. Field: {field}"
    )]
    MissingDefault { extension: String, field: String },

    #[error("extension {extension}: {source}")]
    InExtension {
        extension: String,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    pub(crate) fn in_extension(extension: &str, source: SchemaError) -> SchemaError {
        SchemaError::InExtension {
            extension: extension.to_string(),
            source: Box::new(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Unsupported file extension: {extension} (file: {name})")]
    UnsupportedFileExtension { extension: String, name: String },

    #[error("Name: {name}. Pattern: {pattern}")]
    FileFormatMismatch { name: String, pattern: String },

    #[error("layout field has no matched value: {field}")]
    MissingLayoutField { field: String },

    #[error("layout field {field} is not a valid directory name: {value:?}")]
    InvalidPlacementSegment { field: String, value: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project metadata not found: {}", path.display())]
    ProjectNotFound { path: PathBuf },

    #[error("destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error concerns a single file name rather than the template
    /// or the filesystem. Batch operations record these and keep going.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFileExtension { .. }
                | Error::FileFormatMismatch { .. }
                | Error::MissingLayoutField { .. }
                | Error::InvalidPlacementSegment { .. }
        )
    }
}
