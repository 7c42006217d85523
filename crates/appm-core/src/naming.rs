//! Project naming conventions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decl::NamingConventionDecl;
use crate::error::SchemaError;
use crate::slug::slugify;

/// General project information a project name is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub year: i32,
    pub summary: String,
    #[serde(default = "default_internal")]
    pub internal: bool,
    #[serde(default)]
    pub researcher_name: Option<String>,
    #[serde(default)]
    pub organisation_name: Option<String>,
}

fn default_internal() -> bool {
    true
}

impl ProjectMetadata {
    pub fn new(year: i32, summary: impl Into<String>) -> ProjectMetadata {
        ProjectMetadata {
            year,
            summary: summary.into(),
            internal: true,
            researcher_name: None,
            organisation_name: None,
        }
    }
}

/// The fixed vocabulary a naming convention draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataField {
    Year,
    Summary,
    Internal,
    ResearcherName,
    OrganisationName,
}

impl MetadataField {
    pub const ALL: [MetadataField; 5] = [
        MetadataField::Year,
        MetadataField::Summary,
        MetadataField::Internal,
        MetadataField::ResearcherName,
        MetadataField::OrganisationName,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetadataField::Year => "year",
            MetadataField::Summary => "summary",
            MetadataField::Internal => "internal",
            MetadataField::ResearcherName => "researcherName",
            MetadataField::OrganisationName => "organisationName",
        }
    }

    /// Rendered name segment, or `None` when the value is absent.
    fn render(self, meta: &ProjectMetadata) -> Option<String> {
        match self {
            MetadataField::Year => Some(meta.year.to_string()),
            MetadataField::Summary => Some(slugify(&meta.summary)),
            MetadataField::Internal => Some(
                if meta.internal { "internal" } else { "external" }.to_string(),
            ),
            MetadataField::ResearcherName => meta.researcher_name.as_deref().map(slugify),
            MetadataField::OrganisationName => meta.organisation_name.as_deref().map(slugify),
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataField {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetadataField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownNamingField {
                field: s.to_string(),
            })
    }
}

/// How a project name is synthesized from [`ProjectMetadata`].
///
/// `structure` is a non-empty permutation of a subset of
/// [`MetadataField::ALL`]: no repeats, nothing outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConventionSpec {
    separator: String,
    structure: Vec<MetadataField>,
}

impl NamingConventionSpec {
    pub fn new<S: AsRef<str>>(
        separator: impl Into<String>,
        structure: &[S],
    ) -> Result<NamingConventionSpec, SchemaError> {
        if structure.is_empty() {
            return Err(SchemaError::EmptyNamingStructure);
        }

        let mut fields: Vec<MetadataField> = Vec::with_capacity(structure.len());
        for raw in structure {
            let field: MetadataField = raw.as_ref().parse()?;
            if fields.contains(&field) {
                return Err(SchemaError::RepeatedNamingField {
                    field: field.to_string(),
                });
            }
            fields.push(field);
        }

        Ok(NamingConventionSpec {
            separator: separator.into(),
            structure: fields,
        })
    }

    pub fn from_decl(decl: &NamingConventionDecl) -> Result<NamingConventionSpec, SchemaError> {
        NamingConventionSpec::new(decl.sep.clone(), &decl.structure[..])
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn structure(&self) -> &[MetadataField] {
        &self.structure
    }

    /// Project name for `meta`.
    ///
    /// Absent values are skipped entirely, so the result never has a
    /// leading, trailing or doubled separator.
    pub fn render(&self, meta: &ProjectMetadata) -> String {
        self.structure
            .iter()
            .filter_map(|field| field.render(meta))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

impl Default for NamingConventionSpec {
    fn default() -> Self {
        NamingConventionSpec {
            separator: "_".to_string(),
            structure: MetadataField::ALL.to_vec(),
        }
    }
}
