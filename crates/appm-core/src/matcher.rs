use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::error::Error;
use crate::naming::ProjectMetadata;
use crate::template::TemplateSpec;

/// Field path -> value for a matched file name, defaults applied.
pub type FieldValues = BTreeMap<String, String>;

/// Runs file names against a validated template.
///
/// Every query is a pure function of the template and its argument.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    template: TemplateSpec,
}

impl MatchEngine {
    pub fn new(template: TemplateSpec) -> MatchEngine {
        MatchEngine { template }
    }

    pub fn template(&self) -> &TemplateSpec {
        &self.template
    }

    /// Field values of `file_name`.
    ///
    /// Absent fields take their declared default. Absent fields without a
    /// default are left out of the result.
    pub fn match_name(&self, file_name: &str) -> Result<FieldValues, Error> {
        let ext = self.template.select_extension(file_name)?;
        let raw = ext.match_name(file_name)?;

        let mut values: FieldValues = raw
            .into_iter()
            .filter_map(|(path, value)| value.map(|v| (path, v)))
            .collect();
        for (field, default) in ext.defaults() {
            values
                .entry(field.clone())
                .or_insert_with(|| default.clone());
        }

        Ok(values)
    }

    /// Directory segments `file_name` belongs in, relative to the project.
    pub fn placement(&self, file_name: &str) -> Result<Vec<String>, Error> {
        let values = self.match_name(file_name)?;
        let segments = self.template.layout().resolve(&values)?;
        debug!(file = file_name, placement = ?segments, "resolved placement");
        Ok(segments)
    }

    /// [`MatchEngine::placement`] joined into a relative path.
    pub fn placement_path(&self, file_name: &str) -> Result<PathBuf, Error> {
        Ok(self.placement(file_name)?.iter().collect())
    }

    pub fn project_name(&self, meta: &ProjectMetadata) -> String {
        self.template.naming_convention().render(meta)
    }
}
