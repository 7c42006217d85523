//! The built-in project template.

use crate::decl::TemplateDecl;
use crate::error::SchemaError;
use crate::template::TemplateSpec;

/// Template used when a project does not provide its own.
///
/// Files are named `<date>-<time>_<site>_<sensor>_<trial>[_<procLevel>]<rest>`
/// and laid out as `site/sensor/date/trial/procLevel`.
pub const DEFAULT_TEMPLATE_YAML: &str = r#"
naming_convention:
  sep: "_"
  structure: [year, summary, internal, researcherName, organisationName]
layout:
  structure: [site, sensor, date, trial, procLevel]
  mapping:
    procLevel:
      raw: T0-raw
      proc: T1-proc
      trait: T2-trait
file:
  "*":
    sep: "_"
    components:
      - sep: "-"
        components:
          - [date, '\d{8}']
          - [time, '\d{6}']
      - [site, '[^_.]+']
      - [sensor, '[^_.]+']
      - [trial, '[^_.]+']
      - name: procLevel
        pattern: 'T0-raw|T1-proc|T2-trait|raw|proc|trait'
        required: false
    default:
      procLevel: raw
"#;

pub fn default_template_decl() -> Result<TemplateDecl, SchemaError> {
    serde_yaml::from_str(DEFAULT_TEMPLATE_YAML).map_err(|e| SchemaError::Malformed {
        message: e.to_string(),
    })
}

pub fn default_template() -> Result<TemplateSpec, SchemaError> {
    TemplateSpec::from_decl(default_template_decl()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_is_valid() {
        let t = default_template().unwrap();
        assert!(t.extensions().contains_key("*"));
        assert_eq!(t.layout().structure().len(), 5);
        assert_eq!(
            t.extensions()["*"].matched_field_paths(),
            vec!["date", "time", "site", "sensor", "trial", "procLevel"]
        );
    }
}
