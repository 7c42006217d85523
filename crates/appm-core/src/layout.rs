use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::decl::LayoutDecl;
use crate::error::{Error, SchemaError};

/// Field value -> directory name translation tables, keyed by field.
pub type LayoutMapping = BTreeMap<String, BTreeMap<String, String>>;

/// Ordered fields that make up the directory path of a file, with optional
/// value remapping per field (e.g. `raw` -> `T0-raw`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSpec {
    structure: Vec<String>,
    mapping: LayoutMapping,
}

impl LayoutSpec {
    pub fn new(structure: Vec<String>, mapping: LayoutMapping) -> Result<LayoutSpec, SchemaError> {
        if let Some(key) = mapping.keys().find(|k| !structure.contains(*k)) {
            return Err(SchemaError::MappingKeyNotInStructure { key: key.clone() });
        }
        Ok(LayoutSpec { structure, mapping })
    }

    pub fn from_decl(decl: &LayoutDecl) -> Result<LayoutSpec, SchemaError> {
        match decl {
            LayoutDecl::Structure(structure) => {
                LayoutSpec::new(structure.clone(), LayoutMapping::new())
            }
            LayoutDecl::Mapped(mapped) => {
                LayoutSpec::new(mapped.structure.clone(), mapped.mapping.clone())
            }
        }
    }

    pub fn structure(&self) -> &[String] {
        &self.structure
    }

    pub fn mapping(&self) -> &LayoutMapping {
        &self.mapping
    }

    /// Directory name for `raw`, the value of `field`.
    pub fn display_value<'a>(&'a self, field: &str, raw: &'a str) -> &'a str {
        self.mapping
            .get(field)
            .and_then(|table| table.get(raw))
            .map(String::as_str)
            .unwrap_or(raw)
    }

    /// Path segments for a set of matched field values, in structure order.
    pub fn resolve(&self, matched: &BTreeMap<String, String>) -> Result<Vec<String>, Error> {
        self.structure
            .iter()
            .map(|field| {
                let raw = matched.get(field).ok_or_else(|| Error::MissingLayoutField {
                    field: field.clone(),
                })?;
                let segment = self.display_value(field, raw);
                if !is_plain_segment(segment) {
                    return Err(Error::InvalidPlacementSegment {
                        field: field.clone(),
                        value: segment.to_string(),
                    });
                }
                Ok(segment.to_string())
            })
            .collect()
    }

    /// Same as [`LayoutSpec::resolve`], joined into a relative path.
    pub fn resolve_path(&self, matched: &BTreeMap<String, String>) -> Result<PathBuf, Error> {
        Ok(self.resolve(matched)?.iter().collect())
    }
}

/// A single, non-empty directory name that stays where it is put.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_level_layout() -> LayoutSpec {
        let mut mapping = LayoutMapping::new();
        mapping.insert(
            "procLevel".into(),
            [("raw", "T0-raw"), ("proc", "T1-proc"), ("trait", "T2-trait")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        LayoutSpec::new(
            ["site", "sensor", "date", "trial", "procLevel"]
                .into_iter()
                .map(String::from)
                .collect(),
            mapping,
        )
        .unwrap()
    }

    fn matched(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolves_with_mapping() {
        let layout = proc_level_layout();
        let m = matched(&[
            ("site", "adelaide"),
            ("sensor", "oak"),
            ("date", "20201010"),
            ("trial", "trial-alpha"),
            ("procLevel", "proc"),
        ]);
        assert_eq!(
            layout.resolve(&m).unwrap(),
            vec!["adelaide", "oak", "20201010", "trial-alpha", "T1-proc"]
        );
        assert_eq!(
            layout.resolve_path(&m).unwrap(),
            PathBuf::from("adelaide/oak/20201010/trial-alpha/T1-proc")
        );
    }

    #[test]
    fn unmapped_values_pass_through() {
        let layout = proc_level_layout();
        assert_eq!(layout.display_value("procLevel", "T0-raw"), "T0-raw");
        assert_eq!(layout.display_value("site", "raw"), "raw");
    }

    #[test]
    fn missing_value_is_reported() {
        let layout = proc_level_layout();
        let m = matched(&[("site", "adelaide")]);
        assert!(matches!(
            layout.resolve(&m),
            Err(Error::MissingLayoutField { field }) if field == "sensor"
        ));
    }

    #[test]
    fn rejects_segments_that_escape_or_collapse() {
        let layout = LayoutSpec::new(
            vec!["site".into(), "sensor".into(), "trial".into()],
            LayoutMapping::new(),
        )
        .unwrap();

        for bad in ["..", ".", "", "a/b", "a\\b"] {
            let m = matched(&[("site", "adelaide"), ("sensor", bad), ("trial", "alpha")]);
            assert!(
                matches!(
                    layout.resolve(&m),
                    Err(Error::InvalidPlacementSegment { ref field, ref value })
                        if field == "sensor" && value == bad
                ),
                "{bad:?}"
            );
        }

        let m = matched(&[("site", "adelaide"), ("sensor", "..oak"), ("trial", "alpha.bin")]);
        assert_eq!(layout.resolve(&m).unwrap(), vec!["adelaide", "..oak", "alpha.bin"]);
    }

    #[test]
    fn mapped_value_is_checked_too() {
        let mut mapping = LayoutMapping::new();
        mapping.insert("site".into(), BTreeMap::from([("up".to_string(), "..".to_string())]));
        let layout = LayoutSpec::new(vec!["site".into()], mapping).unwrap();
        assert!(matches!(
            layout.resolve(&matched(&[("site", "up")])),
            Err(Error::InvalidPlacementSegment { .. })
        ));
    }

    #[test]
    fn mapping_keys_must_be_in_structure() {
        let mut mapping = LayoutMapping::new();
        mapping.insert("site".into(), BTreeMap::new());
        let err = LayoutSpec::new(vec!["location".into()], mapping).unwrap_err();
        assert!(
            err.to_string()
                .contains("Mapping keys must be a subset of structure")
        );

        let mut mapping = LayoutMapping::new();
        mapping.insert("site".into(), BTreeMap::new());
        assert!(LayoutSpec::new(vec![], mapping).is_err());
    }
}
