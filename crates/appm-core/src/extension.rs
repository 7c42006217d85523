use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::compile::{CompiledPattern, compile_components};
use crate::decl::ExtensionDecl;
use crate::error::{Error, SchemaError};
use crate::field::{FieldSpec, RESERVED_REST, ensure_first_required};

/// Field path -> captured value, as produced by a single extension.
///
/// Every flattened path of the extension is present, plus `rest`. Optional
/// fields that did not occur in the name map to `None`.
pub type RawMatch = BTreeMap<String, Option<String>>;

/// The naming contract for one file-extension family.
#[derive(Debug, Clone)]
pub struct ExtensionSpec {
    separator: String,
    components: Vec<FieldSpec>,
    defaults: BTreeMap<String, String>,
    compiled: CompiledPattern,
}

impl ExtensionSpec {
    pub fn from_decl(decl: &ExtensionDecl) -> Result<ExtensionSpec, SchemaError> {
        if decl.components.is_empty() {
            return Err(SchemaError::EmptyComponents {
                field: "<extension>".to_string(),
            });
        }

        let mut defaults = BTreeMap::new();
        let components = decl
            .components
            .iter()
            .map(|c| FieldSpec::from_decl(c, None, &mut defaults))
            .collect::<Result<Vec<_>, _>>()?;
        ensure_first_required(&components)?;

        // Extension-level defaults win over per-field ones.
        defaults.extend(decl.default.iter().map(|(k, v)| (k.clone(), v.clone())));

        let compiled = compile_components(&components, &decl.sep)?;

        Ok(ExtensionSpec {
            separator: decl.sep.clone(),
            components,
            defaults,
            compiled,
        })
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn components(&self) -> &[FieldSpec] {
        &self.components
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// The anchored pattern matched against whole file names.
    pub fn pattern(&self) -> &str {
        &self.compiled.pattern
    }

    /// Flattened field paths in capture-group order, without `rest`.
    pub fn matched_field_paths(&self) -> Vec<&str> {
        self.compiled.slots.iter().map(|s| s.path.as_str()).collect()
    }

    /// Every key a match of this extension can provide: flattened paths,
    /// `rest`, and keys that only have a default.
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields: BTreeSet<String> = self
            .compiled
            .slots
            .iter()
            .map(|s| s.path.clone())
            .collect();
        fields.insert(RESERVED_REST.to_string());
        fields.extend(self.defaults.keys().cloned());
        fields
    }

    /// Whether `path` names a field that may be absent from a matching name.
    pub fn is_optional(&self, path: &str) -> bool {
        self.compiled
            .slots
            .iter()
            .any(|s| s.optional && s.path == path)
    }

    /// Matches `name` against the whole-name pattern.
    pub fn match_name(&self, name: &str) -> Result<RawMatch, Error> {
        let caps = self
            .compiled
            .regex
            .captures(name)
            .ok_or_else(|| Error::FileFormatMismatch {
                name: name.to_string(),
                pattern: self.compiled.pattern.clone(),
            })?;

        let mut out: RawMatch = self
            .compiled
            .slots
            .iter()
            .map(|slot| {
                let value = caps.get(slot.group).map(|m| m.as_str().to_string());
                (slot.path.clone(), value)
            })
            .collect();
        out.insert(
            RESERVED_REST.to_string(),
            caps.get(self.compiled.rest_group)
                .map(|m| m.as_str().to_string()),
        );

        debug!(file = name, pattern = %self.compiled.pattern, "matched file name");
        Ok(out)
    }
}
