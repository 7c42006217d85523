// Compilation module: composes a field tree into one anchored regex and records
// which capture group belongs to which flattened field path.

use std::collections::BTreeSet;

use regex::Regex;
use tracing::debug;

use crate::error::SchemaError;
use crate::field::{FieldSpec, RESERVED_REST, Slot};

/// An anchored whole-name matcher with its capture bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    pub pattern: String,
    pub regex: Regex,
    /// Flattened field path -> capture group index, in declaration order.
    pub slots: Vec<Slot>,
    /// Capture group index of the trailing `rest` capture.
    pub rest_group: usize,
}

/// Joins `fields` with `separator`, each field in its own group.
///
/// A non-first optional field vanishes together with its leading separator.
pub(crate) fn compose_sequence(fields: &[FieldSpec], separator: &str) -> String {
    let sep = regex::escape(separator);
    let mut pat = String::new();

    for (i, field) in fields.iter().enumerate() {
        let wrapped = field.wrapped_pattern();
        if i == 0 {
            pat.push_str(&wrapped);
        } else if field.required() {
            pat.push_str(&sep);
            pat.push_str(&wrapped);
        } else {
            pat.push_str("(?:");
            pat.push_str(&sep);
            pat.push_str(&wrapped);
            pat.push_str(")?");
        }
    }

    pat
}

/// Compile the top-level components of an extension into a `CompiledPattern`.
pub(crate) fn compile_components(
    components: &[FieldSpec],
    separator: &str,
) -> Result<CompiledPattern, SchemaError> {
    let pattern = format!("^{}(.*)$", compose_sequence(components, separator));

    let mut slots: Vec<Slot> = Vec::new();
    let mut capture_group = 1;
    for component in components {
        component.collect_slots(None, false, &mut capture_group, &mut slots);
    }
    let rest_group = capture_group;

    ensure_unique(slots.iter().map(|s| s.path.as_str()))?;

    let regex = Regex::new(&pattern).map_err(|source| SchemaError::InvalidPattern {
        field: "<extension>".into(),
        source,
    })?;

    // Group 0 is the whole match; `rest` is the last explicit group.
    let expected = rest_group + 1;
    if regex.captures_len() != expected {
        return Err(SchemaError::CaptureGroupMismatch {
            expected,
            actual: regex.captures_len(),
        });
    }

    debug!(pattern = %pattern, fields = slots.len(), "compiled extension pattern");

    Ok(CompiledPattern {
        pattern,
        regex,
        slots,
        rest_group,
    })
}

/// Flattened paths must be unique and must not shadow `rest`.
pub(crate) fn ensure_unique<'a>(
    paths: impl IntoIterator<Item = &'a str>,
) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for path in paths {
        if path == RESERVED_REST {
            return Err(SchemaError::ReservedName {
                field: path.to_string(),
            });
        }
        if !seen.insert(path) {
            return Err(SchemaError::DuplicateField {
                field: path.to_string(),
            });
        }
    }
    Ok(())
}
