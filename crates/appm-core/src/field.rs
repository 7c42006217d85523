//! Field declarations: regex leaves and separator-joined groups.

use std::collections::BTreeMap;

use regex::Regex;

use crate::compile::{compose_sequence, ensure_unique};
use crate::decl::FieldDecl;
use crate::error::SchemaError;

/// Key under which everything after the last declared component is captured.
pub const RESERVED_REST: &str = "rest";

/// Joins a parent path and a child name into a flattened field path.
pub const PATH_SEPARATOR: &str = "__";

/// A single named component of a file name.
///
/// Groups may be anonymous. An anonymous group has no capture of its own and
/// its children are flattened into the enclosing scope without a prefix.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: Option<String>,
    required: bool,
    kind: FieldKind,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Leaf {
        pattern: String,
        /// Capturing groups written inside `pattern` itself.
        inner_groups: usize,
    },
    Group {
        separator: String,
        subfields: Vec<FieldSpec>,
    },
}

/// Position of one flattened field path among the capture groups of a
/// composed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Slot {
    pub path: String,
    pub group: usize,
    /// The field or one of its enclosing groups is optional.
    pub optional: bool,
}

impl FieldSpec {
    /// Builds a field from its declaration.
    ///
    /// `prefix` is the flattened path of the enclosing named group, if any.
    /// Per-field defaults are registered in `defaults` under the field's path.
    pub(crate) fn from_decl(
        decl: &FieldDecl,
        prefix: Option<&str>,
        defaults: &mut BTreeMap<String, String>,
    ) -> Result<FieldSpec, SchemaError> {
        let obj = decl.to_object();
        let label = obj
            .name
            .clone()
            .unwrap_or_else(|| "<anonymous group>".to_string());

        let path = join_path(prefix, obj.name.as_deref());

        if obj.name.as_deref() == Some(RESERVED_REST) {
            return Err(SchemaError::ReservedName {
                field: path.unwrap_or_else(|| RESERVED_REST.to_string()),
            });
        }
        let pattern = obj.pattern.filter(|p| !p.is_empty());

        let kind = match (pattern, obj.components) {
            (None, None) => {
                return Err(SchemaError::MissingPatternOrComponents { field: label });
            }
            (Some(_), Some(_)) => {
                return Err(SchemaError::PatternAndComponents { field: label });
            }
            (Some(pattern), None) => {
                if obj.name.is_none() {
                    return Err(SchemaError::AnonymousLeaf { pattern });
                }
                let compiled = Regex::new(&pattern).map_err(|source| {
                    SchemaError::InvalidPattern {
                        field: label.clone(),
                        source,
                    }
                })?;
                FieldKind::Leaf {
                    pattern,
                    inner_groups: compiled.captures_len() - 1,
                }
            }
            (None, Some(children)) => {
                let separator = obj
                    .sep
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| SchemaError::MissingSeparator {
                        field: label.clone(),
                    })?;
                if children.is_empty() {
                    return Err(SchemaError::EmptyComponents { field: label });
                }
                let subfields = children
                    .iter()
                    .map(|child| FieldSpec::from_decl(child, path.as_deref(), defaults))
                    .collect::<Result<Vec<_>, _>>()?;
                ensure_first_required(&subfields)?;

                let mut slots = Vec::new();
                let mut next = 1;
                for sub in &subfields {
                    sub.collect_slots(None, false, &mut next, &mut slots);
                }
                ensure_unique(slots.iter().map(|s| s.path.as_str()))?;

                FieldKind::Group {
                    separator,
                    subfields,
                }
            }
        };

        if let (Some(default), Some(path)) = (obj.default, path) {
            defaults.insert(path, default);
        }

        Ok(FieldSpec {
            name: obj.name,
            required: obj.required,
            kind,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in diagnostics.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous group>")
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn separator(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Group { separator, .. } => Some(separator),
            FieldKind::Leaf { .. } => None,
        }
    }

    pub fn subfields(&self) -> &[FieldSpec] {
        match &self.kind {
            FieldKind::Group { subfields, .. } => subfields,
            FieldKind::Leaf { .. } => &[],
        }
    }

    /// The regex this field contributes, without its own wrapping group.
    ///
    /// A leaf returns its pattern verbatim. A group joins its children with
    /// its separator, each child in its own group.
    pub fn effective_pattern(&self) -> String {
        match &self.kind {
            FieldKind::Leaf { pattern, .. } => pattern.clone(),
            FieldKind::Group {
                separator,
                subfields,
            } => compose_sequence(subfields, separator),
        }
    }

    /// The effective pattern inside this field's own group: capturing when
    /// named, non-capturing for anonymous groups.
    pub(crate) fn wrapped_pattern(&self) -> String {
        match self.name {
            Some(_) => format!("({})", self.effective_pattern()),
            None => format!("(?:{})", self.effective_pattern()),
        }
    }

    /// Flattened field paths, in capture-group order.
    pub fn matched_field_paths(&self) -> Vec<String> {
        let mut slots = Vec::new();
        let mut next = 1;
        self.collect_slots(None, false, &mut next, &mut slots);
        slots.into_iter().map(|s| s.path).collect()
    }

    /// Number of capture groups this field occupies once wrapped.
    pub fn group_count(&self) -> usize {
        let own = usize::from(self.name.is_some());
        let inner = match &self.kind {
            FieldKind::Leaf { inner_groups, .. } => *inner_groups,
            FieldKind::Group { subfields, .. } => {
                subfields.iter().map(FieldSpec::group_count).sum()
            }
        };
        own + inner
    }

    /// Assigns capture group indices to this field and its descendants,
    /// starting at `next`.
    pub(crate) fn collect_slots(
        &self,
        prefix: Option<&str>,
        optional: bool,
        next: &mut usize,
        out: &mut Vec<Slot>,
    ) {
        let optional = optional || !self.required;
        let path = join_path(prefix, self.name.as_deref());

        if let (Some(_), Some(path)) = (&self.name, &path) {
            out.push(Slot {
                path: path.clone(),
                group: *next,
                optional,
            });
            *next += 1;
        }

        match &self.kind {
            FieldKind::Leaf { inner_groups, .. } => *next += inner_groups,
            FieldKind::Group { subfields, .. } => {
                for sub in subfields {
                    sub.collect_slots(path.as_deref(), optional, next, out);
                }
            }
        }
    }
}

pub(crate) fn ensure_first_required(fields: &[FieldSpec]) -> Result<(), SchemaError> {
    match fields.first() {
        Some(first) if !first.required() => Err(SchemaError::FirstComponentOptional {
            field: first.label().to_string(),
        }),
        _ => Ok(()),
    }
}

fn join_path(prefix: Option<&str>, name: Option<&str>) -> Option<String> {
    match (prefix, name) {
        (Some(prefix), Some(name)) => Some(format!("{prefix}{PATH_SEPARATOR}{name}")),
        (None, Some(name)) => Some(name.to_string()),
        (prefix, None) => prefix.map(str::to_string),
    }
}
