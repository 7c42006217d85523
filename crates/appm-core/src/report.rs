use std::collections::BTreeMap;

use crate::walk::WalkOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Placed,
    Unsupported,
    Mismatched,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Placed => "placed",
            Status::Unsupported => "unsupported",
            Status::Mismatched => "mismatched",
        }
    }
}

fn canon_key(s: &str) -> String {
    let mut t = s.trim().replace('\\', "/");
    while let Some(rest) = t.strip_prefix("./") {
        t = rest.to_string();
    }
    t.trim_start_matches('/').to_string()
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: &'static str, // "unsupported_extension" or "format_mismatch"
    pub path: String,       // normalized relative path with '/'
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Report {
    // Key: normalized relative path string ("a/b.bin", ...)
    statuses: BTreeMap<String, Status>,
    placements: BTreeMap<String, Vec<String>>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn from_walk_output(walk: &WalkOutput) -> Report {
        let mut report = Report::default();

        for f in &walk.placed {
            let key = canon_key(f.path.to_string_lossy().as_ref());
            report.set_status(&key, Status::Placed);
            report.placements.insert(key, f.placement.clone());
        }
        for f in &walk.unsupported {
            let key = canon_key(f.path.to_string_lossy().as_ref());
            report.set_status(&key, Status::Unsupported);
            report.push_diagnostic(Diagnostic {
                code: "unsupported_extension",
                path: key,
                message: f.message.clone(),
            });
        }
        for f in &walk.mismatched {
            let key = canon_key(f.path.to_string_lossy().as_ref());
            report.set_status(&key, Status::Mismatched);
            report.push_diagnostic(Diagnostic {
                code: "format_mismatch",
                path: key,
                message: f.message.clone(),
            });
        }

        report
    }

    pub fn set_status(&mut self, path: impl AsRef<str>, status: Status) {
        let k = canon_key(path.as_ref());
        self.statuses.insert(k, status);
    }

    pub fn status_of(&self, path: impl AsRef<str>) -> Option<Status> {
        let k = canon_key(path.as_ref());
        self.statuses.get(&k).copied()
    }

    pub fn placement_of(&self, path: impl AsRef<str>) -> Option<&[String]> {
        let k = canon_key(path.as_ref());
        self.placements.get(&k).map(Vec::as_slice)
    }

    pub fn push_diagnostic(&mut self, d: Diagnostic) {
        self.diagnostics.push(d);
    }

    pub fn is_placed(&self, path: &str) -> bool {
        self.status_of(path) == Some(Status::Placed)
    }

    pub fn is_rejected(&self, path: &str) -> bool {
        matches!(
            self.status_of(path),
            Some(Status::Unsupported | Status::Mismatched)
        )
    }

    /// Placed paths with their placement, sorted by path.
    pub fn placements(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.placements
            .iter()
            .map(|(p, segs)| (p.as_str(), segs.as_slice()))
    }

    pub fn rejected_paths(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .filter_map(|(p, s)| (*s != Status::Placed).then_some(p.as_str()))
            .collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
