use crate::args::OutputFormat;
use appm_core::{Error, FieldValues, Report, TemplateSpec};
use serde::Serialize;
use std::path::PathBuf;

/// Result of one file-level query, keyed by the name it was asked about.
pub struct Outcome<T> {
    pub name: String,
    pub result: Result<T, Error>,
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Serialize)]
struct JsonEntry<'a, T: Serialize> {
    name: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct JsonTemplate<'a> {
    ok: bool,
    version: Option<&'a str>,
    naming: Vec<&'a str>,
    layout: &'a [String],
    extensions: Vec<&'a str>,
}

#[derive(Serialize)]
struct JsonScan<'a> {
    ok: bool,
    placed: Vec<JsonPlaced<'a>>,
    rejected: Vec<&'a str>,
    diagnostics: Vec<JsonDiag<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonPlaced<'a> {
    path: &'a str,
    placement: &'a [String],
}

#[derive(Serialize)]
struct JsonDiag<'a> {
    code: &'a str,
    path: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonSummary {
    placed_count: usize,
    rejected_count: usize,
}

fn to_json<T: Serialize>(value: &T) -> String {
    // Only plain strings and maps go through here.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{\"ok\":false}".to_string())
}

fn render_outcomes<T: Serialize>(
    outcomes: &[Outcome<T>],
    format: OutputFormat,
    quiet: bool,
    human: impl Fn(&str, &T) -> String,
) -> String {
    match format {
        OutputFormat::Json => {
            let entries: Vec<JsonEntry<'_, T>> = outcomes
                .iter()
                .map(|o| JsonEntry {
                    name: o.name.as_str(),
                    ok: o.is_ok(),
                    value: o.result.as_ref().ok(),
                    error: o.result.as_ref().err().map(ToString::to_string),
                })
                .collect();
            to_json(&entries)
        }
        OutputFormat::Human => {
            let mut out = String::new();
            for o in outcomes {
                match &o.result {
                    Ok(v) => out.push_str(&human(&o.name, v)),
                    Err(_) if quiet => out.push_str(&format!("{}\n", o.name)),
                    Err(e) => out.push_str(&format!("ERROR {}: {e}\n", o.name)),
                }
            }
            out
        }
    }
}

pub fn render_matches(
    outcomes: &[Outcome<FieldValues>],
    format: OutputFormat,
    quiet: bool,
) -> String {
    render_outcomes(outcomes, format, quiet, |name, fields| {
        let mut s = String::new();
        if !quiet {
            s.push_str(&format!("{name}\n"));
        }
        for (k, v) in fields {
            s.push_str(&format!("  {k} = {v}\n"));
        }
        s
    })
}

pub fn render_placements(
    outcomes: &[Outcome<Vec<String>>],
    format: OutputFormat,
    quiet: bool,
) -> String {
    render_outcomes(outcomes, format, quiet, |name, segments| {
        if quiet {
            format!("{}\n", segments.join("/"))
        } else {
            format!("{name} -> {}\n", segments.join("/"))
        }
    })
}

pub fn render_copies(outcomes: &[Outcome<PathBuf>], format: OutputFormat, quiet: bool) -> String {
    render_outcomes(outcomes, format, quiet, |name, dest| {
        if quiet {
            format!("{}\n", dest.display())
        } else {
            format!("copied {name} -> {}\n", dest.display())
        }
    })
}

pub fn render_template(
    template: &TemplateSpec,
    format: OutputFormat,
    verbosity: u8,
    quiet: bool,
) -> String {
    let naming: Vec<&str> = template
        .naming_convention()
        .structure()
        .iter()
        .map(|f| f.as_str())
        .collect();
    let extensions: Vec<&str> = template.extensions().keys().map(String::as_str).collect();

    match format {
        OutputFormat::Json => to_json(&JsonTemplate {
            ok: true,
            version: template.version(),
            naming,
            layout: template.layout().structure(),
            extensions,
        }),
        OutputFormat::Human => {
            if quiet {
                return String::new();
            }
            let mut out = String::from("OK: template is valid\n");
            if verbosity > 0 {
                let sep = template.naming_convention().separator();
                out.push_str(&format!("naming: {}\n", naming.join(sep)));
                out.push_str(&format!("layout: {}\n", template.layout().structure().join("/")));
                for (key, ext) in template.extensions() {
                    out.push_str(&format!("extension {key}: {}\n", ext.pattern()));
                }
            }
            out
        }
    }
}

pub fn render_text(label: &str, value: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&serde_json::json!({ label: value })),
        OutputFormat::Human => format!("{value}\n"),
    }
}

pub fn render_json_scan(report: &Report) -> String {
    let rejected = report.rejected_paths();
    let placed: Vec<JsonPlaced<'_>> = report
        .placements()
        .map(|(path, placement)| JsonPlaced { path, placement })
        .collect();

    let out = JsonScan {
        ok: report.is_ok(),
        summary: JsonSummary {
            placed_count: placed.len(),
            rejected_count: rejected.len(),
        },
        placed,
        rejected,
        diagnostics: report
            .diagnostics()
            .iter()
            .map(|d| JsonDiag {
                code: d.code,
                path: d.path.as_str(),
                message: d.message.as_str(),
            })
            .collect(),
    };

    to_json(&out)
}

pub fn render_human_scan(report: &Report, verbosity: u8, quiet: bool) -> String {
    let mut out = String::new();
    let rejected = report.rejected_paths();

    if quiet {
        for p in rejected {
            out.push_str(p);
            out.push('\n');
        }
        return out;
    }

    if verbosity > 0 {
        for (path, placement) in report.placements() {
            out.push_str(&format!("placed: {path} -> {}\n", placement.join("/")));
        }
    }

    if report.is_ok() {
        out.push_str("OK: every file matches the template\n");
    }
    for d in report.diagnostics() {
        out.push_str(&format!("ERROR {}: {}: {}\n", d.code, d.path, d.message));
    }

    if verbosity > 0 {
        out.push_str(&format!(
            "summary: placed={} rejected={}\n",
            report.placements().count(),
            rejected.len()
        ));
    }

    out
}

pub fn render_scan(report: &Report, format: OutputFormat, verbosity: u8, quiet: bool) -> String {
    match format {
        OutputFormat::Human => render_human_scan(report, verbosity, quiet),
        OutputFormat::Json => render_json_scan(report),
    }
}
