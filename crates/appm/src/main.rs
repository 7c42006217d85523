mod args;
mod render;

use crate::args::{Cli, Command, MetaArgs};
use crate::render::Outcome;
use appm_core::{
    Error, MatchEngine, Project, ProjectMetadata, TemplateSource, check_dir, load_template,
};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity, cli.quiet);

    match run(&cli) {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

/// RUST_LOG wins; otherwise -v/-vv raise the level and -q silences warnings.
fn init_logging(verbosity: u8, quiet: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Runs the command and prints its output. `Ok(false)` means at least one
/// file failed; errors are fatal.
fn run(cli: &Cli) -> Result<bool, Error> {
    let source = || TemplateSource::from(cli.template.clone());
    tracing::debug!(command = ?cli.command, template = ?cli.template, "appm: start");

    let (out, ok) = match &cli.command {
        Command::Validate => {
            let template = load_template(source())?;
            let out = render::render_template(&template, cli.format, cli.verbosity, cli.quiet);
            (out, true)
        }
        Command::Match { names } => {
            let engine = MatchEngine::new(load_template(source())?);
            let outcomes = per_file(names, |n| engine.match_name(n))?;
            let ok = outcomes.iter().all(Outcome::is_ok);
            (render::render_matches(&outcomes, cli.format, cli.quiet), ok)
        }
        Command::Place { names } => {
            let engine = MatchEngine::new(load_template(source())?);
            let outcomes = per_file(names, |n| engine.placement(n))?;
            let ok = outcomes.iter().all(Outcome::is_ok);
            (render::render_placements(&outcomes, cli.format, cli.quiet), ok)
        }
        Command::Name(meta) => {
            let engine = MatchEngine::new(load_template(source())?);
            let name = engine.project_name(&metadata(meta));
            (render::render_text("name", &name, cli.format), true)
        }
        Command::Init { root, meta } => {
            let project = Project::from_template(root.clone(), source(), metadata(meta))?;
            let location = project.init()?;
            let location = location.display().to_string();
            (render::render_text("location", &location, cli.format), true)
        }
        Command::Scan { dir } => {
            let engine = MatchEngine::new(load_template(source())?);
            let report = check_dir(dir, &engine)?;
            let out = render::render_scan(&report, cli.format, cli.verbosity, cli.quiet);
            (out, report.is_ok())
        }
        Command::Copy { project, files } => {
            let project = Project::load(project)?;
            let outcomes: Vec<_> = files
                .iter()
                .map(|f| Outcome {
                    name: f.display().to_string(),
                    result: project.copy_file(f),
                })
                .collect();
            let ok = outcomes.iter().all(Outcome::is_ok);
            (render::render_copies(&outcomes, cli.format, cli.quiet), ok)
        }
    };

    if !out.is_empty() {
        print!("{out}");
        if !out.ends_with('\n') {
            println!();
        }
    }
    Ok(ok)
}

/// Applies `f` to every name. File-level failures are kept in the outcome;
/// anything else aborts.
fn per_file<T>(
    names: &[String],
    f: impl Fn(&str) -> Result<T, Error>,
) -> Result<Vec<Outcome<T>>, Error> {
    let mut outcomes = Vec::with_capacity(names.len());
    for name in names {
        let result = match f(name) {
            Err(e) if !e.is_per_file() => return Err(e),
            other => other,
        };
        outcomes.push(Outcome {
            name: name.clone(),
            result,
        });
    }
    Ok(outcomes)
}

fn metadata(args: &MetaArgs) -> ProjectMetadata {
    ProjectMetadata {
        year: args.year,
        summary: args.summary.clone(),
        internal: !args.external,
        researcher_name: args.researcher.clone(),
        organisation_name: args.organisation.clone(),
    }
}
