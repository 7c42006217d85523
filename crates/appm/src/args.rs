use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// appm: name, validate and place research data files using a project template.
#[derive(Debug, Parser)]
#[command(name = "appm", version)]
#[command(about = "Match data file names against a project template", long_about = None)]
pub struct Cli {
    /// Template file (YAML, or JSON with a .json extension). Uses the built-in template if omitted.
    #[arg(short = 't', long, global = true, env = "APPM_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Quiet output (print only results, no headers or summaries)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the template is valid
    Validate,

    /// Print the field values parsed from each file name
    Match {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the directory each file name belongs in
    Place {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the project name built from the given metadata
    Name(MetaArgs),

    /// Create a project directory and write its metadata file
    Init {
        /// Directory the project is created under
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Classify every file under DIR
    Scan { dir: PathBuf },

    /// Copy files into their place inside an existing project
    Copy {
        /// Project directory (the one holding metadata.yaml)
        #[arg(long)]
        project: PathBuf,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct MetaArgs {
    #[arg(long)]
    pub year: i32,

    #[arg(long)]
    pub summary: String,

    /// Mark the project as external (default: internal)
    #[arg(long)]
    pub external: bool,

    #[arg(long)]
    pub researcher: Option<String>,

    #[arg(long)]
    pub organisation: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}
