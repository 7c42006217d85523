//! Projects on disk: a directory named after the project, a metadata file,
//! and data files placed according to the template layout.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::decl::TemplateDecl;
use crate::error::{Error, SchemaError};
use crate::loader::{TemplateSource, load_decl, parse_yaml_with};
use crate::matcher::{FieldValues, MatchEngine};
use crate::naming::ProjectMetadata;
use crate::template::TemplateSpec;

/// Name of the metadata file at the top of every project.
pub const METADATA_NAME: &str = "metadata.yaml";

/// Contents of [`METADATA_NAME`]: the template declaration plus the project
/// information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFile {
    #[serde(flatten)]
    pub template: TemplateDecl,
    pub meta: ProjectMetadata,
}

#[derive(Debug, Clone)]
pub struct Project {
    /// Project directory. Data files are placed below it.
    location: PathBuf,
    meta: ProjectMetadata,
    engine: MatchEngine,
}

impl Project {
    /// A project in `root/<project name>`, not yet written to disk.
    pub fn from_template(
        root: impl Into<PathBuf>,
        source: TemplateSource,
        meta: ProjectMetadata,
    ) -> Result<Project, Error> {
        let mut decl = load_decl(source)?;
        if decl.version.is_none() {
            decl.version = Some(env!("CARGO_PKG_VERSION").to_string());
        }
        let engine = MatchEngine::new(TemplateSpec::from_decl(decl)?);
        let location = root.into().join(engine.project_name(&meta));
        Ok(Project {
            location,
            meta,
            engine,
        })
    }

    /// Opens the project whose directory is `location`.
    ///
    /// The directory keeps its name even when it no longer matches the
    /// naming convention.
    pub fn load(location: impl AsRef<Path>) -> Result<Project, Error> {
        let location = location.as_ref();
        let path = location.join(METADATA_NAME);
        if !path.is_file() {
            return Err(Error::ProjectNotFound { path });
        }

        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let file: MetadataFile = parse_yaml_with(&text, &["meta"]).map_err(|e| match e {
            SchemaError::Malformed { message } => SchemaError::Malformed {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })?;

        let template = TemplateSpec::from_decl(file.template)?;

        Ok(Project {
            location: location.to_path_buf(),
            meta: file.meta,
            engine: MatchEngine::new(template),
        })
    }


    pub fn meta(&self) -> &ProjectMetadata {
        &self.meta
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn template(&self) -> &TemplateSpec {
        self.engine.template()
    }

    pub fn name(&self) -> String {
        self.engine.project_name(&self.meta)
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn metadata_file(&self) -> MetadataFile {
        MetadataFile {
            template: self.template().decl().clone(),
            meta: self.meta.clone(),
        }
    }

    /// Creates the project directory and writes its metadata file.
    ///
    /// Running it again on an existing project rewrites the metadata.
    pub fn init(&self) -> Result<PathBuf, Error> {
        let location = &self.location;
        fs::create_dir_all(location).map_err(|e| Error::io(location, e))?;

        let path = location.join(METADATA_NAME);
        let text =
            serde_yaml::to_string(&self.metadata_file()).map_err(|e| SchemaError::Malformed {
                message: e.to_string(),
            })?;
        fs::write(&path, text).map_err(|e| Error::io(&path, e))?;

        info!(project = %location.display(), "initialized project");
        Ok(location.clone())
    }

    pub fn match_name(&self, file_name: &str) -> Result<FieldValues, Error> {
        self.engine.match_name(file_name)
    }

    /// Destination directory of `file_name`, relative to the project.
    pub fn placement(&self, file_name: &str) -> Result<PathBuf, Error> {
        self.engine.placement_path(file_name)
    }

    /// Copies `src` into its placement directory and returns the new path.
    ///
    /// Existing files are never overwritten.
    pub fn copy_file(&self, src: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let src = src.as_ref();
        let file_name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::io(src, ErrorKind::InvalidInput.into()))?;

        let dir = self.location.join(self.placement(&file_name)?);
        let dest = dir.join(&file_name);

        let mut input = File::open(src).map_err(|e| Error::io(src, e))?;
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        let mut output = match OpenOptions::new().write(true).create_new(true).open(&dest) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::DestinationExists { path: dest });
            }
            Err(e) => return Err(Error::io(&dest, e)),
        };
        io::copy(&mut input, &mut output).map_err(|e| Error::io(&dest, e))?;

        info!(from = %src.display(), to = %dest.display(), "copied file");
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ProjectMetadata {
        ProjectMetadata {
            year: 2024,
            summary: "test project".into(),
            internal: true,
            researcher_name: Some("Hoang Son Le".into()),
            organisation_name: Some("APPN".into()),
        }
    }

    #[test]
    fn location_is_named_after_project() {
        let p = Project::from_template("/data", TemplateSource::Default, meta()).unwrap();
        assert_eq!(
            p.location(),
            PathBuf::from("/data/2024_test-project_internal_hoang-son-le_appn")
        );
        assert_eq!(p.template().version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn metadata_file_round_trips_through_yaml() {
        let p = Project::from_template("/data", TemplateSource::Default, meta()).unwrap();
        let text = serde_yaml::to_string(&p.metadata_file()).unwrap();
        let back: MetadataFile = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, p.metadata_file());
    }
}
