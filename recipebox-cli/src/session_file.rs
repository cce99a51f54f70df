//! The signed-in identity kept between CLI invocations.

use recipebox_core::Session;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const SESSION_FILE: &str = "session.yaml";

/// `session.yaml` in the data directory.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored session, or `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<Session>, SessionFileError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionFileError::Io(self.path.clone(), e)),
        };
        let session = serde_yaml::from_str(&contents)
            .map_err(|e| SessionFileError::Parse(self.path.clone(), e))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionFileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionFileError::Io(parent.to_path_buf(), e))?;
        }
        let contents = serde_yaml::to_string(session)
            .map_err(|e| SessionFileError::Parse(self.path.clone(), e))?;
        fs::write(&self.path, contents).map_err(|e| SessionFileError::Io(self.path.clone(), e))?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Deletes the file. Returns whether there was one.
    pub fn clear(&self) -> Result<bool, SessionFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionFileError::Io(self.path.clone(), e)),
        }
    }
}

#[derive(Debug)]
pub enum SessionFileError {
    Io(PathBuf, io::Error),
    Parse(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for SessionFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionFileError::Io(path, e) => {
                write!(f, "Failed to access session file '{}': {}", path.display(), e)
            }
            SessionFileError::Parse(path, e) => {
                write!(
                    f,
                    "Session file '{}' is corrupt ({}); run 'recipebox logout' and log in again",
                    path.display(),
                    e
                )
            }
        }
    }
}

impl std::error::Error for SessionFileError {}
