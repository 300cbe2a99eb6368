//! Metadata copy via the external `exiftool` program.
//!
//! Re-encoding drops EXIF, IPTC and XMP blocks. After the original variant is
//! written, `exiftool` copies every tag from the source file back onto it,
//! except `Orientation`: the pixels are already upright, and keeping the tag
//! would make viewers rotate them a second time.
//!
//! The tool is optional. When it cannot be found the step is skipped.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

const PROGRAM: &str = "exiftool";

#[derive(Error, Debug)]
pub enum ExifToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("exiftool failed on {path} ({status}): {stderr}")]
    Failed {
        path: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// A located `exiftool` executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    /// Use `configured` if given, otherwise search `PATH`.
    pub fn locate(configured: Option<&Path>) -> Option<Self> {
        if let Some(program) = configured {
            return Some(Self {
                program: program.to_path_buf(),
            });
        }
        let path_var = std::env::var_os("PATH")?;
        find_in_path(PROGRAM, &path_var).map(|program| Self { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, src: &Path, dst: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-overwrite_original_in_place")
            .arg("-tagsFromFile")
            .arg(src)
            .arg("-x")
            .arg("Orientation")
            .arg(dst);
        cmd
    }

    /// Copy all metadata except orientation from `src` onto `dst` in place.
    pub fn copy_metadata(&self, src: &Path, dst: &Path) -> Result<(), ExifToolError> {
        let output = self
            .command(src, dst)
            .output()
            .map_err(|source| ExifToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExifToolError::Failed {
                path: dst.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// First regular file named `name` in a `PATH`-style list of directories.
fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
