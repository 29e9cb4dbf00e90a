//! Writes finished exports into a directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use listview_export::{ExportFile, FileSaver};

#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where `file_name` ends up.
    pub fn target(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, file: &ExportFile) -> io::Result<()> {
        if Path::new(&file.file_name).components().count() != 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to write outside the output directory: {}", file.file_name),
            ));
        }
        fs::create_dir_all(&self.dir)?;
        let target = self.target(&file.file_name);
        fs::write(&target, &file.bytes)?;
        info!(
            path = %target.display(),
            bytes = file.bytes.len(),
            sha256 = %file.sha256,
            "export written"
        );
        Ok(())
    }
}
