//! Archive assembly: target workflow → project files → zip container.

pub mod workflow;

use std::io::{Seek, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::target::TargetWorkflow;

/// Top-level directory of every file in the project archive.
pub const ROOT_DIR: &str = "Workflow";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One file in the project, path relative to the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub path: String,
    pub content: String,
}

/// The complete project: descriptor first, then one settings file per node
/// in id order.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    pub files: Vec<ArchiveFile>,
}

impl Archive {
    pub fn file(&self, path: &str) -> Option<&ArchiveFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Write all files as a deflated zip.
    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> Result<W, ArchiveError> {
        let mut zip = ZipWriter::new(writer);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for file in &self.files {
            zip.start_file(file.path.as_str(), options)?;
            zip.write_all(file.content.as_bytes())?;
        }
        Ok(zip.finish()?)
    }

    /// Zip into an in-memory buffer.
    pub fn to_zip_bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        let cursor = self.write_zip(std::io::Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }
}

/// Serialize the descriptor and every node's settings into archive files.
pub fn assemble(target: &TargetWorkflow) -> Archive {
    let mut files = Vec::with_capacity(target.nodes.len() + 1);
    files.push(ArchiveFile {
        path: format!("{ROOT_DIR}/workflow.knime"),
        content: workflow::descriptor(target).to_document(),
    });
    for node in &target.nodes {
        files.push(ArchiveFile {
            path: format!("{ROOT_DIR}/{}", node.settings_path()),
            content: node.settings.to_document(),
        });
    }
    Archive { files }
}
