use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::error::CompilerError;

/// A source file loaded once into memory. The lexer borrows from it for the
/// lifetime of one parse.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
}

impl SourceFile {
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        if !path.exists() {
            return Err(CompilerError::FileNotFound(format!(
                "Source file not found: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).map_err(|e| CompilerError::io(path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded source");

        Ok(Self::from_bytes(path, bytes))
    }

    /// Builds a source from an in-memory buffer. Invalid UTF-8 sequences are
    /// replaced, the lexer rejects them anyway outside string constants.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };
        Self {
            path: path.into(),
            text,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// File name without extension, used to name output files.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("out"))
    }
}

/// Resolves the command-line path: a file is taken as is, a directory
/// yields every file in it with the given extension, sorted by name.
pub fn collect_sources(path: &Path, extension: &str) -> Result<Vec<PathBuf>, CompilerError> {
    if !path.exists() {
        return Err(CompilerError::FileNotFound(format!(
            "Input not found: {}",
            path.display()
        )));
    }

    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = fs::read_dir(path).map_err(|e| CompilerError::io(path, e))?;
    let mut found: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CompilerError::io(path, e))?;
        let candidate = entry.path();
        if candidate.is_file() && candidate.extension().and_then(|ext| ext.to_str()) == Some(extension) {
            found.push(candidate);
        }
    }

    if found.is_empty() {
        return Err(CompilerError::FileNotFound(format!(
            "No .{} files found in: {}",
            extension,
            path.display()
        )));
    }

    found.sort();
    debug!(dir = %path.display(), count = found.len(), "collected sources");
    Ok(found)
}
