//! Input discovery
//!
//! Expands files and directories into messages, choosing the reader by
//! file extension.

use crate::error::{ExtractError, Result};
use crate::types::MailMessage;
use crate::{eml, gmail};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Gmail API `users.messages.get` JSON
    GmailJson,
    /// RFC 5322 message file
    Eml,
}

impl InputFormat {
    /// Format implied by a file extension
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::GmailJson)
        } else if ext.eq_ignore_ascii_case("eml") {
            Some(Self::Eml)
        } else {
            None
        }
    }
}

/// Expand inputs into message files: directories contribute their
/// supported files in sorted order, files are kept as given.
pub fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries = std::fs::read_dir(input)
                .map_err(|e| ExtractError::io(input, e))?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()
                .map_err(|e| ExtractError::io(input, e))?;
            entries.retain(|p| p.is_file() && InputFormat::detect(p).is_some());
            entries.sort();
            debug!(dir = %input.display(), files = entries.len(), "Expanded directory");
            files.extend(entries);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(ExtractError::io(
                input,
                std::io::Error::new(std::io::ErrorKind::NotFound, "input not found"),
            ));
        }
    }
    Ok(files)
}

/// Read one file into messages. Unsupported extensions and unreadable files
/// become a single error item so the batch can report them.
pub fn load_file(path: &Path) -> Vec<Result<MailMessage>> {
    match InputFormat::detect(path) {
        Some(InputFormat::GmailJson) => gmail::load_file(path).unwrap_or_else(|e| vec![Err(e)]),
        Some(InputFormat::Eml) => vec![eml::load_file(path)],
        None => vec![Err(ExtractError::Decode {
            message_id: path.display().to_string(),
            reason: "unsupported file extension".into(),
        })],
    }
}

/// Lazily load every message of every file, in order
pub fn load_messages(files: &[PathBuf]) -> impl Iterator<Item = Result<MailMessage>> + '_ {
    files.iter().flat_map(|path| load_file(path))
}
