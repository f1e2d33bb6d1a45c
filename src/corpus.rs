use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// One source page, named after its file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Walk `root` for `.htm*` files, minus the `skip` names, sorted by path.
pub fn discover(root: &Path, skip: &[String]) -> Result<Vec<DocumentRef>> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut docs = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() || !is_html(entry.path()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if skip.iter().any(|s| *s == file_name) {
            debug!("skipping {}", entry.path().display());
            continue;
        }

        let Some(stem) = entry.path().file_stem() else {
            continue;
        };
        docs.push(DocumentRef {
            name: stem.to_string_lossy().into_owned(),
            path: entry.path().to_path_buf(),
        });
    }

    docs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(docs)
}

/// Read a whole document as UTF-8.
pub fn read(doc: &DocumentRef) -> Result<String, DocumentError> {
    let bytes = fs::read(&doc.path).map_err(|source| DocumentError::Read {
        path: doc.path.clone(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|source| DocumentError::Decode {
        path: doc.path.clone(),
        source,
    })
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.to_ascii_lowercase().starts_with("htm"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    const CORPUS: &str = "tests/fixtures/corpus";

    fn names(docs: &[DocumentRef]) -> Vec<&str> {
        docs.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn discovers_sorted_html_minus_skip_list() {
        let docs = discover(Path::new(CORPUS), &Settings::default().skip).unwrap();
        assert_eq!(names(&docs), vec!["Ainu", "Bathari", "Broken", "Empty"]);
        assert!(docs[1].path.ends_with("Bathari.html"));
        assert!(docs[2].path.ends_with("more/Broken.htm"));
    }

    #[test]
    fn without_skip_list() {
        let docs = discover(Path::new(CORPUS), &[]).unwrap();
        assert!(names(&docs).contains(&"How-to-view-EN"));
        assert!(!names(&docs).contains(&"notes"));
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(discover(Path::new("tests/fixtures/nowhere"), &[]).is_err());
    }

    #[test]
    fn reads_documents() {
        let doc = DocumentRef {
            name: "Ainu".to_string(),
            path: PathBuf::from(CORPUS).join("Ainu.htm"),
        };
        assert!(read(&doc).unwrap().contains("MsoTableGrid"));
    }

    #[test]
    fn unreadable_documents() {
        let broken = DocumentRef {
            name: "Broken".to_string(),
            path: PathBuf::from(CORPUS).join("more/Broken.htm"),
        };
        assert!(matches!(read(&broken), Err(DocumentError::Decode { .. })));

        let missing = DocumentRef {
            name: "Gone".to_string(),
            path: PathBuf::from(CORPUS).join("Gone.htm"),
        };
        let err = read(&missing).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(err.to_string().contains("Gone.htm"));
    }
}
