//! URL to file mapping and page persistence

use crate::url::strip_query;
use crate::OutputError;
use std::fs;
use std::path::{Path, PathBuf};

/// Maps a site URL to a file path relative to the destination
///
/// The query string and fragment are dropped. A path ending in `/` maps to
/// `index.html` inside that directory, any other path gets `.html`
/// appended. Empty, `.` and `..` segments are discarded so the result never
/// leaves the destination.
///
/// # Examples
///
/// ```
/// use site_freezer::output::output_path_for;
/// use std::path::PathBuf;
///
/// assert_eq!(output_path_for("/"), PathBuf::from("index.html"));
/// assert_eq!(output_path_for("/hello"), PathBuf::from("hello.html"));
/// assert_eq!(output_path_for("/foo/bar/"), PathBuf::from("foo/bar/index.html"));
/// assert_eq!(output_path_for("/search?q=x"), PathBuf::from("search.html"));
/// ```
pub fn output_path_for(url: &str) -> PathBuf {
    let path = strip_query(url);
    let mut segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();

    let mut out = PathBuf::new();
    let file = match segments.pop() {
        Some(last) if !path.ends_with('/') => format!("{}.html", last),
        Some(last) => {
            segments.push(last);
            "index.html".to_string()
        }
        None => "index.html".to_string(),
    };

    for segment in segments {
        out.push(segment);
    }
    out.push(file);
    out
}

/// Writes frozen pages below a destination directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the destination directory and its parents
    pub fn prepare(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Full path a URL is written to
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(output_path_for(url))
    }

    /// Writes `body` for `url`, replacing any previous file
    pub fn write(&self, url: &str, body: &[u8]) -> Result<PathBuf, OutputError> {
        let path = self.path_for(url);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| OutputError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, body).map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}
