//! Confinement of request paths to the static root.
//!
//! Request paths are percent-decoded and then mapped component by component
//! onto the root directory. Anything that could climb out of the root is
//! rejected before the file system is touched.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("request path is not valid UTF-8 once decoded")]
    Encoding,

    #[error("request path `{0}` escapes the static root")]
    Escapes(String),
}

/// Decode `pathname` and join it onto `root`.
pub fn resolve_under_root(root: &Path, pathname: &str) -> Result<PathBuf, PathError> {
    let decoded = percent_decode_str(pathname)
        .decode_utf8()
        .map_err(|_| PathError::Encoding)?;

    let mut resolved = root.to_path_buf();
    for component in Path::new(&*decoded).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(PathError::Escapes(decoded.to_string()));
            }
        }
    }
    Ok(resolved)
}
