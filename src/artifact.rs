use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Serialize `value` as JSON and overwrite `path` with it.
///
/// Pretty output uses a two-space indent.
pub fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };

    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON artifact written by [`write_json`].
///
/// A missing file is reported as [`Error::NotFound`] with the given `kind`.
pub fn read_json<T: DeserializeOwned>(
    path: &Path,
    kind: &'static str,
) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound {
            kind,
            name: path.display().to_string(),
        },
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}
