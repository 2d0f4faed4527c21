use crate::parser::{parse_cdd, CddParseError, ParsedCdd};
use std::path::Path;

/// Errors that can occur reading a CDD file.
#[derive(Debug, thiserror::Error)]
pub enum CddReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CDD parse error in '{file}': {source}")]
    CddParse {
        file: String,
        source: CddParseError,
    },
}

/// Read and parse a CDD file from disk.
///
/// A leading UTF-8 byte order mark is skipped. Files that are not valid
/// UTF-8 are decoded lossily with a warning.
pub fn read_cdd_file(path: &Path) -> Result<ParsedCdd, CddReadError> {
    let bytes = std::fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!(
                "'{}' is not valid UTF-8, replacing invalid sequences",
                path.display()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    let xml = text.strip_prefix('\u{feff}').unwrap_or(&text);

    log::info!("Parsing CDD file: {}", path.display());
    parse_cdd(xml).map_err(|source| CddReadError::CddParse {
        file: path.display().to_string(),
        source,
    })
}
