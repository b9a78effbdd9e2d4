// Result table writer.

use matchup_core::MatchupResult;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: [&str; 4] = [
    "Team1",
    "Team2",
    "Team1_Win_Percentage",
    "Team2_Win_Percentage",
];

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Write results as CSV to any writer. The header is always written, even
/// for an empty sweep.
pub fn write_results_to<W: Write>(writer: W, results: &[MatchupResult]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write results to `path`. The table is written to a sibling temp file and
/// renamed into place, so the destination either holds the complete table or
/// is left untouched.
pub fn write_results(path: &Path, results: &[MatchupResult]) -> Result<(), OutputError> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".partial");
    let tmp_path = path.with_file_name(tmp_name);

    let file = std::fs::File::create(&tmp_path).map_err(io_err)?;
    if let Err(source) = write_results_to(file, results) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(OutputError::Csv {
            path: path.to_path_buf(),
            source,
        });
    }

    std::fs::rename(&tmp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        io_err(source)
    })
}
