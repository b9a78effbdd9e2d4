// Season statistics ingestion and normalization.
//
// Reads the two Sports-Reference school exports, joins them on School, and
// produces the team profiles the simulator consumes. Both exports carry a
// grouping row above the real header; `skip_rows` drops it.

use crate::config::DataPaths;
use matchup_core::TeamProfile;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Tempo, offense, and possession-control numbers from the advanced export.
/// Percentages are still on the source's 0-100 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedStats {
    pub school: String,
    pub pace: f64,
    pub ortg: f64,
    pub orb_pct: f64,
    pub tov_pct: f64,
}

/// Defense and schedule numbers from the ratings export.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolRating {
    pub school: String,
    pub drtg: f64,
    pub sos: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Advanced school stats row. Extra columns (W, L, FTr, 3PAr, ...) are
/// absorbed via `#[serde(flatten)]`; the export's own SOS column is ignored
/// in favor of the ratings file.
#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawAdvancedRow {
    School: String,
    Pace: f64,
    ORtg: f64,
    #[serde(rename = "ORB%")]
    ORB_pct: f64,
    #[serde(rename = "TOV%")]
    TOV_pct: f64,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

/// School ratings row. Its ORtg column duplicates the advanced export and is
/// ignored along with the rest of the extras.
#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawRatingRow {
    School: String,
    DRtg: f64,
    SOS: f64,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Drop the grouping rows that precede the header line.
fn skip_lines<R: Read>(rdr: R, count: usize) -> std::io::Result<BufReader<R>> {
    let mut reader = BufReader::new(rdr);
    let mut discard = String::new();
    for _ in 0..count {
        discard.clear();
        if reader.read_line(&mut discard)? == 0 {
            break;
        }
    }
    Ok(reader)
}

fn csv_reader<R: Read>(rdr: R, skip_rows: usize) -> Result<csv::Reader<BufReader<R>>, csv::Error> {
    let rdr = skip_lines(rdr, skip_rows)?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr))
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_advanced_from_reader<R: Read>(
    rdr: R,
    skip_rows: usize,
) -> Result<Vec<AdvancedStats>, csv::Error> {
    let mut reader = csv_reader(rdr, skip_rows)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawAdvancedRow>() {
        match result {
            Ok(raw) => {
                let school = raw.School.trim().to_string();
                if school.is_empty() {
                    continue;
                }
                if !all_finite(&[raw.Pace, raw.ORtg, raw.ORB_pct, raw.TOV_pct]) {
                    warn!("skipping '{}': non-finite advanced stat", school);
                    continue;
                }
                rows.push(AdvancedStats {
                    school,
                    pace: raw.Pace,
                    ortg: raw.ORtg,
                    orb_pct: raw.ORB_pct,
                    tov_pct: raw.TOV_pct,
                });
            }
            Err(e) => {
                warn!("skipping malformed advanced stats row: {}", e);
            }
        }
    }
    Ok(rows)
}

fn load_ratings_from_reader<R: Read>(
    rdr: R,
    skip_rows: usize,
) -> Result<Vec<SchoolRating>, csv::Error> {
    let mut reader = csv_reader(rdr, skip_rows)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawRatingRow>() {
        match result {
            Ok(raw) => {
                let school = raw.School.trim().to_string();
                if school.is_empty() {
                    continue;
                }
                if !all_finite(&[raw.DRtg, raw.SOS]) {
                    warn!("skipping '{}': non-finite rating", school);
                    continue;
                }
                rows.push(SchoolRating {
                    school,
                    drtg: raw.DRtg,
                    sos: raw.SOS,
                });
            }
            Err(e) => {
                warn!("skipping malformed ratings row: {}", e);
            }
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Join and normalization
// ---------------------------------------------------------------------------

/// Convert a source percentage (15.6) to a fraction (0.156).
pub fn normalize_pct(value: f64) -> f64 {
    value / 100.0
}

/// Inner-join advanced stats with ratings on School, keeping the advanced
/// export's row order, and normalize percentages to fractions.
pub fn join_profiles(advanced: &[AdvancedStats], ratings: &[SchoolRating]) -> Vec<TeamProfile> {
    let mut by_school: HashMap<&str, &SchoolRating> = HashMap::new();
    for rating in ratings {
        if by_school.insert(rating.school.as_str(), rating).is_some() {
            warn!("duplicate ratings entry for '{}', using latest value", rating.school);
        }
    }

    let mut profiles = Vec::with_capacity(advanced.len());
    for adv in advanced {
        let Some(rating) = by_school.get(adv.school.as_str()) else {
            warn!("dropping '{}': no ratings entry", adv.school);
            continue;
        };
        profiles.push(TeamProfile::new(
            adv.school.clone(),
            adv.pace,
            adv.ortg,
            rating.drtg,
            rating.sos,
            normalize_pct(adv.orb_pct),
            normalize_pct(adv.tov_pct),
        ));
    }
    profiles
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, StatsError> {
    std::fs::File::open(path).map_err(|e| StatsError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the advanced school stats export.
pub fn load_advanced_stats(path: &Path, skip_rows: usize) -> Result<Vec<AdvancedStats>, StatsError> {
    load_advanced_from_reader(open(path)?, skip_rows).map_err(|e| StatsError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the school ratings export.
pub fn load_ratings(path: &Path, skip_rows: usize) -> Result<Vec<SchoolRating>, StatsError> {
    load_ratings_from_reader(open(path)?, skip_rows).map_err(|e| StatsError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load both exports and return the joined, normalized team profiles.
pub fn load_team_profiles(paths: &DataPaths) -> Result<Vec<TeamProfile>, StatsError> {
    let advanced = load_advanced_stats(Path::new(&paths.adv_stats), paths.skip_rows)?;
    let ratings = load_ratings(Path::new(&paths.ratings), paths.skip_rows)?;
    info!(
        "Read {} advanced rows and {} ratings rows",
        advanced.len(),
        ratings.len()
    );

    let profiles = join_profiles(&advanced, &ratings);
    if profiles.is_empty() {
        return Err(StatsError::Validation(
            "advanced stats and ratings share no schools".into(),
        ));
    }
    Ok(profiles)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Advanced stats --

    #[test]
    fn advanced_csv_with_grouping_row() {
        let csv_data = "\
,,Overall,,School Advanced
Rk,School,G,W,L,Pace,ORtg,FTr,3PAr,TS%,TRB%,AST%,STL%,BLK%,eFG%,TOV%,ORB%,FT/FGA
1,Houston,37,32,5,63.4,118.2,0.341,0.402,0.545,54.1,53.2,13.9,12.8,0.507,14.1,38.3,0.241
2,Iowa State,37,29,8,67.8,112.3,0.355,0.347,0.548,50.5,57.5,14.2,9.8,0.519,15.8,32.1,0.252";

        let rows = load_advanced_from_reader(csv_data.as_bytes(), 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].school, "Houston");
        assert!((rows[0].pace - 63.4).abs() < f64::EPSILON);
        assert!((rows[0].ortg - 118.2).abs() < f64::EPSILON);
        assert!((rows[0].orb_pct - 38.3).abs() < f64::EPSILON);
        assert!((rows[0].tov_pct - 14.1).abs() < f64::EPSILON);
        assert_eq!(rows[1].school, "Iowa State");
    }

    #[test]
    fn advanced_csv_without_grouping_row() {
        let csv_data = "\
School,Pace,ORtg,ORB%,TOV%
Kansas,69.4,113.7,29.1,15.5";

        let rows = load_advanced_from_reader(csv_data.as_bytes(), 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].school, "Kansas");
    }

    #[test]
    fn repeated_header_and_blank_rows_skipped() {
        let csv_data = "\
School,Pace,ORtg,ORB%,TOV%
Kansas,69.4,113.7,29.1,15.5
School,Pace,ORtg,ORB%,TOV%
,,,,
Baylor,66.1,121.0,35.8,15.2";

        let rows = load_advanced_from_reader(csv_data.as_bytes(), 0).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.school.as_str()).collect();
        assert_eq!(names, vec!["Kansas", "Baylor"]);
    }

    #[test]
    fn advanced_nan_pace_skipped() {
        let csv_data = "\
School,Pace,ORtg,ORB%,TOV%
Kansas,69.4,113.7,29.1,15.5
Ghost,NaN,100.0,30.0,15.0";

        let rows = load_advanced_from_reader(csv_data.as_bytes(), 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].school, "Kansas");
    }

    #[test]
    fn school_names_trimmed() {
        let csv_data = "\
School,Pace,ORtg,ORB%,TOV%
  Kansas  ,69.4,113.7,29.1,15.5";

        let rows = load_advanced_from_reader(csv_data.as_bytes(), 0).unwrap();
        assert_eq!(rows[0].school, "Kansas");
    }

    #[test]
    fn empty_csv_returns_empty_vec() {
        let csv_data = "School,Pace,ORtg,ORB%,TOV%";
        let rows = load_advanced_from_reader(csv_data.as_bytes(), 0).unwrap();
        assert!(rows.is_empty());
    }

    // -- Ratings --

    #[test]
    fn ratings_csv_with_grouping_row() {
        let csv_data = "\
,,,,,,SRS,,Adjusted
Rk,School,Conf,W,L,MOV,ORtg,DRtg,NRtg,SOS
1,Houston,Big 12,32,5,15.3,118.2,87.1,31.1,9.5
2,Oklahoma,Big 12,20,12,6.1,111.8,98.0,13.8,-1.5";

        let rows = load_ratings_from_reader(csv_data.as_bytes(), 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].school, "Houston");
        assert!((rows[0].drtg - 87.1).abs() < f64::EPSILON);
        assert!((rows[0].sos - 9.5).abs() < f64::EPSILON);
        assert!((rows[1].sos + 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_ratings_rows_skipped() {
        let csv_data = "\
School,DRtg,SOS
Houston,87.1,9.5
Broken,not_a_number,1.0
Kansas,93.9,10.1";

        let rows = load_ratings_from_reader(csv_data.as_bytes(), 0).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.school.as_str()).collect();
        assert_eq!(names, vec!["Houston", "Kansas"]);
    }

    // -- Join --

    fn adv(school: &str) -> AdvancedStats {
        AdvancedStats {
            school: school.into(),
            pace: 68.0,
            ortg: 110.0,
            orb_pct: 30.0,
            tov_pct: 15.6,
        }
    }

    fn rating(school: &str, drtg: f64) -> SchoolRating {
        SchoolRating {
            school: school.into(),
            drtg,
            sos: 5.0,
        }
    }

    #[test]
    fn join_normalizes_percentages() {
        let profiles = join_profiles(&[adv("Duke")], &[rating("Duke", 92.0)]);
        assert_eq!(profiles.len(), 1);
        assert!((profiles[0].orb_pct - 0.30).abs() < 1e-12);
        assert!((profiles[0].tov_pct - 0.156).abs() < 1e-12);
        assert!((profiles[0].drtg - 92.0).abs() < f64::EPSILON);
        assert!((profiles[0].sos - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn join_keeps_advanced_order_and_drops_unmatched() {
        let advanced = [adv("Duke"), adv("Nowhere State"), adv("UNC")];
        let ratings = [rating("UNC", 95.0), rating("Duke", 92.0)];

        let profiles = join_profiles(&advanced, &ratings);
        let names: Vec<&str> = profiles.iter().map(|p| p.school.as_str()).collect();
        assert_eq!(names, vec!["Duke", "UNC"]);
    }

    #[test]
    fn join_duplicate_rating_uses_latest() {
        let ratings = [rating("Duke", 92.0), rating("Duke", 99.0)];
        let profiles = join_profiles(&[adv("Duke")], &ratings);
        assert!((profiles[0].drtg - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn joined_profiles_pass_strict_validation() {
        let profiles = join_profiles(&[adv("Duke")], &[rating("Duke", 92.0)]);
        assert!(profiles[0].validate(true).is_ok());
    }
}
