//! Dataset loading and cleaning
//!
//! Turns a Spotify-style CSV into a numeric matrix ready for fitting:
//! 1. Derive the target year (`year` column, else parsed `release_date`)
//! 2. Keep canonical feature columns present in the file, in canonical order
//! 3. Drop rows without a target
//! 4. Impute missing feature cells with the column mean of the remaining rows
//! 5. Drop rows whose year falls outside [`YEAR_RANGE`]

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use myp_common::features::canonical_names;
use myp_common::YEAR_RANGE;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{TrainingError, TrainingResult};

/// Where the target year comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetColumn {
    Year(usize),
    ReleaseDate(usize),
}

/// Row counts observed while cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub missing_target: usize,
    pub out_of_range: usize,
    pub imputed_cells: usize,
}

/// Cleaned training data
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Selected columns, canonical order; becomes the feature-name list
    pub feature_names: Vec<String>,
    /// Canonical columns the file did not have
    pub dropped_features: Vec<String>,
    /// One row per sample, positions follow `feature_names`
    pub features: Vec<Vec<f64>>,
    pub years: Vec<f64>,
    pub stats: LoadStats,
}

/// Train/test partition of a [`Dataset`]
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train_x: Vec<Vec<f64>>,
    pub train_y: Vec<f64>,
    pub test_x: Vec<Vec<f64>>,
    pub test_y: Vec<f64>,
}

impl Dataset {
    /// Load and clean a CSV file
    pub fn from_path(path: &Path) -> TrainingResult<Self> {
        let file = File::open(path).map_err(|source| TrainingError::DatasetIo {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loading dataset from {}", path.display());
        Self::from_reader(file)
    }

    /// Load and clean CSV data with a header row
    pub fn from_reader<R: Read>(reader: R) -> TrainingResult<Self> {
        let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let target = match (column("year"), column("release_date")) {
            (Some(idx), _) => TargetColumn::Year(idx),
            (None, Some(idx)) => {
                debug!("No 'year' column, deriving target from 'release_date'");
                TargetColumn::ReleaseDate(idx)
            }
            (None, None) => return Err(TrainingError::MissingTarget),
        };

        let mut feature_names = Vec::new();
        let mut feature_columns = Vec::new();
        let mut dropped_features = Vec::new();
        for name in canonical_names() {
            match column(name) {
                Some(idx) => {
                    feature_names.push(name.to_string());
                    feature_columns.push(idx);
                }
                None => dropped_features.push(name.to_string()),
            }
        }
        if feature_names.is_empty() {
            return Err(TrainingError::NoFeatures);
        }
        if !dropped_features.is_empty() {
            warn!("Dataset lacks features {:?}; training without them", dropped_features);
        }

        let mut stats = LoadStats::default();
        let mut raw_rows: Vec<Vec<Option<f64>>> = Vec::new();
        let mut years = Vec::new();

        for record in csv.records() {
            let record = record?;
            stats.rows_read += 1;

            let year = match target {
                TargetColumn::Year(idx) => record.get(idx).and_then(parse_number),
                TargetColumn::ReleaseDate(idx) => record
                    .get(idx)
                    .and_then(parse_release_year)
                    .map(f64::from),
            };
            let Some(year) = year else {
                stats.missing_target += 1;
                continue;
            };

            raw_rows.push(
                feature_columns
                    .iter()
                    .map(|&idx| record.get(idx).and_then(parse_number))
                    .collect(),
            );
            years.push(year);
        }

        let means = column_means(&raw_rows, feature_names.len());
        for (name, mean) in feature_names.iter().zip(&means) {
            if mean.is_none() {
                warn!("Column '{}' has no numeric values; imputing 0.0", name);
            }
        }

        let min_year = f64::from(*YEAR_RANGE.start());
        let max_year = f64::from(*YEAR_RANGE.end());
        let mut features = Vec::with_capacity(raw_rows.len());
        let mut kept_years = Vec::with_capacity(years.len());

        for (row, year) in raw_rows.into_iter().zip(years) {
            let row: Vec<f64> = row
                .into_iter()
                .zip(&means)
                .map(|(cell, mean)| {
                    cell.unwrap_or_else(|| {
                        stats.imputed_cells += 1;
                        mean.unwrap_or(0.0)
                    })
                })
                .collect();

            if year < min_year || year > max_year {
                stats.out_of_range += 1;
                continue;
            }
            features.push(row);
            kept_years.push(year);
        }

        info!(
            "Read {} rows: {} without a year, {} outside {}-{}, {} cells imputed",
            stats.rows_read,
            stats.missing_target,
            stats.out_of_range,
            YEAR_RANGE.start(),
            YEAR_RANGE.end(),
            stats.imputed_cells
        );

        Ok(Self {
            feature_names,
            dropped_features,
            features,
            years: kept_years,
            stats,
        })
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Seeded shuffle followed by a holdout split
    ///
    /// The test partition gets `ceil(len * test_fraction)` rows, kept between
    /// 1 and `len - 1` so that both sides are non-empty.
    pub fn split(&self, test_fraction: f64, seed: u64) -> TrainingResult<Split> {
        let n = self.len();
        if n < 2 {
            return Err(TrainingError::InsufficientData(format!(
                "{} usable rows, need at least 2 to hold out a test set",
                n
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);
        let (test_idx, train_idx) = order.split_at(n_test);

        let take = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
            idx.iter()
                .map(|&i| (self.features[i].clone(), self.years[i]))
                .unzip()
        };
        let (train_x, train_y) = take(train_idx);
        let (test_x, test_y) = take(test_idx);

        Ok(Split { train_x, train_y, test_x, test_y })
    }
}

/// Mean of each column over its present values
fn column_means(rows: &[Vec<Option<f64>>], width: usize) -> Vec<Option<f64>> {
    let mut sums = vec![0.0; width];
    let mut counts = vec![0usize; width];
    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                sums[col] += value;
                counts[col] += 1;
            }
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect()
}

/// Finite float, or `None` for empty/unparseable cells
fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Year from `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, or a full timestamp
pub fn parse_release_year(cell: &str) -> Option<i32> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.year());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Some(datetime.year());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return Some(date.year());
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok();
    }
    None
}
