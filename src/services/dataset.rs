//! Offline dataset artifacts: the raw labeled dataset, the interim merged
//! table and the processed feature CSV.

use crate::core::pipeline::FeatureTable;
use crate::error::{MatchError, Result};
use crate::models::{BulkMatchRequest, FeatureVector, PairRow, RawExample, FEATURE_NAMES, LABEL_NAME};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Parse JSON records given either as one array or one object per line
pub fn parse_records<T: serde::de::DeserializeOwned>(contents: &str) -> Result<Vec<T>> {
    if contents.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(contents)?);
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| MatchError::Dataset(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}

/// Load the raw `{talent, job, label}` dataset
pub fn load_raw<P: AsRef<Path>>(path: P) -> Result<Vec<RawExample>> {
    let path = path.as_ref();
    let examples: Vec<RawExample> = parse_records(&fs::read_to_string(path)?)?;
    tracing::info!("Loaded {} raw examples from {}", examples.len(), path.display());
    Ok(examples)
}

/// Draw `n` talents and, independently, `n` jobs from the raw examples.
///
/// A fixed `seed` makes the draw reproducible.
pub fn sample_bulk_request(examples: &[RawExample], n: usize, seed: Option<u64>) -> Result<BulkMatchRequest> {
    if n == 0 || n > examples.len() {
        return Err(MatchError::Dataset(format!(
            "cannot sample {} records from {} examples",
            n,
            examples.len()
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let talents = examples.choose_multiple(&mut rng, n).map(|e| e.talent.clone()).collect();
    let jobs = examples.choose_multiple(&mut rng, n).map(|e| e.job.clone()).collect();

    Ok(BulkMatchRequest { talents, jobs })
}

/// Write merged rows, one JSON object per line
pub fn write_interim<P: AsRef<Path>>(rows: &[PairRow], path: P) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} interim rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_interim<P: AsRef<Path>>(path: P) -> Result<Vec<PairRow>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line)
            .map_err(|e| MatchError::Dataset(format!("interim line {}: {}", i + 1, e)))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write the feature table as CSV: the feature columns, then `label` when present
pub fn write_processed<P: AsRef<Path>>(table: &FeatureTable, path: P) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    let mut header: Vec<&str> = FEATURE_NAMES.to_vec();
    if table.labels.is_some() {
        header.push(LABEL_NAME);
    }
    writeln!(writer, "{}", header.join(","))?;

    for (i, features) in table.features.iter().enumerate() {
        let mut fields: Vec<String> = features.to_array().iter().map(|v| v.to_string()).collect();
        if let Some(labels) = &table.labels {
            fields.push(labels[i].to_string());
        }
        writeln!(writer, "{}", fields.join(","))?;
    }
    writer.flush()?;

    tracing::info!(
        "Wrote {} processed rows with columns {:?} to {}",
        table.len(),
        header,
        path.display()
    );
    Ok(())
}

/// Read a processed CSV back into a feature table
pub fn read_processed<P: AsRef<Path>>(path: P) -> Result<FeatureTable> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| MatchError::Dataset(format!("{} is empty", path.display())))?;
    let columns: Vec<&str> = header.trim().split(',').collect();
    if columns.len() < FeatureVector::LEN || columns[..FeatureVector::LEN] != FEATURE_NAMES {
        return Err(MatchError::Dataset(format!("unexpected header: {}", header)));
    }
    let labeled = match &columns[FeatureVector::LEN..] {
        [] => false,
        [label] if *label == LABEL_NAME => true,
        _ => return Err(MatchError::Dataset(format!("unexpected header: {}", header))),
    };

    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = i + 2;
        let fields: Vec<&str> = line.trim().split(',').collect();
        let values = fields
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|e| {
                    MatchError::Dataset(format!("row {}: '{}' is not a number: {}", row, field, e))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.len() != columns.len() {
            return Err(MatchError::Dataset(format!(
                "row {} has {} fields, header has {}",
                row,
                values.len(),
                columns.len()
            )));
        }

        let mut array = [0.0; FeatureVector::LEN];
        array.copy_from_slice(&values[..FeatureVector::LEN]);
        let vector = FeatureVector::try_from_array(array)
            .map_err(|e| MatchError::Dataset(format!("row {}: {}", row, e)))?;
        features.push(vector);
        if labeled {
            labels.push(match values[FeatureVector::LEN] {
                v if v == 0.0 => 0,
                v if v == 1.0 => 1,
                _ => return Err(MatchError::InvalidLabel(fields[FeatureVector::LEN].to_string())),
            });
        }
    }

    tracing::info!("Loaded {} processed rows from {}", features.len(), path.display());
    Ok(FeatureTable {
        features,
        labels: labeled.then_some(labels),
    })
}
