//! Usage dataset IO: CSV read/write by column name, plus a seeded synthetic generator.

use crate::error::TrainingError;
use crate::features::UsageRecord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::{Read, Write};
use std::path::Path;

pub const USAGE_COLUMNS: [&str; 6] = [
    "instagram",
    "youtube",
    "whatsapp",
    "study",
    "night_usage",
    "red_days",
];

/// Read usage rows from CSV. Columns are matched by header name; extras are ignored.
pub fn read_usage_csv(path: &Path) -> Result<Vec<UsageRecord>, TrainingError> {
    let file = std::fs::File::open(path)?;
    read_usage_csv_from(file)
}

pub fn read_usage_csv_from<R: Read>(reader: R) -> Result<Vec<UsageRecord>, TrainingError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut positions = [0usize; USAGE_COLUMNS.len()];
    for (slot, name) in positions.iter_mut().zip(USAGE_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(TrainingError::MissingColumn(name))?;
    }

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let mut values = [0u32; USAGE_COLUMNS.len()];
        for ((value, &pos), column) in values.iter_mut().zip(&positions).zip(USAGE_COLUMNS) {
            let cell = row.get(pos).unwrap_or("");
            *value = cell.parse().map_err(|_| TrainingError::InvalidValue {
                row: idx + 1,
                column,
                value: cell.to_string(),
            })?;
        }
        let [instagram, youtube, whatsapp, study, night_usage, red_days] = values;
        records.push(UsageRecord {
            instagram,
            youtube,
            whatsapp,
            study,
            night_usage,
            red_days,
        });
    }

    if records.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    Ok(records)
}

pub fn write_usage_csv(path: &Path, records: &[UsageRecord]) -> Result<(), TrainingError> {
    let file = std::fs::File::create(path)?;
    write_usage_csv_to(file, records)
}

pub fn write_usage_csv_to<W: Write>(writer: W, records: &[UsageRecord]) -> Result<(), TrainingError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(USAGE_COLUMNS)?;
    for r in records {
        writer.write_record([
            r.instagram.to_string(),
            r.youtube.to_string(),
            r.whatsapp.to_string(),
            r.study.to_string(),
            r.night_usage.to_string(),
            r.red_days.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Seeded mix of light, moderate, and heavy users so every risk class is represented.
pub fn synthetic_records(n: usize, seed: u64) -> Vec<UsageRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| match rng.gen_range(0..3) {
            0 => UsageRecord {
                instagram: rng.gen_range(0..=30),
                youtube: rng.gen_range(0..=30),
                whatsapp: rng.gen_range(0..=20),
                study: rng.gen_range(60..=240),
                night_usage: rng.gen_range(0..=30),
                red_days: rng.gen_range(0..=1),
            },
            1 => UsageRecord {
                instagram: rng.gen_range(10..=60),
                youtube: rng.gen_range(10..=60),
                whatsapp: rng.gen_range(5..=40),
                study: rng.gen_range(30..=120),
                night_usage: rng.gen_range(10..=90),
                red_days: rng.gen_range(0..=3),
            },
            _ => UsageRecord {
                instagram: rng.gen_range(40..=180),
                youtube: rng.gen_range(40..=180),
                whatsapp: rng.gen_range(20..=90),
                study: rng.gen_range(0..=60),
                night_usage: rng.gen_range(30..=240),
                red_days: rng.gen_range(1..=7),
            },
        })
        .collect()
}
