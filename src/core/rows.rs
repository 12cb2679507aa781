use crate::core::age::{derive_age, BirthdateError};
use crate::models::{Record, COLUMN_COUNT};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while turning select output into records
#[derive(Debug, Error)]
pub enum RowError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row} has {fields} fields, expected at least 8")]
    ShortRow { row: usize, fields: usize },

    #[error("Row {row} has an invalid birthdate {value:?}: {source}")]
    Birthdate {
        row: usize,
        value: String,
        #[source]
        source: BirthdateError,
    },
}

/// Parse headerless CSV rows into records
///
/// Columns are positional: name, image, height, birthdate, bust, cup, waist,
/// hip. Extra trailing fields are ignored. The first bad row aborts the whole
/// parse and no records are returned.
pub fn parse_records(data: &[u8], today: NaiveDate) -> Result<Vec<Record>, RowError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let number = index + 1;

        if row.len() < COLUMN_COUNT {
            return Err(RowError::ShortRow {
                row: number,
                fields: row.len(),
            });
        }

        let field = |i: usize| row.get(i).unwrap_or_default().to_string();
        let birthdate = row.get(3).unwrap_or_default();
        let age = derive_age(birthdate, today).map_err(|source| RowError::Birthdate {
            row: number,
            value: birthdate.to_string(),
            source,
        })?;

        records.push(Record {
            name: field(0),
            image: field(1),
            height: field(2),
            age,
            bust: field(4),
            cup: field(5),
            waist: field(6),
            hip: field(7),
        });
    }

    Ok(records)
}
