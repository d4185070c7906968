use std::path::Path;

use actisleep_algos::SunTable;
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};

/// Loads a `date,sunrise,sunset` table (header line expected, ISO dates,
/// `HH:MM` times) into a [`SunTable`].
pub fn load_sun_table(path: &Path) -> anyhow::Result<SunTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening sun table {}", path.display()))?;

    let mut table = SunTable::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("sun table row {}", line + 2))?;
        let row = parse_row(&record).with_context(|| format!("sun table row {}", line + 2))?;
        table.insert(row.0, row.1, row.2);
    }

    if table.is_empty() {
        warn!("sun table {} has no rows", path.display());
    }
    Ok(table)
}

fn parse_row(record: &csv::StringRecord) -> anyhow::Result<(NaiveDate, NaiveTime, NaiveTime)> {
    let field = |i: usize, name: &str| {
        record
            .get(i)
            .map(str::trim)
            .with_context(|| format!("missing {name} column"))
    };

    let date: NaiveDate = field(0, "date")?.parse().context("invalid date")?;
    let sunrise = NaiveTime::parse_from_str(field(1, "sunrise")?, "%H:%M")
        .context("invalid sunrise time")?;
    let sunset = NaiveTime::parse_from_str(field(2, "sunset")?, "%H:%M")
        .context("invalid sunset time")?;
    Ok((date, sunrise, sunset))
}
