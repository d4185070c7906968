use std::io::{self, Write};

use actisleep_algos::helpers::format_hm::FormatHM;
use actisleep_algos::{ActivitySeries, DateVariableRow};

const READABLE_HEADER: [&str; 17] = [
    "id",
    "date",
    "light_start",
    "light_end",
    "sleep_start",
    "sleep_end",
    "SOL",
    "TWAK",
    "dark_period",
    "sleep_period",
    "TST",
    "dark_TST",
    "sleep_TST",
    "WASO",
    "SE",
    "NOC",
    "flag",
];

/// Writes nightly variable rows as delimited text. The default mode
/// serializes rows directly (ISO timestamps, plain minute counts, ratios);
/// readable mode renders clock times, H:MM periods and percentages.
pub struct RowWriter<W: Write> {
    writer: csv::Writer<W>,
    readable: bool,
    wrote_header: bool,
}

impl<W: Write> RowWriter<W> {
    pub fn new(writer: W, delimiter: u8, readable: bool) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        Self {
            writer,
            readable,
            wrote_header: false,
        }
    }

    pub fn write_row(&mut self, row: &DateVariableRow) -> csv::Result<()> {
        if self.readable {
            self.write_readable(row)
        } else {
            self.writer.serialize(row)
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_readable(&mut self, row: &DateVariableRow) -> csv::Result<()> {
        if !self.wrote_header {
            self.writer.write_record(READABLE_HEADER)?;
            self.wrote_header = true;
        }

        self.writer.write_record([
            row.id.clone(),
            row.date.to_string(),
            row.light_start.time().format_hm(),
            row.light_end.time().format_hm(),
            opt_hm(&row.sleep_start),
            opt_hm(&row.sleep_end),
            opt_num(&row.sol),
            opt_num(&row.twak),
            opt_hm(&row.dark_period),
            opt_hm(&row.sleep_period),
            opt_num(&row.tst),
            opt_num(&row.dark_tst),
            opt_num(&row.sleep_tst),
            opt_num(&row.waso),
            opt_percent(&row.se),
            opt_percent(&row.noc),
            row.flag.map(|f| f.to_string()).unwrap_or_default(),
        ])
    }
}

fn opt_hm<T: FormatHM>(value: &Option<T>) -> String {
    value.as_ref().map(FormatHM::format_hm).unwrap_or_default()
}

fn opt_num(value: &Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_percent(value: &Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        Some(_) => "inf".to_owned(),
        None => String::new(),
    }
}

/// Per-minute dump of one scored recording: the raw count, its state and
/// any transition mark, one line per minute.
pub fn write_minutes<W: Write>(
    writer: W,
    delimiter: u8,
    series: &ActivitySeries,
) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(["date", "time", "activity", "state", "transition"])?;
    for minute in 0..series.len() {
        let ts = series.time_of(minute);
        writer.write_record([
            ts.date().to_string(),
            ts.time().format_hm(),
            series.activity()[minute].to_string(),
            series
                .state_at(minute)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            series
                .transition_at(minute)
                .map(|t| t.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
