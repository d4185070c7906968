use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use actisleep_algos::{Analysis, DateVariableRow, LightSchedule};
use actisleep_codec::AwcRecord;
use anyhow::{Context, bail};
use indicatif::ProgressBar;

use crate::report::RowWriter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub failed: usize,
    pub rows: usize,
}

/// Processes every `.awc` file in the directory into nightly variable rows,
/// in file-name order. A file that fails to decode is logged and counted;
/// the rest of the batch still runs.
pub fn run_batch<S, W>(
    input_dir: &Path,
    analysis: &Analysis,
    schedule: &S,
    trim: bool,
    writer: &mut RowWriter<W>,
) -> anyhow::Result<BatchSummary>
where
    S: LightSchedule + ?Sized,
    W: Write,
{
    let files = awc_files(input_dir)?;
    if files.is_empty() {
        bail!("no .awc files found in {}", input_dir.display());
    }

    let mut summary = BatchSummary {
        files: files.len(),
        ..BatchSummary::default()
    };

    let bar = ProgressBar::new(files.len() as u64);
    for path in &files {
        match process_file(path, analysis, schedule, trim) {
            Ok(rows) => {
                for row in &rows {
                    writer.write_row(row)?;
                }
                summary.rows += rows.len();
                info!("{}: {} rows", path.display(), rows.len());
            }
            Err(error) => {
                summary.failed += 1;
                error!("{}: {error:#}", path.display());
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(summary)
}

fn process_file<S>(
    path: &Path,
    analysis: &Analysis,
    schedule: &S,
    trim: bool,
) -> anyhow::Result<Vec<DateVariableRow>>
where
    S: LightSchedule + ?Sized,
{
    let input = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut record = AwcRecord::parse(&input).context("decoding AWC record")?;

    if trim {
        let outcome = record.trim_zero_runs();
        if outcome.leading > 0 || outcome.trailing > 0 {
            debug!(
                "{}: trimmed {} leading / {} trailing zero minutes",
                path.display(),
                outcome.leading,
                outcome.trailing
            );
        }
    }

    Ok(analysis.run(record, schedule))
}

fn awc_files(input_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(input_dir).with_context(|| format!("listing {}", input_dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.to_ascii_lowercase().ends_with(".awc"))
        })
        .collect();

    files.sort();
    Ok(files)
}
