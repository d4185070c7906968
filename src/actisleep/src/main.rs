#[macro_use]
extern crate log;

use std::fs::File;
use std::path::PathBuf;

use actisleep::{RowWriter, load_sun_table, run_batch, write_minutes};
use actisleep_algos::{
    Analysis, Criteria, DEFAULT_THRESHOLD, DaylightSchedule, FixedSchedule, LightSchedule,
};
use actisleep_codec::AwcRecord;
use anyhow::Context;
use chrono::NaiveTime;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Actigraphy sleep variable analysis")]
pub struct ActisleepCli {
    /// Cole-Kripke weighted-sum threshold
    #[arg(long, env, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,
    /// Sleep transition criteria, n of d minutes
    #[arg(long, env, default_value_t = Criteria::default())]
    pub sleep_criteria: Criteria,
    /// Wake transition criteria, n of d minutes
    #[arg(long, env, default_value_t = Criteria::default())]
    pub wake_criteria: Criteria,
    /// Keep leading/trailing off-wrist zero runs instead of trimming them
    #[arg(long, env)]
    pub no_trim: bool,
    #[clap(subcommand)]
    pub subcommand: ActisleepCommand,
}

#[derive(Subcommand)]
pub enum ActisleepCommand {
    ///
    /// Batch-analyze a directory of .awc recordings into nightly variables
    ///
    Analyze {
        /// Directory holding the .awc recordings
        input_dir: PathBuf,
        /// Output file for the variable rows
        output: PathBuf,
        /// Lights-on clock time
        #[arg(long, env, default_value = "07:00", value_parser = parse_clock)]
        lights_on: NaiveTime,
        /// Lights-off clock time
        #[arg(long, env, default_value = "19:00", value_parser = parse_clock)]
        lights_off: NaiveTime,
        /// date,sunrise,sunset table enabling the daylight-adjusted schedule
        #[arg(long, env)]
        sun_table: Option<PathBuf>,
        /// Retain flagged rows with their flag text instead of dropping them
        #[arg(long)]
        keep_flagged: bool,
        /// Tab-delimited output instead of commas
        #[arg(long)]
        tab: bool,
        /// Clock times, H:MM periods and percentages instead of raw values
        #[arg(long)]
        readable: bool,
    },
    ///
    /// Dump one recording's per-minute activity, state and transitions
    ///
    Score {
        /// The .awc recording to score
        input: PathBuf,
        /// Output file for the per-minute dump
        output: PathBuf,
        /// Tab-delimited output instead of commas
        #[arg(long)]
        tab: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = ActisleepCli::parse();
    let mut analysis = Analysis {
        threshold: cli.threshold,
        sleep_criteria: cli.sleep_criteria,
        wake_criteria: cli.wake_criteria,
        ..Analysis::default()
    };

    match cli.subcommand {
        ActisleepCommand::Analyze {
            input_dir,
            output,
            lights_on,
            lights_off,
            sun_table,
            keep_flagged,
            tab,
            readable,
        } => {
            analysis.options.keep_flagged = keep_flagged;

            let fixed = FixedSchedule::new(lights_on, lights_off);
            let schedule: Box<dyn LightSchedule> = match sun_table {
                Some(path) => Box::new(DaylightSchedule::new(fixed, load_sun_table(&path)?)),
                None => Box::new(fixed),
            };

            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            let mut writer = RowWriter::new(file, delimiter(tab), readable);

            let summary = run_batch(
                &input_dir,
                &analysis,
                schedule.as_ref(),
                !cli.no_trim,
                &mut writer,
            )?;
            writer.flush()?;

            info!(
                "{} files analyzed, {} failed, {} rows written",
                summary.files, summary.failed, summary.rows
            );
            Ok(())
        }
        ActisleepCommand::Score { input, output, tab } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut record = AwcRecord::parse(&text).context("decoding AWC record")?;
            if !cli.no_trim {
                record.trim_zero_runs();
            }
            let series = analysis.prepare(record);

            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            write_minutes(file, delimiter(tab), &series)?;

            info!("{} minutes written", series.len());
            Ok(())
        }
    }
}

fn delimiter(tab: bool) -> u8 {
    if tab { b'\t' } else { b',' }
}

fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid clock time `{s}`, expected HH:MM"))
}
