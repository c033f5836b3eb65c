//! Batch command - income tax for every row of a CSV file

use super::{open_input, print_json, RatesArgs};
use clap::Args;
use grtax::batch::{calculate_rows, summarize, write_csv};
use grtax::money::format_eur;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BatchCommand {
    /// CSV file of salaries (or - for stdin); see `grtax schema csv-fields`
    #[arg(short, long)]
    input: PathBuf,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    rates: RatesArgs,

    /// Output rows and totals as JSON instead of CSV
    #[arg(long)]
    json: bool,
}

#[derive(serde::Serialize)]
struct BatchOutput<'a> {
    tax_year: String,
    summary: grtax::batch::BatchSummary,
    rows: &'a [grtax::batch::BatchRow],
}

impl BatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        let rows = calculate_rows(open_input(&self.input)?, &rates)?;
        let summary = summarize(&rows);

        if self.json {
            return print_json(&BatchOutput {
                tax_year: rates.year.display(),
                summary,
                rows: &rows,
            });
        }

        match &self.output {
            Some(path) => {
                write_csv(&rows, File::create(path)?)?;
                println!(
                    "Wrote {} rows to {}: Gross {} | Tax {} | Net {}",
                    summary.rows,
                    path.display(),
                    format_eur(summary.total_gross),
                    format_eur(summary.total_tax),
                    format_eur(summary.total_net)
                );
            }
            None => write_csv(&rows, io::stdout())?,
        }
        Ok(())
    }
}
