pub mod batch;
pub mod bonus;
pub mod display;
pub mod freelancer;
pub mod gift;
pub mod income;
pub mod net;
pub mod rates;
pub mod schema;
pub mod withholding;

use anyhow::Context;
use clap::Args;
use grtax::tax::{TaxRates, TaxYear};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Rate table selection shared by every calculation command.
#[derive(Args, Debug, Clone)]
pub struct RatesArgs {
    /// Tax year whose built-in rates to use
    #[arg(short, long, default_value_t = TaxYear::DEFAULT.0)]
    pub year: i32,

    /// JSON file with a custom rate set (see `grtax rates --json`)
    #[arg(long)]
    pub rates: Option<PathBuf>,
}

impl RatesArgs {
    pub fn load(&self) -> anyhow::Result<TaxRates> {
        match &self.rates {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open rates file {}", path.display()))?;
                Ok(TaxRates::read_json(BufReader::new(file))?)
            }
            None => Ok(TaxYear(self.year).rates()?),
        }
    }
}

/// Open a file for reading, or stdin with "-"
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin().lock().read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
        Ok(Box::new(io::Cursor::new(buffer)))
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read a JSON request record from a file (or stdin with "-")
pub fn read_request<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let reader = open_input(path)?;
    let request = serde_json::from_reader(reader)
        .with_context(|| format!("Invalid request in {}", path.display()))?;
    Ok(request)
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
