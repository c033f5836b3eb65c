//! Bonus command - pro-rated Christmas, Easter and summer bonuses

use super::display::render;
use super::{print_json, read_request, RatesArgs};
use chrono::NaiveDate;
use clap::Args;
use grtax::money::format_eur;
use grtax::request::{BonusSelection, HolidayBonusRequest};
use grtax::tax::bonus::compute_bonus_until;
use grtax::tax::input::Amount;
use grtax::tax::{compute_all_bonuses, AnnualBonusReport, BonusResult};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::Tabled;

#[derive(Args, Debug)]
pub struct BonusCommand {
    /// JSON request file (or - for stdin); replaces the flags below
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Gross monthly salary
    #[arg(short, long)]
    salary: Option<Decimal>,

    /// Employment start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Employment end date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Bonus type: christmas, easter or summer
    #[arg(short = 't', long = "type")]
    bonus_type: Option<String>,

    /// Calculate all three bonuses for the year
    #[arg(long, conflicts_with = "bonus_type")]
    all: bool,

    /// Apply the tax-residence transfer incentive
    #[arg(long)]
    residence_transfer: bool,

    #[command(flatten)]
    rates: RatesArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct BonusRow {
    #[tabled(rename = "Bonus")]
    bonus: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Full")]
    full: String,
    #[tabled(rename = "Gross")]
    gross: String,
    #[tabled(rename = "Tax")]
    tax: String,
    #[tabled(rename = "Net")]
    net: String,
}

impl From<&BonusResult> for BonusRow {
    fn from(result: &BonusResult) -> Self {
        BonusRow {
            bonus: result.period.bonus_type.to_string(),
            period: format!(
                "{} - {}",
                result.period.period_start.format("%d %b"),
                result.period.period_end.format("%d %b")
            ),
            days: format!("{}/{}", result.days_worked, result.period.total_days),
            full: format_eur(result.full_amount),
            gross: format_eur(result.gross_amount),
            tax: format_eur(result.tax),
            net: format_eur(result.net_amount),
        }
    }
}

impl BonusCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        let request = match &self.request {
            Some(path) => read_request(path)?,
            None => self.request_from_flags(),
        };
        let input = request.to_input(rates.year.0)?;

        match input.selection {
            BonusSelection::One(bonus_type) => {
                let result = compute_bonus_until(
                    input.monthly_salary,
                    input.employment_start,
                    input.employment_end,
                    bonus_type,
                    input.payment_year,
                    input.tax_residence_transfer,
                    &rates.bonus,
                )?;
                if self.json {
                    return print_json(&result);
                }
                println!();
                println!("{} BONUS {}", bonus_type.display().to_uppercase(), input.payment_year);
                println!("{}", render([BonusRow::from(&result)]));
                println!(
                    "Withholding @ {:.1}%",
                    result.tax_rate * Decimal::ONE_HUNDRED
                );
            }
            BonusSelection::All => {
                let report = compute_all_bonuses(
                    input.monthly_salary,
                    input.employment_start,
                    input.employment_end,
                    input.payment_year,
                    input.tax_residence_transfer,
                    &rates.bonus,
                )?;
                if self.json {
                    return print_json(&report);
                }
                print_report(&report);
            }
        }
        Ok(())
    }

    fn request_from_flags(&self) -> HolidayBonusRequest {
        let bonus_type = if self.all {
            Some("all".to_string())
        } else {
            self.bonus_type.clone()
        };
        HolidayBonusRequest {
            monthly_salary: self.salary.map(Amount),
            start_date: self.start.map(|d| d.to_string()),
            end_date: self.end.map(|d| d.to_string()),
            bonus_type,
            payment_year: None,
            tax_residence_transfer: self.residence_transfer,
        }
    }
}

fn print_report(report: &AnnualBonusReport) {
    println!();
    match report.employment_end {
        Some(end) => println!(
            "HOLIDAY BONUSES {} (employed {} to {})",
            report.payment_year, report.employment_start, end
        ),
        None => println!(
            "HOLIDAY BONUSES {} (employed since {})",
            report.payment_year, report.employment_start
        ),
    }
    let rows: Vec<BonusRow> = report.bonuses.iter().map(BonusRow::from).collect();
    println!("{}", render(rows));
    println!(
        "Total: Gross {} | Tax {} | Net {}",
        format_eur(report.totals.gross),
        format_eur(report.totals.tax),
        format_eur(report.totals.net)
    );
}
