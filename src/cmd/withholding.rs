//! Withholding command - monthly payroll deductions for a fixed salary

use super::display::{print_table, LineItem};
use super::{print_json, read_request, RatesArgs};
use clap::Args;
use grtax::request::WithholdingRequest;
use grtax::tax::input::Amount;
use grtax::tax::{calculate_withholding, DependentCount};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct WithholdingCommand {
    /// JSON request file (or - for stdin); replaces the flags below
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Gross monthly salary
    #[arg(short, long)]
    salary: Option<Decimal>,

    /// Employment type (full-time, part-time, pensioner, ...)
    #[arg(short, long, default_value = "full-time")]
    employment_type: String,

    /// Salary payments per year
    #[arg(short, long, default_value_t = 14)]
    payments: u32,

    /// Dependent children (0, 1, 2, 3, 4+ or an exact count)
    #[arg(short, long, default_value = "0")]
    children: DependentCount,

    /// Taxpayer age, for youth relief
    #[arg(short, long)]
    age: Option<u32>,

    /// Apply the tax-residence transfer incentive
    #[arg(long)]
    residence_transfer: bool,

    #[command(flatten)]
    rates: RatesArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl WithholdingCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        let request = match &self.request {
            Some(path) => read_request(path)?,
            None => WithholdingRequest {
                monthly_salary: self.salary.map(Amount),
                employment_type: Some(self.employment_type.clone()),
                children: self.children,
                tax_residence_transfer: self.residence_transfer,
                annual_salaries: Some(Amount(Decimal::from(self.payments))),
                age: self.age.map(|a| Amount(Decimal::from(a))),
            },
        };
        let (monthly_salary, template) = request.to_input()?;
        let result = calculate_withholding(monthly_salary, &template, &rates);

        if self.json {
            return print_json(&result);
        }

        print_table(
            &format!("WITHHOLDING {} ({} payments)", rates.year, template.payment_count()),
            [
                LineItem::eur("Monthly salary", result.monthly_salary),
                LineItem::eur("Insurance", result.monthly_insurance),
                LineItem::eur("Tax", result.monthly_tax),
                LineItem::eur("Net", result.monthly_net),
            ],
        );
        print_table(
            "ANNUAL",
            [
                LineItem::eur("Gross", result.annual_gross),
                LineItem::eur("Insurance", result.annual_insurance),
                LineItem::eur("Tax", result.annual_tax),
                LineItem::eur("Net", result.annual_net),
                LineItem::pct("Effective tax rate", result.effective_tax_rate),
            ],
        );
        println!(
            "Insurance {:.1}% | Tax {:.1}% | Net {:.1}%",
            result.insurance_percentage, result.tax_percentage, result.net_percentage
        );
        Ok(())
    }
}
