//! Gross-from-net command - the salary needed for a desired monthly net

use super::income::print_result;
use super::{print_json, read_request, RatesArgs};
use clap::Args;
use grtax::money::format_eur;
use grtax::request::GrossFromNetRequest;
use grtax::tax::input::Amount;
use grtax::tax::{solve_gross_from_net, DependentCount, EmploymentCategory};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GrossFromNetCommand {
    /// JSON request file (or - for stdin); replaces the flags below
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Desired net pay per payment
    #[arg(short, long)]
    net: Option<Decimal>,

    /// Salary payments per year
    #[arg(short, long, default_value_t = 14)]
    payments: u32,

    /// Dependent children (0, 1, 2, 3, 4+ or an exact count)
    #[arg(short, long, default_value = "0")]
    children: DependentCount,

    /// Taxpayer age, for youth relief
    #[arg(short, long)]
    age: Option<u32>,

    /// Income category
    #[arg(long, default_value = "employed")]
    category: EmploymentCategory,

    /// Apply the tax-residence transfer incentive
    #[arg(long)]
    residence_transfer: bool,

    /// Accepted difference from the desired net
    #[arg(long)]
    tolerance: Option<Decimal>,

    /// Maximum bisection steps
    #[arg(long)]
    max_iterations: Option<u32>,

    #[command(flatten)]
    rates: RatesArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl GrossFromNetCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        let request = match &self.request {
            Some(path) => read_request(path)?,
            None => GrossFromNetRequest {
                desired_monthly_net: self.net.map(Amount),
                children: self.children,
                age: self.age.map(|a| Amount(Decimal::from(a))),
                annual_salaries: Some(Amount(Decimal::from(self.payments))),
                tax_residence_transfer: self.residence_transfer,
                category: Some(self.category.to_string()),
                tolerance: self.tolerance.map(Amount),
                max_iterations: self.max_iterations.map(|n| Amount(Decimal::from(n))),
            },
        };
        let (desired, template, config) = request.to_input()?;
        let solved = solve_gross_from_net(desired, &template, &rates, &config);

        if self.json {
            return print_json(&solved);
        }

        println!();
        println!(
            "Net {} per payment needs gross {} per payment ({} per year)",
            format_eur(desired),
            format_eur(solved.result.breakdown.monthly_gross),
            format_eur(solved.result.gross_salary)
        );
        if solved.converged {
            println!("Converged after {} iterations", solved.iterations);
        } else {
            println!(
                "Did not converge within {} iterations, showing the closest estimate",
                solved.iterations
            );
        }
        print_result(&solved.result, &rates);
        Ok(())
    }
}
