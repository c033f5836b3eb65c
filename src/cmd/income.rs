//! Income tax command - annual tax, contributions and net income

use super::display::{print_table, LineItem};
use super::{print_json, read_request, RatesArgs};
use clap::Args;
use grtax::request::IncomeTaxRequest;
use grtax::tax::input::Amount;
use grtax::tax::{calculate_income_tax, CalculationResult, DependentCount, EmploymentCategory, TaxRates};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct IncomeTaxCommand {
    /// JSON request file (or - for stdin); replaces the flags below
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Gross annual income
    #[arg(long)]
    yearly: Option<Decimal>,

    /// Gross salary per payment
    #[arg(short, long)]
    monthly: Option<Decimal>,

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

    #[command(flatten)]
    rates: RatesArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl IncomeTaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        let request = match &self.request {
            Some(path) => read_request(path)?,
            None => self.request_from_flags(),
        };
        let input = request.to_input()?;
        let result = calculate_income_tax(&input, &rates);

        if self.json {
            print_json(&result)
        } else {
            print_result(&result, &rates);
            Ok(())
        }
    }

    fn request_from_flags(&self) -> IncomeTaxRequest {
        IncomeTaxRequest {
            monthly_income: self.monthly.map(Amount),
            yearly_income: self.yearly.map(Amount),
            children: self.children,
            age: self.age.map(|a| Amount(Decimal::from(a))),
            tax_residence_transfer: self.residence_transfer,
            annual_salaries: Some(Amount(Decimal::from(self.payments))),
            category: Some(self.category.to_string()),
        }
    }
}

pub fn print_result(result: &CalculationResult, rates: &TaxRates) {
    let mut rows = vec![LineItem::eur("Gross income", result.gross_salary)];
    if !result.deductible_expenses.is_zero() {
        rows.push(LineItem::eur("Deductible expenses", result.deductible_expenses));
    }
    rows.extend([
        LineItem::eur("Employee contributions", result.employee_contributions),
        LineItem::eur("Employer contributions", result.employer_contributions),
        LineItem::eur("Taxable income", result.taxable_income),
        LineItem::eur("Tax before credit", result.base_tax),
        LineItem::eur("Tax credit", result.tax_credit),
    ]);
    if !result.business_tax.is_zero() {
        rows.push(LineItem::eur("Business tax", result.business_tax));
    }
    rows.extend([
        LineItem::eur("Income tax", result.income_tax),
        LineItem::eur("Net income", result.net_income),
        LineItem::pct("Effective tax rate", result.effective_tax_rate),
        LineItem::rate("Marginal rate", result.marginal_rate),
    ]);

    print_table(
        &format!(
            "INCOME TAX {} ({}, {} payments)",
            rates.year, result.category, result.payments
        ),
        rows,
    );

    let monthly = &result.breakdown;
    print_table(
        "PER PAYMENT",
        [
            LineItem::eur("Gross", monthly.monthly_gross),
            LineItem::eur("Employee contributions", monthly.monthly_employee_contributions),
            LineItem::eur("Employer contributions", monthly.monthly_employer_contributions),
            LineItem::eur("Tax (over 12 months)", monthly.monthly_tax),
            LineItem::eur("Net", monthly.monthly_net),
        ],
    );
}
