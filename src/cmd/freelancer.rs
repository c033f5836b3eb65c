//! Freelancer command - income tax, insurance and business tax for the self-employed

use super::display::{print_table, LineItem};
use super::{print_json, read_request, RatesArgs};
use clap::Args;
use grtax::money::format_eur;
use grtax::request::FreelancerRequest;
use grtax::tax::freelancer::calculate_freelancer_tax;
use grtax::tax::input::Amount;
use grtax::tax::DependentCount;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FreelancerCommand {
    /// JSON request file (or - for stdin); replaces the flags below
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Annual revenue
    #[arg(long)]
    revenue: Option<Decimal>,

    /// Profession, sets the deductible expense rate (e.g. engineers_architects, lawyers)
    #[arg(short, long)]
    profession: Option<String>,

    /// Deductible share of revenue when no profession is given (0.25 or 25)
    #[arg(long)]
    expense_rate: Option<Decimal>,

    /// Actual business expenses, overriding any rate
    #[arg(short, long)]
    expenses: Option<Decimal>,

    /// Dependent children (0, 1, 2, 3, 4+ or an exact count)
    #[arg(short, long, default_value = "0")]
    children: DependentCount,

    /// Taxpayer age, for youth relief
    #[arg(short, long)]
    age: Option<u32>,

    /// City of the business (athens and thessaloniki pay more business tax)
    #[arg(long)]
    city: Option<String>,

    /// Apply the tax-residence transfer incentive
    #[arg(long)]
    residence_transfer: bool,

    #[command(flatten)]
    rates: RatesArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl FreelancerCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        let request = match &self.request {
            Some(path) => read_request(path)?,
            None => FreelancerRequest {
                annual_revenue: self.revenue.map(Amount),
                profession: self.profession.clone(),
                custom_expense_rate: self.expense_rate.map(Amount),
                business_expenses: self.expenses.map(Amount),
                children: self.children,
                age: self.age.map(|a| Amount(Decimal::from(a))),
                city: self.city.clone(),
                tax_residence_transfer: self.residence_transfer,
            },
        };
        let input = request.to_input()?;
        let result = calculate_freelancer_tax(&input, &rates);

        if self.json {
            return print_json(&result);
        }

        print_table(
            &format!("FREELANCER TAX {}", rates.year),
            [
                LineItem::eur("Revenue", result.revenue),
                LineItem::eur("Deductible expenses", result.deductible_expenses),
                LineItem::eur("Net professional income", result.net_professional_income),
                LineItem::eur("Social insurance", result.social_insurance),
                LineItem::eur("Taxable income", result.taxable_income),
                LineItem::eur("Tax before credit", result.base_tax),
                LineItem::eur("Tax credit", result.tax_credit),
                LineItem::eur("Income tax", result.income_tax),
                LineItem::eur("Business tax", result.business_tax),
                LineItem::eur("Total tax and insurance", result.total_tax_and_insurance),
                LineItem::eur("Net income", result.net_income),
                LineItem::pct("Effective rate", result.effective_tax_rate),
            ],
        );
        let monthly = &result.breakdown;
        println!(
            "Monthly: Revenue {} | Insurance {} | Tax {} | Net {}",
            format_eur(monthly.monthly_revenue),
            format_eur(monthly.monthly_insurance),
            format_eur(monthly.monthly_tax),
            format_eur(monthly.monthly_net)
        );
        Ok(())
    }
}
