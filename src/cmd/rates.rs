//! Rates command - show the rate tables for a tax year

use super::display::{print_table, LineItem};
use super::{print_json, RatesArgs};
use clap::Args;
use grtax::money::{format_eur, format_pct};
use grtax::tax::{BracketTable, TaxRates};
use rust_decimal::Decimal;
use tabled::Tabled;

#[derive(Args, Debug)]
pub struct RatesCommand {
    #[command(flatten)]
    rates: RatesArgs,

    /// Output the full rate set as JSON, usable with --rates
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct BracketRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

fn bracket_rows(table: &BracketTable) -> Vec<BracketRow> {
    table
        .iter()
        .map(|b| BracketRow {
            from: format_eur(b.lower_bound),
            to: b.upper_bound.map_or_else(|| "-".to_string(), format_eur),
            rate: percent(b.rate),
        })
        .collect()
}

fn percent(fraction: Decimal) -> String {
    format_pct(fraction * Decimal::ONE_HUNDRED)
}

impl RatesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        if self.json {
            print_json(&rates)
        } else {
            print_rates(&rates);
            Ok(())
        }
    }
}

fn print_rates(rates: &TaxRates) {
    println!("RATES {}", rates.year);

    print_table("INCOME TAX (salary and pension)", bracket_rows(&rates.brackets));
    for relief in &rates.youth_relief {
        println!(
            "  Ages {}-{}: {} on {} to {}",
            relief.min_age,
            relief.max_age,
            percent(relief.rate),
            format_eur(relief.income_from),
            format_eur(relief.income_to)
        );
    }
    print_table("RENTAL INCOME", bracket_rows(&rates.rental_brackets));

    let credits = &rates.credits;
    let mut credit_rows: Vec<LineItem> = credits
        .by_dependents
        .iter()
        .enumerate()
        .map(|(n, credit)| {
            let label = if n + 1 == credits.by_dependents.len() {
                format!("{}+ children", n)
            } else {
                format!("{} children", n)
            };
            LineItem::eur(&label, *credit)
        })
        .collect();
    credit_rows.push(LineItem::eur("Each further child", credits.per_additional_dependent));
    credit_rows.push(LineItem::text(
        "Reduction",
        format!(
            "{} per {} above {}",
            format_eur(credits.reduction_step),
            format_eur(credits.reduction_band),
            format_eur(credits.reduction_threshold)
        ),
    ));
    print_table("TAX CREDIT", credit_rows);

    print_table(
        "SOCIAL INSURANCE",
        [
            LineItem::rate("Employee", rates.contributions.employee_rate),
            LineItem::rate("Employer", rates.contributions.employer_rate),
            LineItem::eur("Monthly cap", rates.contributions.monthly_cap),
            LineItem::rate("Self-employed", rates.self_employed.rate),
            LineItem::eur("Self-employed monthly minimum", rates.self_employed.minimum_monthly),
        ],
    );

    let mut freelancer_rows: Vec<LineItem> = rates
        .freelancer
        .expense_rates
        .iter()
        .map(|(profession, rate)| LineItem::rate(profession.display(), *rate))
        .collect();
    freelancer_rows.push(LineItem::rate("Default expense rate", rates.freelancer.default_expense_rate));
    freelancer_rows.push(LineItem::eur("Business tax", rates.freelancer.business_tax));
    freelancer_rows.push(LineItem::eur(
        "Business tax (Athens, Thessaloniki)",
        rates.freelancer.business_tax_major_city,
    ));
    print_table("FREELANCER", freelancer_rows);

    let gifts = &rates.gifts;
    print_table(
        "GIFT TAX",
        [
            ("A", &gifts.category_a),
            ("B", &gifts.category_b),
            ("C", &gifts.category_c),
        ]
        .into_iter()
        .map(|(category, band)| {
            LineItem::text(
                &format!("Category {}", category),
                format!(
                    "{} above {}",
                    percent(band.rate),
                    format_eur(band.tax_free_threshold)
                ),
            )
        }),
    );

    print_table(
        "OTHER",
        [
            LineItem::rate("Bonus withholding", rates.bonus.withholding_rate),
            LineItem::rate(
                "Bonus withholding (residence transfer)",
                rates.bonus.effective_rate(true),
            ),
            LineItem::rate("Residence transfer tax factor", rates.residence_transfer_factor),
        ],
    );
}
