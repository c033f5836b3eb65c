//! Gift tax command

use super::display::{print_table, LineItem};
use super::{print_json, read_request, RatesArgs};
use clap::Args;
use grtax::request::GiftTaxRequest;
use grtax::tax::input::Amount;
use grtax::tax::calculate_gift_tax;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GiftTaxCommand {
    /// JSON request file (or - for stdin); replaces the flags below
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Value of this gift
    #[arg(short, long)]
    value: Option<Decimal>,

    /// Gifts already received from the same donor
    #[arg(short, long)]
    previous: Option<Decimal>,

    /// Relationship category: A (spouse, children, parents), B (wider family) or C
    #[arg(short, long, default_value = "A")]
    category: String,

    #[command(flatten)]
    rates: RatesArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl GiftTaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rates = self.rates.load()?;
        let request = match &self.request {
            Some(path) => read_request(path)?,
            None => GiftTaxRequest {
                gift_value: self.value.map(Amount),
                previous_gifts: self.previous.map(Amount),
                relationship: Some(self.category.clone()),
            },
        };
        let result = calculate_gift_tax(&request.to_input(), &rates.gifts);

        if self.json {
            return print_json(&result);
        }

        print_table(
            &format!("GIFT TAX {} (category {})", rates.year, result.category),
            [
                LineItem::eur("Total gifts from donor", result.total_gift_value),
                LineItem::eur("Tax-free amount", result.tax_free_amount),
                LineItem::eur("Taxable amount", result.taxable_gift),
                LineItem::rate("Rate", result.rate),
                LineItem::eur("Tax on total", result.cumulative_tax),
                LineItem::eur("Tax on previous gifts", result.previous_tax),
                LineItem::eur("Tax due on this gift", result.tax_due),
            ],
        );
        Ok(())
    }
}
