use grtax::money::{format_eur, format_pct};
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

/// One labelled figure in a result table
#[derive(Debug, Clone, Tabled)]
pub struct LineItem {
    #[tabled(rename = "Item")]
    pub item: String,

    #[tabled(rename = "Amount")]
    pub amount: String,
}

impl LineItem {
    pub fn eur(item: &str, amount: Decimal) -> Self {
        LineItem {
            item: item.to_string(),
            amount: format_eur(amount),
        }
    }

    pub fn pct(item: &str, rate: Decimal) -> Self {
        LineItem {
            item: item.to_string(),
            amount: format_pct(rate),
        }
    }

    /// A rate stored as a fraction, shown as a percentage
    pub fn rate(item: &str, fraction: Decimal) -> Self {
        Self::pct(item, fraction * Decimal::ONE_HUNDRED)
    }

    pub fn text(item: &str, value: impl ToString) -> Self {
        LineItem {
            item: item.to_string(),
            amount: value.to_string(),
        }
    }
}

pub fn render<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string()
}

pub fn print_table<T: Tabled>(title: &str, rows: impl IntoIterator<Item = T>) {
    println!();
    println!("{}", title);
    println!("{}", render(rows));
}
