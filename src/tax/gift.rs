use super::input::InputError;
use crate::money::{bounded, non_negative};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relationship between donor and recipient.
///
/// A: spouse, children, parents. B: siblings, grandparents, more distant descendants,
/// in-laws. C: everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftCategory {
    #[default]
    A,
    B,
    C,
}

impl FromStr for GiftCategory {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let letter = normalized
            .strip_prefix("category-")
            .or_else(|| normalized.strip_prefix("category_"))
            .unwrap_or(&normalized);
        match letter {
            "a" => Ok(GiftCategory::A),
            "b" => Ok(GiftCategory::B),
            "c" => Ok(GiftCategory::C),
            _ => Err(InputError::UnknownGiftCategory(s.to_string())),
        }
    }
}

impl fmt::Display for GiftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GiftCategory::A => "A",
            GiftCategory::B => "B",
            GiftCategory::C => "C",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftBand {
    pub tax_free_threshold: Decimal,
    pub rate: Decimal,
}

impl GiftBand {
    fn tax_on(&self, cumulative_value: Decimal) -> Decimal {
        non_negative(cumulative_value - self.tax_free_threshold) * self.rate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftTaxTable {
    pub category_a: GiftBand,
    pub category_b: GiftBand,
    pub category_c: GiftBand,
}

impl GiftTaxTable {
    pub fn band(&self, category: GiftCategory) -> &GiftBand {
        match category {
            GiftCategory::A => &self.category_a,
            GiftCategory::B => &self.category_b,
            GiftCategory::C => &self.category_c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftInput {
    pub gift_value: Decimal,
    /// Gifts already reported from the same donor
    pub previous_gifts: Decimal,
    pub category: GiftCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GiftResult {
    pub category: GiftCategory,
    pub total_gift_value: Decimal,
    pub tax_free_amount: Decimal,
    pub rate: Decimal,
    pub taxable_gift: Decimal,
    /// Tax on the cumulative total of all gifts from this donor
    pub cumulative_tax: Decimal,
    /// Part of the cumulative tax already attributable to the previous gifts
    pub previous_tax: Decimal,
    /// Tax owed on this gift
    pub tax_due: Decimal,
}

/// Flat-rate gift tax on the excess of all gifts from one donor over the category's
/// tax-free threshold.
pub fn calculate_gift_tax(input: &GiftInput, table: &GiftTaxTable) -> GiftResult {
    let band = table.band(input.category);
    let gift_value = bounded(input.gift_value);
    let previous_gifts = bounded(input.previous_gifts);

    let total_gift_value = gift_value + previous_gifts;
    let cumulative_tax = band.tax_on(total_gift_value);
    let previous_tax = band.tax_on(previous_gifts);

    GiftResult {
        category: input.category,
        total_gift_value,
        tax_free_amount: band.tax_free_threshold,
        rate: band.rate,
        taxable_gift: non_negative(total_gift_value - band.tax_free_threshold),
        cumulative_tax,
        previous_tax,
        tax_due: non_negative(cumulative_tax - previous_tax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::max_amount;
    use crate::tax::TaxYear;
    use rust_decimal_macros::dec;

    fn table() -> GiftTaxTable {
        TaxYear(2025).rates().unwrap().gifts
    }

    fn gift(value: Decimal, previous: Decimal, category: GiftCategory) -> GiftInput {
        GiftInput {
            gift_value: value,
            previous_gifts: previous,
            category,
        }
    }

    #[test]
    fn parses_categories() {
        assert_eq!("A".parse::<GiftCategory>().unwrap(), GiftCategory::A);
        assert_eq!("category-b".parse::<GiftCategory>().unwrap(), GiftCategory::B);
        assert_eq!(" c ".parse::<GiftCategory>().unwrap(), GiftCategory::C);
        assert!("category-d".parse::<GiftCategory>().is_err());
    }

    #[test]
    fn gift_below_threshold_is_tax_free() {
        let result = calculate_gift_tax(&gift(dec!(50000), dec!(0), GiftCategory::A), &table());
        assert_eq!(result.taxable_gift, Decimal::ZERO);
        assert_eq!(result.tax_due, Decimal::ZERO);
    }

    #[test]
    fn flat_rate_on_excess() {
        let result = calculate_gift_tax(&gift(dec!(100000), dec!(0), GiftCategory::A), &table());
        assert_eq!(result.taxable_gift, dec!(20000));
        assert_eq!(result.tax_due, dec!(2000));

        let result = calculate_gift_tax(&gift(dec!(40000), dec!(0), GiftCategory::B), &table());
        assert_eq!(result.tax_due, dec!(2000));

        let result = calculate_gift_tax(&gift(dec!(10000), dec!(0), GiftCategory::C), &table());
        assert_eq!(result.tax_due, dec!(1600));
    }

    #[test]
    fn previous_gifts_use_up_the_threshold() {
        let result =
            calculate_gift_tax(&gift(dec!(20000), dec!(70000), GiftCategory::A), &table());
        assert_eq!(result.total_gift_value, dec!(90000));
        assert_eq!(result.cumulative_tax, dec!(1000));
        assert_eq!(result.previous_tax, Decimal::ZERO);
        assert_eq!(result.tax_due, dec!(1000));
    }

    #[test]
    fn tax_already_due_on_previous_gifts_is_not_charged_again() {
        let result =
            calculate_gift_tax(&gift(dec!(10000), dec!(90000), GiftCategory::A), &table());
        assert_eq!(result.cumulative_tax, dec!(2000));
        assert_eq!(result.previous_tax, dec!(1000));
        assert_eq!(result.tax_due, dec!(1000));
    }

    #[test]
    fn negative_inputs_are_clamped() {
        let result = calculate_gift_tax(&gift(dec!(-500), dec!(-10), GiftCategory::C), &table());
        assert_eq!(result.total_gift_value, Decimal::ZERO);
        assert_eq!(result.tax_due, Decimal::ZERO);
    }

    #[test]
    fn huge_values_are_capped() {
        let result = calculate_gift_tax(&gift(Decimal::MAX, Decimal::MAX, GiftCategory::C), &table());
        assert_eq!(result.total_gift_value, max_amount() * dec!(2));
        assert_eq!(result.tax_due, max_amount() * dec!(0.4));
    }
}
