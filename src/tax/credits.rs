use crate::money::non_negative;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of dependent children.
///
/// Request records carry this as `"0" | "1" | "2" | "3" | "4+"`; a bare integer is also
/// accepted so larger families can be priced exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct DependentCount(pub u32);

impl DependentCount {
    /// Lenient parse: anything unrecognised counts as no dependents.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            log::debug!("unrecognised dependent count {:?}, using 0", s);
            DependentCount::default()
        })
    }
}

impl FromStr for DependentCount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_suffix('+').unwrap_or(s);
        digits.trim().parse().map(DependentCount)
    }
}

impl fmt::Display for DependentCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat annual credit against employment and pension income tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCreditTable {
    /// Credit for 0, 1, 2, ... dependents; the last entry is the base for larger families
    pub by_dependents: Vec<Decimal>,
    /// Added for each dependent beyond the last listed bucket
    pub per_additional_dependent: Decimal,
    /// Taxable income above which the credit starts shrinking
    pub reduction_threshold: Decimal,
    /// Size of one reduction band
    pub reduction_band: Decimal,
    /// Amount removed from the credit for each full band above the threshold
    pub reduction_step: Decimal,
}

impl TaxCreditTable {
    /// Credit before any income-based reduction.
    pub fn base_credit(&self, dependents: DependentCount) -> Decimal {
        let Some(last) = self.by_dependents.last() else {
            return Decimal::ZERO;
        };
        let last_bucket = (self.by_dependents.len() - 1) as u32;
        match self.by_dependents.get(dependents.0 as usize) {
            Some(credit) if dependents.0 < last_bucket => *credit,
            _ => {
                let extra = dependents.0.saturating_sub(last_bucket);
                *last + self.per_additional_dependent * Decimal::from(extra)
            }
        }
    }

    /// Reduction applied for every full band of income above the threshold.
    pub fn reduction(&self, taxable_income: Decimal) -> Decimal {
        if self.reduction_band <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let excess = non_negative(taxable_income - self.reduction_threshold);
        let full_bands = (excess / self.reduction_band).floor();
        full_bands * self.reduction_step
    }
}

/// Tax credit for the given family size and taxable income, floored at zero.
pub fn compute_tax_credit(
    dependents: DependentCount,
    taxable_income: Decimal,
    table: &TaxCreditTable,
) -> Decimal {
    let base = table.base_credit(dependents);
    let credit = non_negative(base - table.reduction(taxable_income));
    log::trace!(
        "credit for {} dependents at {}: base {}, applied {}",
        dependents,
        taxable_income,
        base,
        credit
    );
    credit
}
