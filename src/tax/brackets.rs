use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("bracket table is empty")]
    Empty,
    #[error("first bracket must start at 0, found {0}")]
    FirstBoundNotZero(Decimal),
    #[error("bracket {index} starts at {found}, expected {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },
    #[error("bracket {index} has upper bound {upper} not above lower bound {lower}")]
    EmptyRange {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },
    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd { index: usize },
    #[error("last bracket must be unbounded")]
    LastBracketBounded,
    #[error("bracket {index} has rate {rate} outside 0..=1")]
    RateOutOfRange { index: usize, rate: Decimal },
    #[error("bracket {index} rate {rate} is lower than the previous rate {previous}")]
    DecreasingRate {
        index: usize,
        rate: Decimal,
        previous: Decimal,
    },
    #[error("relief range {lower}..{upper} is empty")]
    EmptyReliefRange { lower: Decimal, upper: Decimal },
}

/// A single income band taxed at its own marginal rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    /// `None` for the top, unbounded bracket
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(lower_bound: Decimal, upper_bound: Option<Decimal>, rate: Decimal) -> Self {
        TaxBracket {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    pub fn width(&self) -> Option<Decimal> {
        self.upper_bound.map(|upper| upper - self.lower_bound)
    }

    fn contains(&self, income: Decimal) -> bool {
        income >= self.lower_bound && self.upper_bound.map_or(true, |upper| income < upper)
    }
}

/// Ordered, contiguous brackets covering `[0, ∞)` with non-decreasing rates.
///
/// The invariants are checked on construction (including when deserialized from a
/// rates file), so the bracket engine itself never has to deal with a malformed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketError> {
        let first = brackets.first().ok_or(BracketError::Empty)?;
        if !first.lower_bound.is_zero() {
            return Err(BracketError::FirstBoundNotZero(first.lower_bound));
        }

        let last_index = brackets.len() - 1;
        let mut previous: Option<&TaxBracket> = None;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketError::RateOutOfRange {
                    index,
                    rate: bracket.rate,
                });
            }
            match bracket.upper_bound {
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(BracketError::EmptyRange {
                        index,
                        lower: bracket.lower_bound,
                        upper,
                    })
                }
                Some(_) if index == last_index => return Err(BracketError::LastBracketBounded),
                None if index != last_index => {
                    return Err(BracketError::UnboundedBeforeEnd { index })
                }
                _ => {}
            }
            if let Some(prev) = previous {
                // upper bound of every non-last bracket is Some, checked above
                let expected = prev.upper_bound.unwrap_or(prev.lower_bound);
                if bracket.lower_bound != expected {
                    return Err(BracketError::NotContiguous {
                        index,
                        expected,
                        found: bracket.lower_bound,
                    });
                }
                if bracket.rate < prev.rate {
                    return Err(BracketError::DecreasingRate {
                        index,
                        rate: bracket.rate,
                        previous: prev.rate,
                    });
                }
            }
            previous = Some(bracket);
        }

        Ok(BracketTable { brackets })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxBracket> {
        self.brackets.iter()
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Rate applied to the next euro of income above `income`.
    pub fn marginal_rate(&self, income: Decimal) -> Decimal {
        let income = income.max(Decimal::ZERO);
        self.brackets
            .iter()
            .find(|b| b.contains(income))
            .or(self.brackets.last())
            .map_or(Decimal::ZERO, |b| b.rate)
    }

    /// Derive a table where income inside `lower..upper` is taxed at no more than `rate`.
    ///
    /// Brackets straddling either boundary are split, so the adjusted table stays
    /// contiguous and the resulting tax remains a continuous function of income.
    pub fn with_reduced_rate(
        &self,
        lower: Decimal,
        upper: Decimal,
        rate: Decimal,
    ) -> Result<BracketTable, BracketError> {
        if upper <= lower {
            return Err(BracketError::EmptyReliefRange { lower, upper });
        }

        let mut brackets = Vec::with_capacity(self.brackets.len() + 2);
        for bracket in &self.brackets {
            let mut cuts = vec![bracket.lower_bound];
            for point in [lower, upper] {
                let inside = point > bracket.lower_bound
                    && bracket.upper_bound.map_or(true, |u| point < u);
                if inside {
                    cuts.push(point);
                }
            }

            for (i, start) in cuts.iter().enumerate() {
                let end = cuts.get(i + 1).copied().or(bracket.upper_bound);
                let relieved = *start >= lower && end.is_some_and(|e| e <= upper);
                let segment_rate = if relieved {
                    bracket.rate.min(rate)
                } else {
                    bracket.rate
                };
                brackets.push(TaxBracket::new(*start, end, segment_rate));
            }
        }

        BracketTable::new(brackets)
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = BracketError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        BracketTable::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

/// Progressive tax on `taxable_income`: each bracket's rate applies only to the slice
/// of income that falls inside it.
pub fn apply_progressive_brackets(taxable_income: Decimal, table: &BracketTable) -> Decimal {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut remaining = taxable_income;
    let mut tax = Decimal::ZERO;
    for bracket in table.iter() {
        if remaining <= Decimal::ZERO {
            break;
        }
        let in_bracket = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        tax += in_bracket * bracket.rate;
        remaining -= in_bracket;
    }

    log::trace!("bracket tax on {}: {}", taxable_income, tax);
    tax
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table_2025() -> BracketTable {
        BracketTable::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.09)),
            TaxBracket::new(dec!(10000), Some(dec!(20000)), dec!(0.22)),
            TaxBracket::new(dec!(20000), Some(dec!(30000)), dec!(0.28)),
            TaxBracket::new(dec!(30000), Some(dec!(40000)), dec!(0.36)),
            TaxBracket::new(dec!(40000), None, dec!(0.44)),
        ])
        .unwrap()
    }

    #[test]
    fn zero_and_negative_income_pay_nothing() {
        let table = table_2025();
        assert_eq!(apply_progressive_brackets(Decimal::ZERO, &table), Decimal::ZERO);
        assert_eq!(apply_progressive_brackets(dec!(-500), &table), Decimal::ZERO);
    }

    #[test]
    fn no_cliff_at_bracket_boundary() {
        let table = table_2025();
        assert_eq!(apply_progressive_brackets(dec!(10000), &table), dec!(900));
        assert_eq!(
            apply_progressive_brackets(dec!(10000.01), &table),
            dec!(900.0022)
        );
    }

    #[test]
    fn tax_across_all_brackets() {
        let table = table_2025();
        // 900 + 2200 + 2800 + 3600 + 10000 * 0.44
        assert_eq!(apply_progressive_brackets(dec!(50000), &table), dec!(13900));
        assert_eq!(apply_progressive_brackets(dec!(40000), &table), dec!(9500));
    }

    #[test]
    fn tax_is_non_decreasing() {
        let table = table_2025();
        let mut previous = Decimal::ZERO;
        let mut income = Decimal::ZERO;
        while income <= dec!(60000) {
            let tax = apply_progressive_brackets(income, &table);
            assert!(tax >= previous, "tax fell at {}", income);
            previous = tax;
            income += dec!(250);
        }
    }

    #[test]
    fn marginal_rate_lookup() {
        let table = table_2025();
        assert_eq!(table.marginal_rate(dec!(0)), dec!(0.09));
        assert_eq!(table.marginal_rate(dec!(9999.99)), dec!(0.09));
        assert_eq!(table.marginal_rate(dec!(10000)), dec!(0.22));
        assert_eq!(table.marginal_rate(dec!(1000000)), dec!(0.44));
    }

    #[test]
    fn rejects_gaps_between_brackets() {
        let result = BracketTable::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.09)),
            TaxBracket::new(dec!(12000), None, dec!(0.22)),
        ]);
        assert_eq!(
            result,
            Err(BracketError::NotContiguous {
                index: 1,
                expected: dec!(10000),
                found: dec!(12000),
            })
        );
    }

    #[test]
    fn rejects_decreasing_rates() {
        let result = BracketTable::new(vec![
            TaxBracket::new(dec!(0), Some(dec!(10000)), dec!(0.22)),
            TaxBracket::new(dec!(10000), None, dec!(0.09)),
        ]);
        assert!(matches!(result, Err(BracketError::DecreasingRate { .. })));
    }

    #[test]
    fn rejects_bounded_top_bracket() {
        let result = BracketTable::new(vec![TaxBracket::new(
            dec!(0),
            Some(dec!(10000)),
            dec!(0.09),
        )]);
        assert_eq!(result, Err(BracketError::LastBracketBounded));
        assert_eq!(BracketTable::new(vec![]), Err(BracketError::Empty));
    }

    #[test]
    fn reduced_rate_on_middle_bracket() {
        let table = table_2025()
            .with_reduced_rate(dec!(10000), dec!(20000), dec!(0.09))
            .unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(apply_progressive_brackets(dec!(20000), &table), dec!(1800));
        assert_eq!(apply_progressive_brackets(dec!(25000), &table), dec!(3200));
    }

    #[test]
    fn reduced_rate_splits_straddled_bracket() {
        let table = table_2025()
            .with_reduced_rate(dec!(0), dec!(15000), dec!(0))
            .unwrap();
        // 0..10000 @0, 10000..15000 @0, 15000..20000 @22%, ...
        assert_eq!(table.len(), 6);
        assert_eq!(apply_progressive_brackets(dec!(15000), &table), dec!(0));
        assert_eq!(apply_progressive_brackets(dec!(20000), &table), dec!(1100));
    }

    #[test]
    fn deserialized_table_is_validated() {
        let json = r#"[{"lower_bound": 0, "upper_bound": 100, "rate": 0.1},
                       {"lower_bound": 50, "rate": 0.2}]"#;
        let result: Result<BracketTable, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
