use super::bonus::BonusRates;
use super::brackets::{BracketError, BracketTable, TaxBracket};
use super::contributions::{ContributionRates, SelfEmployedRates};
use super::credits::TaxCreditTable;
use super::freelancer::{FreelancerRates, Profession};
use super::gift::{GiftBand, GiftTaxTable};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum RatesError {
    #[error("no rate table for tax year {0} (supported: {1})")]
    UnsupportedYear(i32, String),
    #[error("invalid bracket table: {0}")]
    InvalidBrackets(#[from] BracketError),
    #[error("invalid youth relief for ages {min_age}-{max_age}: {source}")]
    InvalidYouthRelief {
        min_age: u32,
        max_age: u32,
        source: BracketError,
    },
    #[error("failed to read rates file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse rates file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Greek tax year. Unlike the UK, it follows the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxYear(pub i32);

impl TaxYear {
    pub const SUPPORTED: &'static [TaxYear] = &[TaxYear(2025), TaxYear(2026)];
    pub const DEFAULT: TaxYear = TaxYear(2025);

    pub fn from_date(date: NaiveDate) -> Self {
        TaxYear(date.year())
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 1, 1)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 12, 31)
    }

    pub fn display(&self) -> String {
        self.0.to_string()
    }

    /// Built-in rate tables for this year.
    pub fn rates(&self) -> Result<TaxRates, RatesError> {
        match self.0 {
            2025 => Ok(TaxRates::greece_2025()),
            2026 => Ok(TaxRates::greece_2026()),
            other => Err(RatesError::UnsupportedYear(
                other,
                Self::SUPPORTED
                    .iter()
                    .map(|y| y.display())
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Reduced rate on a slice of income for taxpayers within an age range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouthRelief {
    pub min_age: u32,
    pub max_age: u32,
    pub income_from: Decimal,
    pub income_to: Decimal,
    pub rate: Decimal,
}

impl YouthRelief {
    pub fn applies_to(&self, age: u32) -> bool {
        (self.min_age..=self.max_age).contains(&age)
    }
}

/// Every table the engine needs for one tax year.
///
/// Built-in sets come from [`TaxYear::rates`]; a custom set can be loaded from JSON with
/// [`TaxRates::read_json`]. Either way the value is immutable once constructed and is
/// passed by reference into the calculation functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    pub year: TaxYear,
    pub brackets: BracketTable,
    pub rental_brackets: BracketTable,
    pub credits: TaxCreditTable,
    pub contributions: ContributionRates,
    pub self_employed: SelfEmployedRates,
    #[serde(default)]
    pub youth_relief: Vec<YouthRelief>,
    /// Multiplier on final income tax when the tax-residence transfer incentive applies
    pub residence_transfer_factor: Decimal,
    pub freelancer: FreelancerRates,
    pub gifts: GiftTaxTable,
    pub bonus: BonusRates,
}

impl TaxRates {
    pub fn greece_2025() -> Self {
        TaxRates {
            year: TaxYear(2025),
            brackets: table(&[
                (dec!(0), Some(dec!(10000)), dec!(0.09)),
                (dec!(10000), Some(dec!(20000)), dec!(0.22)),
                (dec!(20000), Some(dec!(30000)), dec!(0.28)),
                (dec!(30000), Some(dec!(40000)), dec!(0.36)),
                (dec!(40000), None, dec!(0.44)),
            ]),
            rental_brackets: table(&[
                (dec!(0), Some(dec!(12000)), dec!(0.15)),
                (dec!(12000), Some(dec!(35000)), dec!(0.35)),
                (dec!(35000), None, dec!(0.45)),
            ]),
            credits: TaxCreditTable {
                by_dependents: vec![dec!(777), dec!(810), dec!(900), dec!(1120), dec!(1340)],
                per_additional_dependent: dec!(220),
                reduction_threshold: dec!(12000),
                reduction_band: dec!(1000),
                reduction_step: dec!(20),
            },
            contributions: ContributionRates {
                employee_rate: dec!(0.1337),
                employer_rate: dec!(0.2179),
                monthly_cap: dec!(7572.62),
            },
            self_employed: SelfEmployedRates {
                rate: dec!(0.271),
                minimum_monthly: dec!(230.29),
                cap_payments: 14,
            },
            youth_relief: Vec::new(),
            residence_transfer_factor: dec!(0.5),
            freelancer: FreelancerRates {
                expense_rates: BTreeMap::from([
                    (Profession::EngineersArchitects, dec!(0.40)),
                    (Profession::MedicalProfessionals, dec!(0.35)),
                    (Profession::Lawyers, dec!(0.30)),
                    (Profession::Accountants, dec!(0.30)),
                    (Profession::OtherServices, dec!(0.20)),
                    (Profession::Traders, dec!(0.10)),
                ]),
                default_expense_rate: dec!(0.20),
                business_tax: dec!(650),
                business_tax_major_city: dec!(1000),
            },
            gifts: GiftTaxTable {
                category_a: GiftBand {
                    tax_free_threshold: dec!(80000),
                    rate: dec!(0.10),
                },
                category_b: GiftBand {
                    tax_free_threshold: dec!(30000),
                    rate: dec!(0.20),
                },
                category_c: GiftBand {
                    tax_free_threshold: dec!(6000),
                    rate: dec!(0.40),
                },
            },
            bonus: BonusRates {
                withholding_rate: dec!(0.15),
                residence_transfer_factor: dec!(0.5),
            },
        }
    }

    /// 2026 keeps the 2025 tables and adds the age-based reliefs.
    pub fn greece_2026() -> Self {
        TaxRates {
            year: TaxYear(2026),
            youth_relief: vec![
                YouthRelief {
                    min_age: 0,
                    max_age: 25,
                    income_from: dec!(0),
                    income_to: dec!(20000),
                    rate: dec!(0),
                },
                YouthRelief {
                    min_age: 26,
                    max_age: 30,
                    income_from: dec!(10000),
                    income_to: dec!(20000),
                    rate: dec!(0.09),
                },
            ],
            ..Self::greece_2025()
        }
    }

    /// Load a custom rate set from JSON and check it is usable.
    pub fn read_json<R: Read>(reader: R) -> Result<Self, RatesError> {
        let rates: TaxRates = serde_json::from_reader(reader)?;
        rates.validate()?;
        log::info!("Loaded custom rate tables for {}", rates.year);
        Ok(rates)
    }

    /// Bracket tables are validated when built; this checks the derived relief tables too.
    pub fn validate(&self) -> Result<(), RatesError> {
        for relief in &self.youth_relief {
            self.relieved_table(relief)
                .map_err(|source| RatesError::InvalidYouthRelief {
                    min_age: relief.min_age,
                    max_age: relief.max_age,
                    source,
                })?;
        }
        Ok(())
    }

    /// Final income tax after the tax-residence transfer incentive, when it applies.
    pub fn residence_adjusted(&self, tax: Decimal, tax_residence_transfer: bool) -> Decimal {
        if tax_residence_transfer {
            tax * self.residence_transfer_factor
        } else {
            tax
        }
    }

    /// Salary/pension bracket table, adjusted for any age relief that applies.
    pub fn salary_brackets(&self, age: Option<u32>) -> Cow<'_, BracketTable> {
        let relief = age.and_then(|age| self.youth_relief.iter().find(|r| r.applies_to(age)));
        match relief {
            Some(relief) => match self.relieved_table(relief) {
                Ok(table) => {
                    log::debug!(
                        "Applying youth relief for ages {}-{}",
                        relief.min_age,
                        relief.max_age
                    );
                    Cow::Owned(table)
                }
                Err(err) => {
                    log::warn!("Ignoring youth relief: {}", err);
                    Cow::Borrowed(&self.brackets)
                }
            },
            None => Cow::Borrowed(&self.brackets),
        }
    }

    fn relieved_table(&self, relief: &YouthRelief) -> Result<BracketTable, BracketError> {
        self.brackets
            .with_reduced_rate(relief.income_from, relief.income_to, relief.rate)
    }
}

fn table(rows: &[(Decimal, Option<Decimal>, Decimal)]) -> BracketTable {
    let brackets = rows
        .iter()
        .map(|(lower, upper, rate)| TaxBracket::new(*lower, *upper, *rate))
        .collect();
    BracketTable::new(brackets).expect("built-in bracket table is valid")
}
