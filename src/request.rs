//! Flat request records, as sent by a calculator form.
//!
//! Every numeric field may be a JSON number or a string, and anything unparseable counts
//! as zero. Each record converts into the typed engine input.

use crate::tax::bonus::BonusType;
use crate::tax::credits::DependentCount;
use crate::tax::freelancer::{City, ExpenseBasis, FreelancerInput, Profession};
use crate::tax::gift::{GiftCategory, GiftInput};
use crate::tax::income::{CalculationInput, EmploymentCategory, DEFAULT_PAYMENTS};
use crate::tax::input::{
    deserialize_dependents, deserialize_flag, parse_date, Amount, InputError,
};
use crate::tax::reverse::SolverConfig;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::Deserialize;

fn value(amount: Option<Amount>) -> Decimal {
    amount.map(Amount::value).unwrap_or_default()
}

fn payments(annual_salaries: Option<Amount>) -> u32 {
    annual_salaries
        .and_then(Amount::as_count)
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PAYMENTS)
}

fn age(age: Option<Amount>) -> Option<u32> {
    age.and_then(Amount::as_count).filter(|a| *a > 0)
}

fn category(category: Option<&str>) -> Result<EmploymentCategory, InputError> {
    match category.map(str::trim) {
        None | Some("") => Ok(EmploymentCategory::default()),
        Some(s) => s.parse(),
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeTaxRequest {
    /// Gross salary per payment, multiplied by annualSalaries
    pub monthly_income: Option<Amount>,
    /// Gross annual income; takes precedence over monthlyIncome
    pub yearly_income: Option<Amount>,
    /// Dependent children: "0", "1", "2", "3" or "4+"
    #[serde(deserialize_with = "deserialize_dependents")]
    #[schemars(with = "Amount")]
    pub children: DependentCount,
    pub age: Option<Amount>,
    #[serde(deserialize_with = "deserialize_flag")]
    #[schemars(with = "bool")]
    pub tax_residence_transfer: bool,
    /// Salary payments per year, 14 when omitted
    pub annual_salaries: Option<Amount>,
    /// employed, self-employed, pensioner or rental
    pub category: Option<String>,
}

impl IncomeTaxRequest {
    pub fn to_input(&self) -> Result<CalculationInput, InputError> {
        let payments = payments(self.annual_salaries);
        let yearly = value(self.yearly_income);
        let gross_annual_salary = if yearly > Decimal::ZERO {
            yearly
        } else {
            value(self.monthly_income) * Decimal::from(payments)
        };

        Ok(CalculationInput {
            gross_annual_salary,
            dependents: self.children,
            age: age(self.age),
            tax_residence_transfer: self.tax_residence_transfer,
            payments,
            category: category(self.category.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WithholdingRequest {
    pub monthly_salary: Option<Amount>,
    /// full-time, part-time, pensioner, ...
    pub employment_type: Option<String>,
    #[serde(deserialize_with = "deserialize_dependents")]
    #[schemars(with = "Amount")]
    pub children: DependentCount,
    #[serde(deserialize_with = "deserialize_flag")]
    #[schemars(with = "bool")]
    pub tax_residence_transfer: bool,
    pub annual_salaries: Option<Amount>,
    pub age: Option<Amount>,
}

impl WithholdingRequest {
    /// Monthly salary plus the template the annual calculation runs on.
    pub fn to_input(&self) -> Result<(Decimal, CalculationInput), InputError> {
        let template = CalculationInput {
            gross_annual_salary: Decimal::ZERO,
            dependents: self.children,
            age: age(self.age),
            tax_residence_transfer: self.tax_residence_transfer,
            payments: payments(self.annual_salaries),
            category: category(self.employment_type.as_deref())?,
        };
        Ok((value(self.monthly_salary), template))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusSelection {
    One(BonusType),
    All,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HolidayBonusRequest {
    pub monthly_salary: Option<Amount>,
    /// Employment start, YYYY-MM-DD
    pub start_date: Option<String>,
    /// Employment end, YYYY-MM-DD; still employed when omitted
    pub end_date: Option<String>,
    /// christmas, easter, summer or all
    pub bonus_type: Option<String>,
    pub payment_year: Option<Amount>,
    #[serde(deserialize_with = "deserialize_flag")]
    #[schemars(with = "bool")]
    pub tax_residence_transfer: bool,
}

/// Holiday bonus request resolved into typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusInput {
    pub monthly_salary: Decimal,
    pub employment_start: NaiveDate,
    pub employment_end: Option<NaiveDate>,
    pub selection: BonusSelection,
    pub payment_year: i32,
    pub tax_residence_transfer: bool,
}

impl HolidayBonusRequest {
    pub fn to_input(&self, default_year: i32) -> Result<BonusInput, InputError> {
        let start = self
            .start_date
            .as_deref()
            .ok_or(InputError::MissingField("startDate"))?;
        let employment_end = self
            .end_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_date)
            .transpose()?;

        let selection = match self.bonus_type.as_deref().map(str::trim) {
            None | Some("") => return Err(InputError::MissingField("bonusType")),
            Some(s) if s.eq_ignore_ascii_case("all") => BonusSelection::All,
            Some(s) => BonusSelection::One(s.parse::<BonusType>()?),
        };

        let payment_year = self
            .payment_year
            .and_then(|y| y.as_count())
            .and_then(|y| i32::try_from(y).ok())
            .filter(|y| *y > 0)
            .unwrap_or(default_year);

        Ok(BonusInput {
            monthly_salary: value(self.monthly_salary),
            employment_start: parse_date(start)?,
            employment_end,
            selection,
            payment_year,
            tax_residence_transfer: self.tax_residence_transfer,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GiftTaxRequest {
    pub gift_value: Option<Amount>,
    /// Gifts already received from the same donor
    pub previous_gifts: Option<Amount>,
    /// category-a, category-b or category-c
    pub relationship: Option<String>,
}

impl GiftTaxRequest {
    /// A missing relationship means category A; an unrecognised one is charged as C.
    pub fn to_input(&self) -> GiftInput {
        let category = match self.relationship.as_deref().map(str::trim) {
            None | Some("") => GiftCategory::A,
            Some(s) => s.parse().unwrap_or_else(|err| {
                log::warn!("{}, using category C", err);
                GiftCategory::C
            }),
        };
        GiftInput {
            gift_value: value(self.gift_value),
            previous_gifts: value(self.previous_gifts),
            category,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FreelancerRequest {
    pub annual_revenue: Option<Amount>,
    /// e.g. engineers_architects, lawyers, traders
    pub profession: Option<String>,
    /// Share of revenue deducted as expenses, 0.25 or 25 for a quarter
    pub custom_expense_rate: Option<Amount>,
    /// Actual expenses in euros; takes precedence over the rates
    pub business_expenses: Option<Amount>,
    #[serde(deserialize_with = "deserialize_dependents")]
    #[schemars(with = "Amount")]
    pub children: DependentCount,
    pub age: Option<Amount>,
    pub city: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    #[schemars(with = "bool")]
    pub tax_residence_transfer: bool,
}

impl FreelancerRequest {
    pub fn to_input(&self) -> Result<FreelancerInput, InputError> {
        let profession = match self.profession.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(s.parse::<Profession>()?),
        };
        let expenses = match (self.business_expenses, profession, self.custom_expense_rate) {
            (Some(amount), _, _) => ExpenseBasis::Amount(amount.value()),
            (None, Some(profession), _) => ExpenseBasis::Profession(profession),
            (None, None, Some(rate)) => ExpenseBasis::Rate(as_fraction(rate.value())),
            (None, None, None) => ExpenseBasis::Default,
        };
        let city = self
            .city
            .as_deref()
            .and_then(|c| c.parse::<City>().ok())
            .unwrap_or_default();

        Ok(FreelancerInput {
            annual_revenue: value(self.annual_revenue),
            expenses,
            dependents: self.children,
            age: age(self.age),
            city,
            tax_residence_transfer: self.tax_residence_transfer,
        })
    }
}

fn as_fraction(rate: Decimal) -> Decimal {
    if rate > Decimal::ONE {
        rate / dec!(100)
    } else {
        rate
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GrossFromNetRequest {
    pub desired_monthly_net: Option<Amount>,
    #[serde(deserialize_with = "deserialize_dependents")]
    #[schemars(with = "Amount")]
    pub children: DependentCount,
    pub age: Option<Amount>,
    pub annual_salaries: Option<Amount>,
    #[serde(deserialize_with = "deserialize_flag")]
    #[schemars(with = "bool")]
    pub tax_residence_transfer: bool,
    pub category: Option<String>,
    /// Accepted error on the monthly net, 0.01 when omitted
    pub tolerance: Option<Amount>,
    pub max_iterations: Option<Amount>,
}

impl GrossFromNetRequest {
    pub fn to_input(&self) -> Result<(Decimal, CalculationInput, SolverConfig), InputError> {
        let template = CalculationInput {
            gross_annual_salary: Decimal::ZERO,
            dependents: self.children,
            age: age(self.age),
            tax_residence_transfer: self.tax_residence_transfer,
            payments: payments(self.annual_salaries),
            category: category(self.category.as_deref())?,
        };

        let defaults = SolverConfig::default();
        let config = SolverConfig {
            tolerance: self
                .tolerance
                .map(Amount::value)
                .filter(|t| *t > Decimal::ZERO)
                .unwrap_or(defaults.tolerance),
            max_iterations: self
                .max_iterations
                .and_then(Amount::as_count)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_iterations),
            ..defaults
        };

        Ok((value(self.desired_monthly_net), template, config))
    }
}
