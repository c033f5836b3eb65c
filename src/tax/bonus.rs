use super::input::InputError;
use crate::money::{bounded, round_cents};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statutory holiday bonuses paid to Greek employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusType {
    Christmas,
    Easter,
    Summer,
}

impl BonusType {
    pub const ALL: [BonusType; 3] = [BonusType::Christmas, BonusType::Easter, BonusType::Summer];

    pub fn display(&self) -> &'static str {
        match self {
            BonusType::Christmas => "Christmas",
            BonusType::Easter => "Easter",
            BonusType::Summer => "Summer",
        }
    }

    /// Share of one month's salary paid for a complete qualifying period.
    pub fn full_amount_fraction(&self) -> Decimal {
        match self {
            BonusType::Christmas => Decimal::ONE,
            BonusType::Easter | BonusType::Summer => dec!(0.5),
        }
    }

    fn period_bounds(&self) -> ((u32, u32), (u32, u32)) {
        match self {
            BonusType::Christmas => ((5, 1), (12, 31)),
            BonusType::Easter => ((1, 1), (4, 30)),
            BonusType::Summer => ((1, 1), (6, 30)),
        }
    }
}

impl FromStr for BonusType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "christmas" => Ok(BonusType::Christmas),
            "easter" => Ok(BonusType::Easter),
            "summer" | "vacation" | "holiday" => Ok(BonusType::Summer),
            _ => Err(InputError::UnknownBonusType(s.to_string())),
        }
    }
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRates {
    /// Flat withholding on the bonus amount
    pub withholding_rate: Decimal,
    /// Multiplier on the withholding rate under the tax-residence transfer incentive
    pub residence_transfer_factor: Decimal,
}

impl BonusRates {
    pub fn effective_rate(&self, tax_residence_transfer: bool) -> Decimal {
        if tax_residence_transfer {
            self.withholding_rate * self.residence_transfer_factor
        } else {
            self.withholding_rate
        }
    }
}

/// Qualifying period of a bonus in a given payment year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusPeriod {
    pub bonus_type: BonusType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_days: i64,
    pub full_amount_fraction: Decimal,
}

impl BonusPeriod {
    pub fn for_year(bonus_type: BonusType, year: i32) -> Result<Self, InputError> {
        let ((start_month, start_day), (end_month, end_day)) = bonus_type.period_bounds();
        let period_start = NaiveDate::from_ymd_opt(year, start_month, start_day)
            .ok_or(InputError::YearOutOfRange(year))?;
        let period_end = NaiveDate::from_ymd_opt(year, end_month, end_day)
            .ok_or(InputError::YearOutOfRange(year))?;

        Ok(BonusPeriod {
            bonus_type,
            period_start,
            period_end,
            total_days: inclusive_days(period_start, period_end),
            full_amount_fraction: bonus_type.full_amount_fraction(),
        })
    }

    /// Days of employment inside this period, counting both ends.
    pub fn days_worked(&self, employment_start: NaiveDate, employment_end: Option<NaiveDate>) -> i64 {
        let start = employment_start.max(self.period_start);
        let end = employment_end.map_or(self.period_end, |e| e.min(self.period_end));
        inclusive_days(start, end).max(0)
    }
}

fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BonusResult {
    pub period: BonusPeriod,
    pub days_worked: i64,
    pub full_amount: Decimal,
    pub gross_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub net_amount: Decimal,
}

/// Prorated bonus for an employee who started on `employment_start`.
///
/// Amounts are rounded to cents at each step, so `gross = tax + net` holds exactly.
pub fn compute_bonus(
    monthly_salary: Decimal,
    employment_start: NaiveDate,
    bonus_type: BonusType,
    payment_year: i32,
    tax_residence_transfer: bool,
    rates: &BonusRates,
) -> Result<BonusResult, InputError> {
    compute_bonus_until(
        monthly_salary,
        employment_start,
        None,
        bonus_type,
        payment_year,
        tax_residence_transfer,
        rates,
    )
}

/// As [`compute_bonus`], with employment ending on `employment_end` (inclusive).
pub fn compute_bonus_until(
    monthly_salary: Decimal,
    employment_start: NaiveDate,
    employment_end: Option<NaiveDate>,
    bonus_type: BonusType,
    payment_year: i32,
    tax_residence_transfer: bool,
    rates: &BonusRates,
) -> Result<BonusResult, InputError> {
    let period = BonusPeriod::for_year(bonus_type, payment_year)?;
    let days_worked = period.days_worked(employment_start, employment_end);

    let full_amount = round_cents(bounded(monthly_salary) * period.full_amount_fraction);
    let gross_amount = if days_worked == period.total_days {
        full_amount
    } else {
        round_cents(Decimal::from(days_worked) * full_amount / Decimal::from(period.total_days))
    };
    let tax_rate = rates.effective_rate(tax_residence_transfer);
    let tax = round_cents(gross_amount * tax_rate);

    log::debug!(
        "{} bonus {}: {}/{} days, gross {}, tax {}",
        bonus_type,
        payment_year,
        days_worked,
        period.total_days,
        gross_amount,
        tax
    );

    Ok(BonusResult {
        period,
        days_worked,
        full_amount,
        gross_amount,
        tax_rate,
        tax,
        net_amount: gross_amount - tax,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BonusTotals {
    pub gross: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnualBonusReport {
    pub payment_year: i32,
    pub employment_start: NaiveDate,
    pub employment_end: Option<NaiveDate>,
    pub bonuses: Vec<BonusResult>,
    pub totals: BonusTotals,
}

/// All three bonuses for a payment year, with their totals.
pub fn compute_all_bonuses(
    monthly_salary: Decimal,
    employment_start: NaiveDate,
    employment_end: Option<NaiveDate>,
    payment_year: i32,
    tax_residence_transfer: bool,
    rates: &BonusRates,
) -> Result<AnnualBonusReport, InputError> {
    let bonuses = BonusType::ALL
        .iter()
        .map(|bonus_type| {
            compute_bonus_until(
                monthly_salary,
                employment_start,
                employment_end,
                *bonus_type,
                payment_year,
                tax_residence_transfer,
                rates,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let totals = BonusTotals {
        gross: bonuses.iter().map(|b| b.gross_amount).sum(),
        tax: bonuses.iter().map(|b| b.tax).sum(),
        net: bonuses.iter().map(|b| b.net_amount).sum(),
    };

    Ok(AnnualBonusReport {
        payment_year,
        employment_start,
        employment_end,
        bonuses,
        totals,
    })
}
