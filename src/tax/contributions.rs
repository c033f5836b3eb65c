use crate::money::non_negative;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Social-insurance rates for salaried employment (EFKA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRates {
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    /// Maximum monthly insurable earnings
    pub monthly_cap: Decimal,
}

impl ContributionRates {
    /// Annual insurable ceiling for a given payment schedule.
    pub fn annual_cap(&self, payments: u32) -> Decimal {
        self.monthly_cap * Decimal::from(payments)
    }
}

/// Social-insurance rates for self-employed professional income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmployedRates {
    pub rate: Decimal,
    /// Owed every month regardless of how low professional income is
    pub minimum_monthly: Decimal,
    /// Number of monthly caps making up the annual ceiling
    pub cap_payments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Contributions {
    pub employee: Decimal,
    pub employer: Decimal,
}

impl Contributions {
    pub fn scale(self, factor: Decimal) -> Self {
        Contributions {
            employee: self.employee * factor,
            employer: self.employer * factor,
        }
    }
}

/// Contributions for a single monthly payment.
///
/// Rates apply to the salary up to the monthly cap, so contributions stop growing once
/// the salary passes it.
pub fn compute_contributions(monthly_salary: Decimal, rates: &ContributionRates) -> Contributions {
    let base = non_negative(monthly_salary).min(rates.monthly_cap);
    Contributions {
        employee: base * rates.employee_rate,
        employer: base * rates.employer_rate,
    }
}

/// Annual contributions for a gross salary paid in `payments` equal instalments.
pub fn annual_contributions(
    gross_annual: Decimal,
    payments: u32,
    rates: &ContributionRates,
) -> Contributions {
    if payments == 0 {
        return Contributions::default();
    }
    let payments = Decimal::from(payments);
    compute_contributions(gross_annual / payments, rates).scale(payments)
}

/// Annual self-employed contribution on net professional income.
///
/// The insurable base is capped at the salaried monthly cap times `cap_payments`; the
/// result never drops below twelve minimum monthly contributions.
pub fn self_employed_contribution(
    net_professional_income: Decimal,
    rates: &SelfEmployedRates,
    monthly_cap: Decimal,
) -> Decimal {
    let annual_cap = monthly_cap * Decimal::from(rates.cap_payments);
    let base = non_negative(net_professional_income).min(annual_cap);
    let floor = rates.minimum_monthly * Decimal::from(12);
    (base * rates.rate).max(floor)
}
