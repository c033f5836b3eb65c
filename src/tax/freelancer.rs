use super::brackets::apply_progressive_brackets;
use super::contributions::self_employed_contribution;
use super::credits::{compute_tax_credit, DependentCount};
use super::input::InputError;
use super::rates::TaxRates;
use crate::money::{bounded, non_negative, percentage};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    EngineersArchitects,
    MedicalProfessionals,
    Lawyers,
    Accountants,
    OtherServices,
    Traders,
}

impl Profession {
    pub fn display(&self) -> &'static str {
        match self {
            Profession::EngineersArchitects => "engineers_architects",
            Profession::MedicalProfessionals => "medical_professionals",
            Profession::Lawyers => "lawyers",
            Profession::Accountants => "accountants",
            Profession::OtherServices => "other_services",
            Profession::Traders => "traders",
        }
    }
}

impl FromStr for Profession {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "engineers_architects" | "engineer" | "engineers" | "architect" | "architects" => {
                Ok(Profession::EngineersArchitects)
            }
            "medical_professionals" | "medical" | "doctor" | "doctors" => {
                Ok(Profession::MedicalProfessionals)
            }
            "lawyers" | "lawyer" => Ok(Profession::Lawyers),
            "accountants" | "accountant" => Ok(Profession::Accountants),
            "other_services" | "other" => Ok(Profession::OtherServices),
            "traders" | "trader" => Ok(Profession::Traders),
            _ => Err(InputError::UnknownProfession(s.to_string())),
        }
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Where the business is registered; the two largest cities pay a higher business tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Athens,
    Thessaloniki,
    #[default]
    Other,
}

impl City {
    pub fn is_major(&self) -> bool {
        matches!(self, City::Athens | City::Thessaloniki)
    }
}

impl FromStr for City {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "athens" | "athina" => City::Athens,
            "thessaloniki" => City::Thessaloniki,
            _ => City::Other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreelancerRates {
    /// Deductible share of revenue by profession
    pub expense_rates: BTreeMap<Profession, Decimal>,
    pub default_expense_rate: Decimal,
    pub business_tax: Decimal,
    pub business_tax_major_city: Decimal,
}

impl FreelancerRates {
    pub fn business_tax_for(&self, city: City) -> Decimal {
        if city.is_major() {
            self.business_tax_major_city
        } else {
            self.business_tax
        }
    }
}

/// How deductible expenses are worked out, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpenseBasis {
    /// Actual expenses in euros
    Amount(Decimal),
    Profession(Profession),
    /// Share of revenue
    Rate(Decimal),
    #[default]
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FreelancerInput {
    pub annual_revenue: Decimal,
    pub expenses: ExpenseBasis,
    pub dependents: DependentCount,
    pub age: Option<u32>,
    pub city: City,
    /// Halves the income tax; business tax is unaffected
    pub tax_residence_transfer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreelancerBreakdown {
    pub monthly_revenue: Decimal,
    pub monthly_net: Decimal,
    pub monthly_insurance: Decimal,
    pub monthly_tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreelancerResult {
    pub revenue: Decimal,
    pub deductible_expenses: Decimal,
    pub net_professional_income: Decimal,
    pub social_insurance: Decimal,
    pub taxable_income: Decimal,
    pub base_tax: Decimal,
    pub tax_credit: Decimal,
    pub income_tax: Decimal,
    pub business_tax: Decimal,
    pub total_tax_and_insurance: Decimal,
    pub net_income: Decimal,
    pub effective_tax_rate: Decimal,
    pub breakdown: FreelancerBreakdown,
}

pub fn deductible_expenses(revenue: Decimal, basis: ExpenseBasis, rates: &FreelancerRates) -> Decimal {
    let expenses = match basis {
        ExpenseBasis::Amount(amount) => amount,
        ExpenseBasis::Profession(profession) => {
            let rate = rates
                .expense_rates
                .get(&profession)
                .copied()
                .unwrap_or(rates.default_expense_rate);
            revenue * rate
        }
        ExpenseBasis::Rate(rate) => revenue * rate.min(Decimal::ONE),
        ExpenseBasis::Default => revenue * rates.default_expense_rate,
    };
    non_negative(expenses).min(revenue)
}

/// Income tax, social insurance and business tax for a self-employed professional.
pub fn calculate_freelancer_tax(input: &FreelancerInput, rates: &TaxRates) -> FreelancerResult {
    let revenue = bounded(input.annual_revenue);
    let deductible_expenses = deductible_expenses(revenue, input.expenses, &rates.freelancer);
    let net_professional_income = non_negative(revenue - deductible_expenses);

    let social_insurance = self_employed_contribution(
        net_professional_income,
        &rates.self_employed,
        rates.contributions.monthly_cap,
    );
    let taxable_income = non_negative(net_professional_income - social_insurance);

    let brackets = rates.salary_brackets(input.age);
    let base_tax = apply_progressive_brackets(taxable_income, &brackets);
    let credit = compute_tax_credit(input.dependents, taxable_income, &rates.credits);
    let income_tax =
        rates.residence_adjusted(non_negative(base_tax - credit), input.tax_residence_transfer);
    let business_tax = rates.freelancer.business_tax_for(input.city);

    let total_tax_and_insurance = income_tax + social_insurance + business_tax;
    let net_income = non_negative(revenue - deductible_expenses - total_tax_and_insurance);

    log::debug!(
        "freelancer revenue {}: expenses {}, insurance {}, income tax {}, business tax {}",
        revenue,
        deductible_expenses,
        social_insurance,
        income_tax,
        business_tax
    );

    let months = Decimal::from(12);
    FreelancerResult {
        revenue,
        deductible_expenses,
        net_professional_income,
        social_insurance,
        taxable_income,
        base_tax,
        tax_credit: credit.min(base_tax),
        income_tax,
        business_tax,
        total_tax_and_insurance,
        net_income,
        effective_tax_rate: percentage(total_tax_and_insurance, revenue),
        breakdown: FreelancerBreakdown {
            monthly_revenue: revenue / months,
            monthly_net: net_income / months,
            monthly_insurance: social_insurance / months,
            monthly_tax: (income_tax + business_tax) / months,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::TaxYear;
    use rust_decimal_macros::dec;

    fn rates() -> TaxRates {
        TaxYear(2025).rates().unwrap()
    }

    #[test]
    fn expenses_by_profession() {
        let rates = rates().freelancer;
        let revenue = dec!(50000);
        assert_eq!(
            deductible_expenses(revenue, ExpenseBasis::Profession(Profession::EngineersArchitects), &rates),
            dec!(20000)
        );
        assert_eq!(
            deductible_expenses(revenue, ExpenseBasis::Profession(Profession::Traders), &rates),
            dec!(5000)
        );
        assert_eq!(deductible_expenses(revenue, ExpenseBasis::Default, &rates), dec!(10000));
        assert_eq!(deductible_expenses(revenue, ExpenseBasis::Rate(dec!(0.25)), &rates), dec!(12500));
    }

    #[test]
    fn expense_amount_cannot_exceed_revenue() {
        let rates = rates().freelancer;
        assert_eq!(
            deductible_expenses(dec!(10000), ExpenseBasis::Amount(dec!(15000)), &rates),
            dec!(10000)
        );
        assert_eq!(
            deductible_expenses(dec!(10000), ExpenseBasis::Amount(dec!(-5)), &rates),
            Decimal::ZERO
        );
    }

    #[test]
    fn engineer_in_athens() {
        let input = FreelancerInput {
            annual_revenue: dec!(50000),
            expenses: ExpenseBasis::Profession(Profession::EngineersArchitects),
            city: City::Athens,
            ..Default::default()
        };
        let result = calculate_freelancer_tax(&input, &rates());

        assert_eq!(result.net_professional_income, dec!(30000));
        assert_eq!(result.social_insurance, dec!(8130));
        assert_eq!(result.taxable_income, dec!(21870));
        // 900 + 2200 + 1870 * 0.28
        assert_eq!(result.base_tax, dec!(3623.6));
        // 777 - 9 * 20
        assert_eq!(result.tax_credit, dec!(597));
        assert_eq!(result.income_tax, dec!(3026.6));
        assert_eq!(result.business_tax, dec!(1000));
        assert_eq!(result.total_tax_and_insurance, dec!(12156.6));
        assert_eq!(result.net_income, dec!(17843.4));
        assert_eq!(result.breakdown.monthly_tax, dec!(335.55));
    }

    #[test]
    fn minimum_insurance_applies_to_small_revenue() {
        let input = FreelancerInput {
            annual_revenue: dec!(3000),
            ..Default::default()
        };
        let result = calculate_freelancer_tax(&input, &rates());
        assert_eq!(result.social_insurance, dec!(2763.48));
        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.income_tax, Decimal::ZERO);
        assert_eq!(result.business_tax, dec!(650));
        assert_eq!(result.net_income, Decimal::ZERO);
    }

    #[test]
    fn zero_revenue_has_zero_effective_rate() {
        let result = calculate_freelancer_tax(&FreelancerInput::default(), &rates());
        assert_eq!(result.effective_tax_rate, Decimal::ZERO);
        assert_eq!(result.net_income, Decimal::ZERO);
    }

    #[test]
    fn parses_professions_and_cities() {
        assert_eq!(
            "engineers-architects".parse::<Profession>().unwrap(),
            Profession::EngineersArchitects
        );
        assert_eq!("Lawyer".parse::<Profession>().unwrap(), Profession::Lawyers);
        assert!("astronaut".parse::<Profession>().is_err());
        assert_eq!("Athens".parse::<City>().unwrap(), City::Athens);
        assert_eq!("Patras".parse::<City>().unwrap(), City::Other);
    }

    #[test]
    fn residence_transfer_halves_income_tax_only() {
        let input = FreelancerInput {
            annual_revenue: dec!(50000),
            expenses: ExpenseBasis::Profession(Profession::EngineersArchitects),
            city: City::Athens,
            tax_residence_transfer: true,
            ..Default::default()
        };
        let result = calculate_freelancer_tax(&input, &rates());
        assert_eq!(result.income_tax, dec!(1513.3));
        assert_eq!(result.business_tax, dec!(1000));
        assert_eq!(result.net_income, dec!(19356.7));
    }

    #[test]
    fn expense_rate_above_one_is_capped_at_revenue() {
        let rates = rates().freelancer;
        assert_eq!(
            deductible_expenses(dec!(20000), ExpenseBasis::Rate(dec!(40)), &rates),
            dec!(20000)
        );
    }
}
