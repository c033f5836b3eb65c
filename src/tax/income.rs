use super::brackets::apply_progressive_brackets;
use super::contributions::{annual_contributions, Contributions};
use super::credits::{compute_tax_credit, DependentCount};
use super::freelancer::{calculate_freelancer_tax, FreelancerInput};
use super::input::InputError;
use super::rates::TaxRates;
use crate::money::{bounded, non_negative, percentage};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Twelve monthly salaries plus the Christmas, Easter and summer payments.
pub const DEFAULT_PAYMENTS: u32 = 14;

/// Withholding is always spread over the calendar months, whatever the pay schedule.
pub const WITHHOLDING_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentCategory {
    #[default]
    Employed,
    SelfEmployed,
    Pensioner,
    Rental,
}

impl EmploymentCategory {
    pub fn display(&self) -> &'static str {
        match self {
            EmploymentCategory::Employed => "employed",
            EmploymentCategory::SelfEmployed => "self-employed",
            EmploymentCategory::Pensioner => "pensioner",
            EmploymentCategory::Rental => "rental",
        }
    }
}

impl FromStr for EmploymentCategory {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "employed" | "employee" | "salaried" | "full-time" | "part-time" => {
                Ok(EmploymentCategory::Employed)
            }
            "self-employed" | "freelancer" | "freelance" => Ok(EmploymentCategory::SelfEmployed),
            "pensioner" | "pension" | "retired" => Ok(EmploymentCategory::Pensioner),
            "rental" | "rent" | "landlord" => Ok(EmploymentCategory::Rental),
            _ => Err(InputError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for EmploymentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationInput {
    pub gross_annual_salary: Decimal,
    pub dependents: DependentCount,
    pub age: Option<u32>,
    pub tax_residence_transfer: bool,
    /// Salary payments per year, usually 14
    pub payments: u32,
    pub category: EmploymentCategory,
}

impl Default for CalculationInput {
    fn default() -> Self {
        CalculationInput {
            gross_annual_salary: Decimal::ZERO,
            dependents: DependentCount::default(),
            age: None,
            tax_residence_transfer: false,
            payments: DEFAULT_PAYMENTS,
            category: EmploymentCategory::default(),
        }
    }
}

impl CalculationInput {
    pub fn with_gross(&self, gross_annual_salary: Decimal) -> Self {
        CalculationInput {
            gross_annual_salary,
            ..self.clone()
        }
    }

    /// Salary payments per year, treating zero as the default schedule.
    pub fn payment_count(&self) -> u32 {
        if self.payments == 0 {
            DEFAULT_PAYMENTS
        } else {
            self.payments
        }
    }

    /// Number of periods the monthly net is spread over.
    pub fn payment_schedule(&self) -> u32 {
        match self.category {
            EmploymentCategory::SelfEmployed => WITHHOLDING_MONTHS,
            _ => self.payment_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBreakdown {
    pub monthly_gross: Decimal,
    pub monthly_net: Decimal,
    pub monthly_employee_contributions: Decimal,
    pub monthly_employer_contributions: Decimal,
    /// Annual tax over twelve months
    pub monthly_tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    pub category: EmploymentCategory,
    pub payments: u32,
    pub gross_salary: Decimal,
    pub employee_contributions: Decimal,
    pub employer_contributions: Decimal,
    /// Freelancer expenses; zero for the other categories
    pub deductible_expenses: Decimal,
    pub taxable_income: Decimal,
    pub base_tax: Decimal,
    pub tax_credit: Decimal,
    /// Business tax for self-employed income; included in `income_tax`
    pub business_tax: Decimal,
    pub income_tax: Decimal,
    pub net_income: Decimal,
    /// Income tax as a percentage of gross
    pub effective_tax_rate: Decimal,
    pub marginal_rate: Decimal,
    pub breakdown: MonthlyBreakdown,
}

/// Annual income tax, contributions and net pay for one taxpayer.
pub fn calculate_income_tax(input: &CalculationInput, rates: &TaxRates) -> CalculationResult {
    match input.category {
        EmploymentCategory::Employed | EmploymentCategory::Pensioner => {
            calculate_salaried(input, rates)
        }
        EmploymentCategory::Rental => calculate_rental(input, rates),
        EmploymentCategory::SelfEmployed => calculate_self_employed(input, rates),
    }
}

fn calculate_salaried(input: &CalculationInput, rates: &TaxRates) -> CalculationResult {
    let payments = input.payment_count();
    let gross = bounded(input.gross_annual_salary);

    // pension income carries no insurance contributions here
    let contributions = match input.category {
        EmploymentCategory::Pensioner => Contributions::default(),
        _ => annual_contributions(gross, payments, &rates.contributions),
    };
    let taxable_income = non_negative(gross - contributions.employee);

    let brackets = rates.salary_brackets(input.age);
    let base_tax = apply_progressive_brackets(taxable_income, &brackets);
    let credit = compute_tax_credit(input.dependents, taxable_income, &rates.credits);
    let income_tax =
        rates.residence_adjusted(non_negative(base_tax - credit), input.tax_residence_transfer);

    log::debug!(
        "{} gross {}: contributions {}, taxable {}, base tax {}, credit {}, tax {}",
        input.category,
        gross,
        contributions.employee,
        taxable_income,
        base_tax,
        credit,
        income_tax
    );

    build_result(
        input,
        payments,
        gross,
        contributions,
        Decimal::ZERO,
        taxable_income,
        base_tax,
        credit.min(base_tax),
        Decimal::ZERO,
        income_tax,
        brackets.marginal_rate(taxable_income),
    )
}

fn calculate_rental(input: &CalculationInput, rates: &TaxRates) -> CalculationResult {
    let payments = input.payment_count();
    let gross = bounded(input.gross_annual_salary);
    let base_tax = apply_progressive_brackets(gross, &rates.rental_brackets);
    let income_tax = rates.residence_adjusted(base_tax, input.tax_residence_transfer);

    build_result(
        input,
        payments,
        gross,
        Contributions::default(),
        Decimal::ZERO,
        gross,
        base_tax,
        Decimal::ZERO,
        Decimal::ZERO,
        income_tax,
        rates.rental_brackets.marginal_rate(gross),
    )
}

fn calculate_self_employed(input: &CalculationInput, rates: &TaxRates) -> CalculationResult {
    let freelancer = calculate_freelancer_tax(
        &FreelancerInput {
            annual_revenue: input.gross_annual_salary,
            dependents: input.dependents,
            age: input.age,
            tax_residence_transfer: input.tax_residence_transfer,
            ..Default::default()
        },
        rates,
    );
    let marginal_rate = rates
        .salary_brackets(input.age)
        .marginal_rate(freelancer.taxable_income);

    build_result(
        input,
        input.payment_schedule(),
        freelancer.revenue,
        Contributions {
            employee: freelancer.social_insurance,
            employer: Decimal::ZERO,
        },
        freelancer.deductible_expenses,
        freelancer.taxable_income,
        freelancer.base_tax,
        freelancer.tax_credit,
        freelancer.business_tax,
        freelancer.income_tax + freelancer.business_tax,
        marginal_rate,
    )
}

#[allow(clippy::too_many_arguments)]
fn build_result(
    input: &CalculationInput,
    payments: u32,
    gross: Decimal,
    contributions: Contributions,
    deductible_expenses: Decimal,
    taxable_income: Decimal,
    base_tax: Decimal,
    tax_credit: Decimal,
    business_tax: Decimal,
    income_tax: Decimal,
    marginal_rate: Decimal,
) -> CalculationResult {
    let net_income =
        non_negative(gross - deductible_expenses - contributions.employee - income_tax);
    let schedule = Decimal::from(payments);

    CalculationResult {
        category: input.category,
        payments,
        gross_salary: gross,
        employee_contributions: contributions.employee,
        employer_contributions: contributions.employer,
        deductible_expenses,
        taxable_income,
        base_tax,
        tax_credit,
        business_tax,
        income_tax,
        net_income,
        effective_tax_rate: percentage(income_tax, gross),
        marginal_rate,
        breakdown: MonthlyBreakdown {
            monthly_gross: gross / schedule,
            monthly_net: net_income / schedule,
            monthly_employee_contributions: contributions.employee / schedule,
            monthly_employer_contributions: contributions.employer / schedule,
            monthly_tax: income_tax / Decimal::from(WITHHOLDING_MONTHS),
        },
    }
}

/// Payroll view of the annual calculation for a fixed monthly salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithholdingResult {
    pub monthly_salary: Decimal,
    pub monthly_net: Decimal,
    pub monthly_tax: Decimal,
    pub monthly_insurance: Decimal,
    pub annual_gross: Decimal,
    pub annual_net: Decimal,
    pub annual_tax: Decimal,
    pub annual_insurance: Decimal,
    pub effective_tax_rate: Decimal,
    /// Shares of the annual gross
    pub insurance_percentage: Decimal,
    pub tax_percentage: Decimal,
    pub net_percentage: Decimal,
}

/// Monthly withholding for a salary paid on the template's payment schedule.
///
/// `template` supplies everything except the gross, which is the monthly salary times
/// the number of periods it is spread over (twelve for self-employed income).
pub fn calculate_withholding(
    monthly_salary: Decimal,
    template: &CalculationInput,
    rates: &TaxRates,
) -> WithholdingResult {
    let monthly_salary = bounded(monthly_salary);
    let input = template.with_gross(monthly_salary * Decimal::from(template.payment_schedule()));
    let result = calculate_income_tax(&input, rates);

    WithholdingResult {
        monthly_salary: result.breakdown.monthly_gross,
        monthly_net: result.breakdown.monthly_net,
        monthly_tax: result.breakdown.monthly_tax,
        monthly_insurance: result.breakdown.monthly_employee_contributions,
        annual_gross: result.gross_salary,
        annual_net: result.net_income,
        annual_tax: result.income_tax,
        annual_insurance: result.employee_contributions,
        effective_tax_rate: result.effective_tax_rate,
        insurance_percentage: percentage(result.employee_contributions, result.gross_salary),
        tax_percentage: percentage(result.income_tax, result.gross_salary),
        net_percentage: percentage(result.net_income, result.gross_salary),
    }
}
