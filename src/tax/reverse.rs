use super::income::{calculate_income_tax, CalculationInput, CalculationResult};
use super::rates::TaxRates;
use crate::money::max_amount;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Accepted distance between the achieved and desired monthly net
    pub tolerance: Decimal,
    pub max_iterations: u32,
    /// Upper search bound as a multiple of the desired annual net
    pub upper_multiplier: Decimal,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: dec!(0.01),
            max_iterations: 100,
            upper_multiplier: dec!(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveResult {
    pub desired_monthly_net: Decimal,
    pub result: CalculationResult,
    pub iterations: u32,
    pub converged: bool,
}

/// Find the gross annual salary whose monthly net matches `desired_monthly_net`.
///
/// Bisects between the desired annual net and `upper_multiplier` times it, evaluating
/// each midpoint with the forward calculation. All other inputs come from `template`.
/// When the tolerance is not reached within `max_iterations` the closest estimate is
/// returned with `converged` unset.
pub fn solve_gross_from_net(
    desired_monthly_net: Decimal,
    template: &CalculationInput,
    rates: &TaxRates,
    config: &SolverConfig,
) -> SolveResult {
    if desired_monthly_net <= Decimal::ZERO {
        return SolveResult {
            desired_monthly_net,
            result: calculate_income_tax(&template.with_gross(Decimal::ZERO), rates),
            iterations: 0,
            converged: true,
        };
    }

    let desired_monthly_net = desired_monthly_net.min(max_amount());
    let desired_annual_net = desired_monthly_net * Decimal::from(template.payment_schedule());
    let mut low = desired_annual_net;
    let mut high = desired_annual_net
        .checked_mul(config.upper_multiplier)
        .unwrap_or(Decimal::MAX)
        .max(low);

    let mut best: Option<(Decimal, CalculationResult)> = None;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        iterations += 1;
        let mid = low + (high - low) / dec!(2);
        let result = calculate_income_tax(&template.with_gross(mid), rates);
        let error = result.breakdown.monthly_net - desired_monthly_net;

        log::trace!(
            "iteration {}: gross {} gives monthly net {} ({:+})",
            iterations,
            mid,
            result.breakdown.monthly_net,
            error
        );

        let closer = best
            .as_ref()
            .map_or(true, |(best_error, _)| error.abs() < best_error.abs());
        if closer {
            best = Some((error, result));
        }

        if error.abs() < config.tolerance {
            break;
        }
        if error < Decimal::ZERO {
            low = mid;
        } else {
            high = mid;
        }
    }

    let (error, result) = match best {
        Some(best) => best,
        None => {
            let result = calculate_income_tax(&template.with_gross(low), rates);
            (result.breakdown.monthly_net - desired_monthly_net, result)
        }
    };
    let converged = error.abs() < config.tolerance;

    if converged {
        log::debug!(
            "gross {} reaches monthly net {} after {} iterations",
            result.gross_salary,
            desired_monthly_net,
            iterations
        );
    } else {
        log::warn!(
            "no gross salary within {} of monthly net {} after {} iterations, closest is {}",
            config.tolerance,
            desired_monthly_net,
            iterations,
            result.gross_salary
        );
    }

    SolveResult {
        desired_monthly_net,
        result,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::max_amount;
    use crate::tax::credits::DependentCount;
    use crate::tax::TaxYear;

    fn rates() -> TaxRates {
        TaxYear(2025).rates().unwrap()
    }

    #[test]
    fn recovers_gross_from_its_own_net() {
        let rates = rates();
        let template = CalculationInput::default();
        let forward = calculate_income_tax(&template.with_gross(dec!(20000)), &rates);
        let desired = forward.breakdown.monthly_net;

        let solved = solve_gross_from_net(desired, &template, &rates, &SolverConfig::default());

        assert!(solved.converged);
        assert!(solved.iterations <= 100);
        assert!((solved.result.breakdown.monthly_net - desired).abs() < dec!(0.01));
        assert!((solved.result.gross_salary - dec!(20000)).abs() < dec!(1));
    }

    #[test]
    fn solved_gross_round_trips_through_forward_engine() {
        let rates = rates();
        let template = CalculationInput {
            dependents: DependentCount(2),
            payments: 12,
            ..Default::default()
        };
        let forward = calculate_income_tax(&template.with_gross(dec!(42000)), &rates);
        let desired = forward.breakdown.monthly_net;

        let solved = solve_gross_from_net(desired, &template, &rates, &SolverConfig::default());
        let check = calculate_income_tax(&template.with_gross(solved.result.gross_salary), &rates);

        assert!(solved.converged);
        assert!((check.breakdown.monthly_net - desired).abs() < dec!(0.01));
    }

    #[test]
    fn zero_net_needs_zero_gross() {
        let solved = solve_gross_from_net(
            Decimal::ZERO,
            &CalculationInput::default(),
            &rates(),
            &SolverConfig::default(),
        );
        assert!(solved.converged);
        assert_eq!(solved.iterations, 0);
        assert_eq!(solved.result.gross_salary, Decimal::ZERO);
    }

    #[test]
    fn reports_non_convergence_instead_of_failing() {
        let config = SolverConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let solved = solve_gross_from_net(dec!(1500), &CalculationInput::default(), &rates(), &config);
        assert!(!solved.converged);
        assert_eq!(solved.iterations, 2);
        assert!(solved.result.gross_salary > Decimal::ZERO);
    }

    #[test]
    fn huge_desired_net_returns_capped_estimate() {
        let desired = Decimal::from_scientific("5e27").unwrap();
        let solved =
            solve_gross_from_net(desired, &CalculationInput::default(), &rates(), &SolverConfig::default());
        assert!(!solved.converged);
        assert_eq!(solved.desired_monthly_net, max_amount());
        assert_eq!(solved.result.gross_salary, max_amount());
    }

    #[test]
    fn huge_upper_multiplier_does_not_overflow() {
        let config = SolverConfig {
            upper_multiplier: Decimal::MAX,
            ..Default::default()
        };
        let solved = solve_gross_from_net(dec!(1200), &CalculationInput::default(), &rates(), &config);
        assert!(solved.result.gross_salary > Decimal::ZERO);
    }
}
