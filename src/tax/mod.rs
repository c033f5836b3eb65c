pub mod bonus;
pub mod brackets;
pub mod contributions;
pub mod credits;
pub mod freelancer;
pub mod gift;
pub mod income;
pub mod input;
pub mod rates;
pub mod reverse;

pub use bonus::{compute_all_bonuses, compute_bonus, AnnualBonusReport, BonusResult, BonusType};
pub use brackets::{apply_progressive_brackets, BracketTable, TaxBracket};
pub use contributions::{compute_contributions, Contributions};
pub use credits::{compute_tax_credit, DependentCount};
pub use freelancer::{calculate_freelancer_tax, FreelancerInput, FreelancerResult};
pub use gift::{calculate_gift_tax, GiftCategory, GiftInput, GiftResult};
pub use income::{
    calculate_income_tax, calculate_withholding, CalculationInput, CalculationResult,
    EmploymentCategory, WithholdingResult,
};
pub use input::{Amount, InputError};
pub use rates::{RatesError, TaxRates, TaxYear};
pub use reverse::{solve_gross_from_net, SolveResult, SolverConfig};
