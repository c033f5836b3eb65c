//! Greek personal tax estimates: income tax, payroll withholding, holiday bonuses,
//! freelancer tax and gift tax.
//!
//! The engine in [`tax`] is a set of pure functions over immutable [`tax::TaxRates`];
//! [`request`] turns loosely typed form input into engine input.

pub mod batch;
pub mod money;
pub mod request;
pub mod tax;
