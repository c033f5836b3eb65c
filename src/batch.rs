//! Batch income-tax calculation over CSV rows.

use crate::money::round_cents;
use crate::tax::credits::DependentCount;
use crate::tax::income::{calculate_income_tax, CalculationInput, EmploymentCategory, DEFAULT_PAYMENTS};
use crate::tax::input::{deserialize_flag, Amount, InputError};
use crate::tax::rates::TaxRates;
use grtax_derive::CsvSchema;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// One column of a CSV format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("row {row}: {source}")]
    Input { row: usize, source: InputError },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Input row for `grtax batch`.
#[derive(Debug, Clone, Default, Deserialize, CsvSchema)]
pub struct BatchRecord {
    /// Identifier copied to the output row
    #[serde(default)]
    pub id: Option<String>,
    /// Gross annual income; takes precedence over monthly_salary
    pub gross_annual: Option<Amount>,
    /// Gross salary per payment
    pub monthly_salary: Option<Amount>,
    /// Salary payments per year (default 14)
    pub payments: Option<Amount>,
    /// Dependent children, 0-3 or 4+
    pub dependents: Option<String>,
    /// Taxpayer age, enables youth relief where the year has it
    pub age: Option<Amount>,
    /// employed, self-employed, pensioner or rental (default employed)
    pub category: Option<String>,
    /// true when the tax-residence transfer incentive applies
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub residence_transfer: bool,
}

impl BatchRecord {
    pub fn to_input(&self) -> Result<CalculationInput, InputError> {
        let payments = self
            .payments
            .and_then(Amount::as_count)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAYMENTS);
        let gross_annual_salary = match (self.gross_annual, self.monthly_salary) {
            (Some(gross), _) if gross.value() > Decimal::ZERO => gross.value(),
            (_, Some(monthly)) => monthly.value() * Decimal::from(payments),
            _ => Decimal::ZERO,
        };
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => EmploymentCategory::default(),
            Some(s) => s.parse::<EmploymentCategory>()?,
        };

        Ok(CalculationInput {
            gross_annual_salary,
            dependents: self
                .dependents
                .as_deref()
                .map(DependentCount::parse_lenient)
                .unwrap_or_default(),
            age: self.age.and_then(Amount::as_count).filter(|a| *a > 0),
            tax_residence_transfer: self.residence_transfer,
            payments,
            category,
        })
    }
}

/// Output row, amounts rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRow {
    pub id: String,
    pub category: EmploymentCategory,
    pub gross_salary: Decimal,
    pub employee_contributions: Decimal,
    pub employer_contributions: Decimal,
    pub taxable_income: Decimal,
    pub tax_credit: Decimal,
    pub income_tax: Decimal,
    pub net_income: Decimal,
    pub effective_tax_rate: Decimal,
    pub monthly_net: Decimal,
    pub monthly_tax: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub total_gross: Decimal,
    pub total_tax: Decimal,
    pub total_net: Decimal,
}

pub fn calculate_rows<R: Read>(reader: R, rates: &TaxRates) -> Result<Vec<BatchRow>, BatchError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in rdr.deserialize::<BatchRecord>().enumerate() {
        // header is line 1
        let line = index + 2;
        let record = record?;
        let input = record
            .to_input()
            .map_err(|source| BatchError::Input { row: line, source })?;
        let result = calculate_income_tax(&input, rates);

        rows.push(BatchRow {
            id: record.id.unwrap_or_else(|| (index + 1).to_string()),
            category: result.category,
            gross_salary: round_cents(result.gross_salary),
            employee_contributions: round_cents(result.employee_contributions),
            employer_contributions: round_cents(result.employer_contributions),
            taxable_income: round_cents(result.taxable_income),
            tax_credit: round_cents(result.tax_credit),
            income_tax: round_cents(result.income_tax),
            net_income: round_cents(result.net_income),
            effective_tax_rate: round_cents(result.effective_tax_rate),
            monthly_net: round_cents(result.breakdown.monthly_net),
            monthly_tax: round_cents(result.breakdown.monthly_tax),
        });
    }
    log::info!("Calculated {} batch rows", rows.len());
    Ok(rows)
}

pub fn summarize(rows: &[BatchRow]) -> BatchSummary {
    rows.iter().fold(
        BatchSummary::default(),
        |summary, row| BatchSummary {
            rows: summary.rows + 1,
            total_gross: summary.total_gross + row.gross_salary,
            total_tax: summary.total_tax + row.income_tax,
            total_net: summary.total_net + row.net_income,
        },
    )
}

pub fn write_csv<I, R, W>(records: I, writer: W) -> Result<(), BatchError>
where
    I: IntoIterator<Item = R>,
    R: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records.into_iter() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::TaxYear;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const CSV: &str = "\
id,gross_annual,monthly_salary,payments,dependents,age,category,residence_transfer
alice,14000,,,0,,,
bob,,2000,12,2,,,false
carol,20000,,,,,rental,
dave,,1000,,4+,,pensioner,yes
";

    fn rates() -> TaxRates {
        TaxYear(2025).rates().unwrap()
    }

    #[test]
    fn schema_lists_columns_in_order() {
        let names: Vec<_> = BatchRecord::csv_schema().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "gross_annual",
                "monthly_salary",
                "payments",
                "dependents",
                "age",
                "category",
                "residence_transfer"
            ]
        );
        assert_eq!(
            BatchRecord::csv_header(),
            "id,gross_annual,monthly_salary,payments,dependents,age,category,residence_transfer"
        );
        assert!(BatchRecord::csv_schema().iter().all(|f| !f.required));
        assert_eq!(
            BatchRecord::csv_schema()[0].description,
            "Identifier copied to the output row"
        );
    }

    #[test]
    fn calculates_each_row() {
        let rows = calculate_rows(CSV.as_bytes(), &rates()).unwrap();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].id, "alice");
        assert_eq!(rows[0].employee_contributions, dec!(1871.80));
        assert_eq!(rows[0].income_tax, dec!(591.20));

        assert_eq!(rows[1].gross_salary, dec!(24000));
        assert_eq!(rows[1].employee_contributions, dec!(3208.80));

        assert_eq!(rows[2].category, EmploymentCategory::Rental);
        assert_eq!(rows[2].income_tax, dec!(4600));

        assert_eq!(rows[3].category, EmploymentCategory::Pensioner);
        assert_eq!(rows[3].gross_salary, dec!(14000));
        assert_eq!(rows[3].employee_contributions, Decimal::ZERO);
    }

    #[test]
    fn bad_category_reports_line() {
        let csv = "id,gross_annual,category\nx,1000,employed\ny,1000,astronaut\n";
        let err = calculate_rows(csv.as_bytes(), &rates()).unwrap_err();
        assert_eq!(err.to_string(), "row 3: unknown employment category 'astronaut'");
    }

    #[test]
    fn summary_totals() {
        let rows = calculate_rows(CSV.as_bytes(), &rates()).unwrap();
        let summary = summarize(&rows);
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.total_gross, dec!(72000));
        assert_eq!(
            summary.total_tax,
            rows.iter().map(|r| r.income_tax).sum::<Decimal>()
        );
    }

    #[test]
    fn writes_rows_as_csv() {
        let rows = calculate_rows("id,gross_annual\na,14000\n".as_bytes(), &rates()).unwrap();
        let mut out = Vec::new();
        write_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,category,gross_salary,employee_contributions,employer_contributions,taxable_income,tax_credit,income_tax,net_income,effective_tax_rate,monthly_net,monthly_tax")
        );
        assert!(lines.next().unwrap().starts_with("a,employed,14000"));
    }
}
