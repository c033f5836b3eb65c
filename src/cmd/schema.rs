//! Schema command - print expected input formats

use clap::{Args, ValueEnum};
use grtax::batch::BatchRecord;
use grtax::request::{
    FreelancerRequest, GiftTaxRequest, GrossFromNetRequest, HolidayBonusRequest,
    IncomeTaxRequest, WithholdingRequest,
};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,

    /// Request record to describe with json-schema
    #[arg(short, long, value_enum, default_value = "income-tax")]
    request: RequestKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for a request record
    JsonSchema,
    /// CSV header row for the batch command
    CsvHeader,
    /// CSV column descriptions for the batch command
    CsvFields,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RequestKind {
    IncomeTax,
    Withholding,
    Bonus,
    GiftTax,
    Freelancer,
    GrossFromNet,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => {
                println!("{}", BatchRecord::csv_header());
                Ok(())
            }
            SchemaFormat::CsvFields => {
                print_csv_fields();
                Ok(())
            }
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = match self.request {
            RequestKind::IncomeTax => schema_for!(IncomeTaxRequest),
            RequestKind::Withholding => schema_for!(WithholdingRequest),
            RequestKind::Bonus => schema_for!(HolidayBonusRequest),
            RequestKind::GiftTax => schema_for!(GiftTaxRequest),
            RequestKind::Freelancer => schema_for!(FreelancerRequest),
            RequestKind::GrossFromNet => schema_for!(GrossFromNetRequest),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}

fn print_csv_fields() {
    println!("CSV Input Format");
    println!("================");
    println!();
    for field in BatchRecord::csv_schema() {
        let req = if field.required { "required" } else { "optional" };
        println!("{:20} ({:8})  {}", field.name, req, field.description);
    }
    println!();
    println!("Amounts may include a euro sign; unparseable amounts count as 0");
}
