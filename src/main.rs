mod cmd;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "grtax",
    version,
    about = "Greek Tax Calculator for Income, Withholding, Holiday Bonuses and Gifts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annual income tax, contributions and net income
    IncomeTax(cmd::income::IncomeTaxCommand),
    /// Monthly payroll withholding for a salary
    Withholding(cmd::withholding::WithholdingCommand),
    /// Pro-rated Christmas, Easter and summer bonuses
    Bonus(cmd::bonus::BonusCommand),
    /// Tax on a gift, given earlier gifts from the same donor
    GiftTax(cmd::gift::GiftTaxCommand),
    /// Tax, insurance and business tax for a freelancer
    Freelancer(cmd::freelancer::FreelancerCommand),
    /// Gross salary needed for a desired net pay
    GrossFromNet(cmd::net::GrossFromNetCommand),
    /// Income tax for every row of a CSV file
    Batch(cmd::batch::BatchCommand),
    /// Show the rate tables for a tax year
    Rates(cmd::rates::RatesCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::IncomeTax(cmd) => cmd.exec(),
        Command::Withholding(cmd) => cmd.exec(),
        Command::Bonus(cmd) => cmd.exec(),
        Command::GiftTax(cmd) => cmd.exec(),
        Command::Freelancer(cmd) => cmd.exec(),
        Command::GrossFromNet(cmd) => cmd.exec(),
        Command::Batch(cmd) => cmd.exec(),
        Command::Rates(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
