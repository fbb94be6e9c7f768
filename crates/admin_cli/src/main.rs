use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{CreditorKind, Currency, Engine, Money, NewCreditor, NewRepresentative};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "backoffice_admin")]
#[command(about = "Admin utilities for the back office (creditors, representatives, repairs)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./backoffice.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Creditor(Creditor),
    Representative(Representative),
}

#[derive(Args, Debug)]
struct Creditor {
    #[command(subcommand)]
    command: CreditorCommand,
}

#[derive(Subcommand, Debug)]
enum CreditorCommand {
    Create(CreditorCreateArgs),
    List,
    /// Re-derive a creditor's cached total from its ledger.
    Recompute(RecomputeArgs),
}

#[derive(Args, Debug)]
struct CreditorCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "LYD", value_parser = parse_currency)]
    currency: Currency,
    #[arg(long, default_value = "company", value_parser = parse_kind)]
    kind: CreditorKind,
    #[arg(long)]
    phone: Option<String>,
    /// Opening balance, e.g. `1500.50`. Booked as a cash entry.
    #[arg(long, default_value = "0", value_parser = parse_money, allow_hyphen_values = true)]
    initial_balance: Money,
}

#[derive(Args, Debug)]
struct RecomputeArgs {
    #[arg(long)]
    id: Uuid,
}

#[derive(Args, Debug)]
struct Representative {
    #[command(subcommand)]
    command: RepresentativeCommand,
}

#[derive(Subcommand, Debug)]
enum RepresentativeCommand {
    Create(RepresentativeCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct RepresentativeCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: Option<String>,
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

fn parse_kind(raw: &str) -> Result<CreditorKind, String> {
    CreditorKind::try_from(raw.trim().to_ascii_lowercase().as_str()).map_err(|err| err.to_string())
}

fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse::<Money>().map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Creditor(Creditor { command }) => match command {
            CreditorCommand::Create(args) => {
                let mut cmd = NewCreditor::new(args.name)
                    .kind(args.kind)
                    .currency(args.currency);
                if let Some(phone) = args.phone {
                    cmd = cmd.phone(phone);
                }
                let creditor = engine.add_creditor(cmd, args.initial_balance).await?;
                println!(
                    "created creditor: {} ({}) total {} {}",
                    creditor.name, creditor.id, creditor.total_debt, creditor.currency
                );
            }
            CreditorCommand::List => {
                for creditor in engine.creditors().await? {
                    println!(
                        "{}\t{}\t{}\t{} {}",
                        creditor.id,
                        creditor.name,
                        creditor.kind.as_str(),
                        creditor.total_debt,
                        creditor.currency
                    );
                }
            }
            CreditorCommand::Recompute(args) => {
                let before = engine.creditor(args.id).await?.total_debt;
                let after = engine.recompute_creditor_total(args.id).await?;
                if before == after {
                    println!("total already consistent: {after}");
                } else {
                    println!("total repaired: {before} -> {after}");
                }
            }
        },
        Command::Representative(Representative { command }) => match command {
            RepresentativeCommand::Create(args) => {
                let mut cmd = NewRepresentative::new(args.name);
                if let Some(phone) = args.phone {
                    cmd = cmd.phone(phone);
                }
                let representative = engine.add_representative(cmd).await?;
                println!(
                    "created representative: {} ({})",
                    representative.name, representative.id
                );
            }
            RepresentativeCommand::List => {
                for representative in engine.representatives().await? {
                    println!(
                        "{}\t{}\t{}",
                        representative.id,
                        representative.name,
                        representative.phone.as_deref().unwrap_or("-")
                    );
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn creditor_create_parses_amount_and_currency() {
        let cli = Cli::try_parse_from([
            "backoffice_admin",
            "--database-url",
            "sqlite::memory:",
            "creditor",
            "create",
            "--name",
            "Al Noor",
            "--currency",
            "usd",
            "--initial-balance",
            "-12,50",
        ])
        .unwrap();
        let Command::Creditor(Creditor {
            command: CreditorCommand::Create(args),
        }) = cli.command
        else {
            panic!("expected creditor create");
        };
        assert_eq!(args.currency, Currency::Usd);
        assert_eq!(args.kind, CreditorKind::Company);
        assert_eq!(args.initial_balance, Money::new(-1250));
    }

    #[test]
    fn bad_amount_is_rejected() {
        let result = Cli::try_parse_from([
            "backoffice_admin",
            "creditor",
            "create",
            "--name",
            "X",
            "--initial-balance",
            "1.234",
        ]);
        assert!(result.is_err());
    }
}
