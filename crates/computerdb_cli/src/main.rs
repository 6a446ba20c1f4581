//! Command line front end for the computer inventory.
//!
//! # Responsibility
//! - Map subcommands onto `ComputerDatabaseService` calls.
//! - Validate user input the persistence layer trusts (date shape, order,
//!   company existence).

mod input;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use computerdb_core::db::DATABASE_ENV_VAR;
use computerdb_core::{
    default_log_level, init_logging, CompanyId, Computer, ComputerDatabaseService, ComputerId,
    ComputerValidationError, ConnectionError, ConnectionProvider, LoggingError,
    PersistenceError, SqliteCompanyDao, SqliteComputerDao, StoreConfig, StoreLocation,
};
use input::parse_date;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

type Service = ComputerDatabaseService<SqliteComputerDao, SqliteCompanyDao>;

#[derive(Debug, Parser)]
#[command(name = "computerdb", version, about = "Manage the computer inventory")]
struct Cli {
    /// SQLite database file, or `:memory:`.
    #[arg(long, env = DATABASE_ENV_VAR, default_value = "computerdb.sqlite")]
    database: String,
    /// Write rolling logs into this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Log level for --log-dir: trace, debug, info, warn or error.
    #[arg(long, requires = "log_dir")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List computers.
    List,
    /// List companies.
    Companies,
    /// Show computer details.
    Show { id: ComputerId },
    /// Add a computer.
    Add {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        fields: ComputerFields,
    },
    /// Edit a computer; omitted fields keep their value.
    Edit {
        id: ComputerId,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ComputerFields,
        /// Remove the introduction date.
        #[arg(long, conflicts_with = "introduced")]
        clear_introduced: bool,
        /// Remove the discontinuation date.
        #[arg(long, conflicts_with = "discontinued")]
        clear_discontinued: bool,
        /// Detach the computer from its company.
        #[arg(long, conflicts_with = "company")]
        clear_company: bool,
    },
    /// Delete computers in order, reporting each one and stopping at the
    /// first failure.
    Delete {
        #[arg(required = true)]
        ids: Vec<ComputerId>,
    },
}

#[derive(Debug, Args)]
struct ComputerFields {
    /// yyyy-mm-dd
    #[arg(long, value_parser = parse_date)]
    introduced: Option<NaiveDate>,
    /// yyyy-mm-dd
    #[arg(long, value_parser = parse_date)]
    discontinued: Option<NaiveDate>,
    #[arg(long)]
    company: Option<CompanyId>,
}

#[derive(Debug)]
enum CliError {
    Logging(LoggingError),
    Connection(ConnectionError),
    Persistence(PersistenceError),
    Validation(ComputerValidationError),
    UnknownCompany(CompanyId),
    UnknownComputer(ComputerId),
    Output(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Connection(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownCompany(id) => write!(f, "company {id} does not exist"),
            Self::UnknownComputer(id) => write!(f, "computer {id} does not exist"),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Connection(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::UnknownCompany(_) | Self::UnknownComputer(_) => None,
        }
    }
}

impl From<PersistenceError> for CliError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ComputerValidationError> for CliError {
    fn from(value: ComputerValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    match run(cli, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(CliError::Logging)?;
    }

    let config = StoreConfig {
        location: StoreLocation::parse(&cli.database),
        ..StoreConfig::in_memory()
    };
    let provider = Arc::new(ConnectionProvider::open(config).map_err(CliError::Connection)?);
    let service = ComputerDatabaseService::new(
        SqliteComputerDao::new(Arc::clone(&provider)),
        SqliteCompanyDao::new(Arc::clone(&provider)),
    );

    execute(cli.command, &service, out)?;
    provider.close().map_err(CliError::Connection)
}

fn execute(command: Command, service: &Service, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Command::List => {
            writeln!(out, "ID | NAME")?;
            for computer in service.retrieve_all_computers()? {
                writeln!(out, "{} - {}", computer.id.unwrap_or_default(), computer.name)?;
            }
        }
        Command::Companies => {
            writeln!(out, "ID | NAME")?;
            for company in service.retrieve_all_companies()? {
                writeln!(out, "{} - {}", company.id, company.name)?;
            }
        }
        Command::Show { id } => match service.retrieve_one_computer(id)? {
            Some(computer) => writeln!(out, "{computer}")?,
            None => writeln!(out, "computer {id} not found")?,
        },
        Command::Add { name, fields } => {
            let mut computer = Computer::new(name);
            computer.introduced = fields.introduced;
            computer.discontinued = fields.discontinued;
            if let Some(company_id) = fields.company {
                computer.company = Some(lookup_company(service, company_id)?);
            }
            computer.validate()?;
            let id = service.save_computer(&mut computer)?;
            writeln!(out, "Computer created with id:{id}")?;
        }
        Command::Edit {
            id,
            name,
            fields,
            clear_introduced,
            clear_discontinued,
            clear_company,
        } => {
            let mut computer = service
                .retrieve_one_computer(id)?
                .ok_or(CliError::UnknownComputer(id))?;
            if let Some(name) = name {
                computer.name = name;
            }
            if fields.introduced.is_some() || clear_introduced {
                computer.introduced = fields.introduced;
            }
            if fields.discontinued.is_some() || clear_discontinued {
                computer.discontinued = fields.discontinued;
            }
            if let Some(company_id) = fields.company {
                computer.company = Some(lookup_company(service, company_id)?);
            } else if clear_company {
                computer.company = None;
            }
            computer.validate()?;
            service.save_computer(&mut computer)?;
            writeln!(out, "Computer edited.")?;
        }
        Command::Delete { ids } => {
            for id in ids {
                service.delete_computer(id)?;
                writeln!(out, "{id} is deleted.")?;
            }
        }
    }
    Ok(())
}

fn lookup_company(
    service: &Service,
    company_id: CompanyId,
) -> Result<computerdb_core::Company, CliError> {
    service
        .retrieve_one_company(company_id)?
        .ok_or(CliError::UnknownCompany(company_id))
}
