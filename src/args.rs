use crate::engine::DEFAULT_LEDGER_FILE;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub enum Command {
    Add {
        kind: String,
        amount: String,
        category: String,
        notes: String,
    },
    List,
    Filter {
        kind: Option<String>,
        category: Option<String>,
    },
    Summary,
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub ledger_file: PathBuf,
    pub command: Command,
}

impl Args {
    pub fn parse() -> Self {
        Self::from_matches(&app().get_matches())
    }

    /// Parses arguments from an explicit iterator instead of the process
    /// arguments, returning clap's error rather than exiting on bad input.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app().get_matches_from_safe(args)?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let command = match matches.subcommand() {
            ("add", Some(sub)) => Command::Add {
                kind: value(sub, "kind"),
                amount: value(sub, "amount"),
                category: value(sub, "category"),
                notes: value(sub, "notes"),
            },
            ("filter", Some(sub)) => Command::Filter {
                kind: sub.value_of("kind").map(String::from),
                category: sub.value_of("category").map(String::from),
            },
            ("list", _) => Command::List,
            // Subcommands are required, so summary is the only one left.
            _ => Command::Summary,
        };

        Self {
            ledger_file: PathBuf::from(value(matches, "file")),
            command,
        }
    }
}

fn value(matches: &ArgMatches, name: &str) -> String {
    matches.value_of(name).unwrap_or_default().to_string()
}

fn app() -> App<'static, 'static> {
    App::new("budget")
        .version("0.1.0")
        .about("Records income and expenses and summarizes them")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("file")
                .short("f")
                .long("file")
                .takes_value(true)
                .env("BUDGET_LEDGER_FILE")
                .default_value(DEFAULT_LEDGER_FILE)
                .help("path of the ledger file to read from and write to"),
        )
        .subcommand(
            SubCommand::with_name("add")
                .about("Records a new transaction")
                .setting(AppSettings::AllowNegativeNumbers)
                .arg(
                    Arg::with_name("kind")
                        .required(true)
                        .help("transaction type, income or expense"),
                )
                .arg(
                    Arg::with_name("amount")
                        .required(true)
                        .help("amount of the transaction, must be positive"),
                )
                .arg(
                    Arg::with_name("category")
                        .required(true)
                        .help("category of the transaction"),
                )
                .arg(Arg::with_name("notes").help("optional notes")),
        )
        .subcommand(SubCommand::with_name("list").about("Lists all transactions"))
        .subcommand(
            SubCommand::with_name("filter")
                .about("Lists transactions matching a type and/or category")
                .arg(
                    Arg::with_name("kind")
                        .short("k")
                        .long("kind")
                        .takes_value(true)
                        .help("only show income or expense transactions"),
                )
                .arg(
                    Arg::with_name("category")
                        .short("c")
                        .long("category")
                        .takes_value(true)
                        .help("only show transactions in this category, case-insensitive"),
                ),
        )
        .subcommand(
            SubCommand::with_name("summary")
                .about("Shows total income, total expenses and the net balance"),
        )
}
