use budget_tracker::args::{Args, Command};
use budget_tracker::engine::Ledger;
use budget_tracker::errors::{AddError, QueryError};
use budget_tracker::report;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so they never mix with report output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut ledger = match Ledger::open(&args.ledger_file) {
        Ok(ledger) => ledger,
        Err(err) => {
            eprintln!("Error loading transactions: {}", err);
            process::exit(1);
        }
    };

    match args.command {
        Command::Add {
            kind,
            amount,
            category,
            notes,
        } => match ledger.add(&kind, &amount, &category, &notes) {
            Ok(()) => println!("Transaction added successfully!"),
            Err(err @ AddError::Storage(_)) => {
                fail(format!("{} ({})", err, ledger.path().display()))
            }
            Err(err) => fail(err),
        },
        Command::List => match ledger.list() {
            Ok(transactions) => {
                println!("{}", report::render_table("All Transactions", transactions))
            }
            Err(QueryError::EmptyLedger) => println!("No transactions found."),
            Err(err) => fail(err),
        },
        Command::Filter { kind, category } => {
            match ledger.filter(kind.as_deref(), category.as_deref()) {
                Ok(transactions) => {
                    let title = report::filter_title(kind.as_deref(), category.as_deref());
                    println!("{}", report::render_table(&title, transactions));
                }
                Err(QueryError::EmptyLedger) => println!("No transactions found."),
                Err(QueryError::NoMatches) => println!("No transactions match the criteria."),
                Err(err) => fail(err),
            }
        }
        Command::Summary => println!("{}", ledger.summary()),
    }
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    process::exit(1);
}
