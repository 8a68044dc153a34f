use crate::errors::{AddError, QueryError, StorageError};
use crate::transaction::{
    storage_reader, storage_writer, Kind, Transaction, RESERVED_CHARACTERS,
};
use serde::Deserialize;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The ledger file used when the caller does not name one.
pub const DEFAULT_LEDGER_FILE: &str = "transactions.txt";

/// kind, amount, category, notes, timestamp
const FIELD_COUNT: usize = 5;

/// A row of the ledger file as it is read back, before validation.
#[derive(Debug, Deserialize)]
struct StoredTransaction {
    kind: String,
    amount: f64,
    category: String,
    notes: String,
    timestamp: String,
}

/// Totals over every transaction in a ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    /// Sum of all income amounts.
    pub income: f64,

    /// Sum of all expense amounts.
    pub expense: f64,

    /// Income minus expenses.
    pub net: f64,
}

/// A Ledger owns an ordered collection of Transactions and the file they are
/// persisted to. Transactions are kept in the order they were added or loaded
/// and are never re-sorted.
///
/// Every successful `add` rewrites the whole ledger file from memory.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// Creates an empty ledger bound to `path` without reading it. Use
    /// `Ledger::open` to load the existing contents as well.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            transactions: Vec::new(),
        }
    }

    /// Creates a ledger bound to `path` and loads any transactions already
    /// stored there. A missing file yields an empty ledger.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        Self::try_from(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Validates and records a new transaction, then rewrites the ledger file.
    ///
    /// Inputs are checked in order: the kind must be "income" or "expense"
    /// (any case), the amount must be a finite number greater than zero and
    /// the category must contain something other than whitespace. Neither the
    /// category nor the notes may hold `|` or a line break, since fields are
    /// stored verbatim. A rejected transaction leaves the ledger and its file
    /// untouched.
    ///
    /// If the transaction is valid but the file cannot be written the
    /// transaction is still kept in memory and a `AddError::Storage` is
    /// returned. It will be written along with the next successful save.
    pub fn add(
        &mut self,
        kind: &str,
        amount: &str,
        category: &str,
        notes: &str,
    ) -> Result<(), AddError> {
        let transaction = validate(kind, amount, category, notes).map_err(|err| {
            warn!(error = %err, "rejected transaction");
            err
        })?;

        info!(
            kind = transaction.kind().as_str(),
            amount = transaction.amount(),
            category = transaction.category(),
            "recording transaction"
        );
        self.transactions.push(transaction);
        self.persist()?;

        Ok(())
    }

    /// Returns every transaction in insertion order.
    pub fn list(&self) -> Result<&[Transaction], QueryError> {
        if self.transactions.is_empty() {
            return Err(QueryError::EmptyLedger);
        }

        Ok(&self.transactions)
    }

    /// Returns the transactions matching every supplied criterion, in
    /// insertion order.
    ///
    /// The kind is parsed like it is for `add`, an unknown kind is an error
    /// rather than an empty result. The category is compared case-insensitively
    /// against the whole category, not a substring of it. Empty criteria are
    /// treated as absent and with no criteria at all this behaves like `list`.
    pub fn filter(
        &self,
        kind: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<&Transaction>, QueryError> {
        let kind = kind
            .filter(|kind| !kind.is_empty())
            .map(str::parse::<Kind>)
            .transpose()?;
        let category = category
            .filter(|category| !category.is_empty())
            .map(str::to_lowercase);

        if kind.is_none() && category.is_none() {
            return self.list().map(|transactions| transactions.iter().collect());
        }

        let matches: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|tx| kind.map_or(true, |kind| tx.kind() == kind))
            .filter(|tx| {
                category
                    .as_ref()
                    .map_or(true, |category| tx.category().to_lowercase() == *category)
            })
            .collect();

        if matches.is_empty() {
            return Err(QueryError::NoMatches);
        }

        Ok(matches)
    }

    /// Computes total income, total expenses and the net balance. An empty
    /// ledger sums to zero across the board.
    pub fn summary(&self) -> Summary {
        let (income, expense) =
            self.transactions
                .iter()
                .fold((0.0, 0.0), |(income, expense), tx| match tx.kind() {
                    Kind::Income => (income + tx.amount(), expense),
                    Kind::Expense => (income, expense + tx.amount()),
                });

        Summary {
            income,
            expense,
            net: income - expense,
        }
    }

    /// Overwrites the ledger file with every transaction held in memory.
    ///
    /// The file is truncated before it is written, so a failure part way
    /// through can leave it incomplete. The in-memory transactions are never
    /// affected by a failed write.
    pub fn persist(&self) -> Result<(), StorageError> {
        match self.write_transactions() {
            Ok(()) => {
                debug!(
                    path = %self.path.display(),
                    count = self.transactions.len(),
                    "saved ledger"
                );
                Ok(())
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to save ledger");
                Err(err)
            }
        }
    }

    /// Replaces the in-memory transactions with the contents of the ledger
    /// file and returns how many were loaded.
    ///
    /// A missing file is an empty ledger. Loading is all or nothing: a single
    /// malformed line fails the whole reload and the transactions held before
    /// the call are kept as they were.
    pub fn reload(&mut self) -> Result<usize, StorageError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger file yet, starting empty");
                self.transactions.clear();
                return Ok(0);
            }
            Err(err) => return Err(StorageError::ReadFailure(err.into())),
        };

        // Note: the csv library wraps the file in its own buffer so there is
        // no need for an io::BufReader here.
        let mut rdr = storage_reader(file);

        let mut transactions = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(classify_read_error)?;
            let line = record.position().map_or(0, |pos| pos.line());
            transactions.push(parse_record(&record, line)?);
        }

        debug!(
            path = %self.path.display(),
            count = transactions.len(),
            "loaded ledger"
        );
        self.transactions = transactions;

        Ok(self.transactions.len())
    }

    fn write_transactions(&self) -> Result<(), StorageError> {
        let file =
            File::create(&self.path).map_err(|err| StorageError::WriteFailure(err.into()))?;
        let mut wtr = storage_writer(file);

        for tx in &self.transactions {
            tx.write_row(&mut wtr)?;
        }

        wtr.flush()
            .map_err(|err| StorageError::WriteFailure(err.into()))
    }
}

impl TryFrom<PathBuf> for Ledger {
    type Error = StorageError;

    /// Binds a new Ledger to the file at the provided PathBuf and loads every
    /// transaction stored in it.
    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        let mut ledger = Ledger::new(path);
        ledger.reload()?;

        Ok(ledger)
    }
}

fn validate(kind: &str, amount: &str, category: &str, notes: &str) -> Result<Transaction, AddError> {
    let kind = kind.parse::<Kind>()?;
    let amount = match amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => check_amount(value)?,
        _ => return Err(AddError::InvalidAmount(amount.to_string())),
    };
    check_category(category)?;
    check_text("category", category)?;
    check_text("notes", notes)?;

    Ok(Transaction::new(kind, amount, category, notes))
}

fn check_amount(amount: f64) -> Result<f64, AddError> {
    if !amount.is_finite() {
        return Err(AddError::InvalidAmount(amount.to_string()));
    }

    if amount <= 0.0 {
        return Err(AddError::NonPositiveAmount(amount));
    }

    Ok(amount)
}

fn check_category(category: &str) -> Result<(), AddError> {
    if category.trim().is_empty() {
        return Err(AddError::EmptyCategory);
    }

    Ok(())
}

/// Stored fields are written verbatim, so text holding the delimiter or a line
/// break would split or end the row.
fn check_text(field: &'static str, text: &str) -> Result<(), AddError> {
    if let Some(found) = text.chars().find(|c| RESERVED_CHARACTERS.contains(c)) {
        return Err(AddError::ReservedCharacter { field, found });
    }

    Ok(())
}

/// Turns one row of the ledger file back into a Transaction, holding it to
/// the same rules `Ledger::add` applies to new input.
fn parse_record(record: &csv::StringRecord, line: u64) -> Result<Transaction, StorageError> {
    let malformed = move |reason: String| StorageError::ParseFailure { line, reason };

    if record.len() != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            record.len()
        )));
    }

    let stored: StoredTransaction = record
        .deserialize(None)
        .map_err(|err| malformed(err.to_string()))?;
    let kind = stored
        .kind
        .parse::<Kind>()
        .map_err(|err| malformed(err.to_string()))?;
    let amount = check_amount(stored.amount).map_err(|err| malformed(err.to_string()))?;
    check_category(&stored.category).map_err(|err| malformed(err.to_string()))?;

    Ok(Transaction::new(kind, amount, &stored.category, &stored.notes)
        .with_timestamp(&stored.timestamp))
}

/// I/O trouble while reading is a read failure, anything the csv reader
/// rejects about the content itself (such as invalid UTF-8) is a parse failure.
fn classify_read_error(err: csv::Error) -> StorageError {
    if let csv::ErrorKind::Io(_) = err.kind() {
        return StorageError::ReadFailure(err);
    }

    StorageError::ParseFailure {
        line: err.position().map_or(0, |pos| pos.line()),
        reason: err.to_string(),
    }
}
