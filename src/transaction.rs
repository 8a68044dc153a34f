use crate::errors::{ParseKindError, StorageError};
use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::fmt::Formatter;
use std::io;
use std::io::{Read, Write};
use std::str::FromStr;

/// The format every transaction timestamp is captured in, with second
/// precision so that it survives a trip through the ledger file unchanged.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Characters that cannot appear inside a stored field: the field delimiter
/// and anything that would end the row early.
pub const RESERVED_CHARACTERS: [char; 3] = ['|', '\n', '\r'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Money coming in, counted towards total income.
    Income,

    /// Money going out, counted towards total expenses.
    Expense,
}

impl Kind {
    /// The lowercase name used in the ledger file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }
}

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            _ => Err(ParseKindError::new(s)),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // pad rather than write so that width specifiers line up columns
        match self {
            Kind::Income => f.pad("Income"),
            Kind::Expense => f.pad("Expense"),
        }
    }
}

/// A single income or expense entry.
///
/// Field order matters: it is the column order of the ledger file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    kind: Kind,
    amount: f64,
    category: String,
    notes: String,
    timestamp: String,
}

impl Transaction {
    /// Builds a transaction stamped with the current local time.
    ///
    /// No validation happens here, callers are expected to have checked the
    /// amount and category already (see `Ledger::add`).
    pub fn new(kind: Kind, amount: f64, category: &str, notes: &str) -> Self {
        Self {
            kind,
            amount,
            category: category.to_string(),
            notes: notes.to_string(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Replaces the generated timestamp with a previously recorded one. This is
    /// how a reloaded entry keeps its original date.
    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Renders the transaction as a single newline terminated ledger file row.
    pub fn to_storage_line(&self) -> Result<String, StorageError> {
        let mut buf = Vec::new();
        {
            let mut wtr = storage_writer(&mut buf);
            self.write_row(&mut wtr)?;
            wtr.flush()
                .map_err(|err| StorageError::WriteFailure(err.into()))?;
        }

        String::from_utf8(buf).map_err(|err| {
            StorageError::WriteFailure(io::Error::new(io::ErrorKind::InvalidData, err).into())
        })
    }

    /// Appends the transaction as one row to a writer created by
    /// `storage_writer`. Flushing is left to the caller.
    pub(crate) fn write_row<W: Write>(
        &self,
        wtr: &mut csv::Writer<W>,
    ) -> Result<(), StorageError> {
        wtr.serialize(self).map_err(StorageError::WriteFailure)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:7} | ${:8.2} | {:15} | {}",
            self.timestamp, self.kind, self.amount, self.category, self.notes
        )
    }
}

/// Creates a CSV writer speaking the ledger file dialect: pipe separated, no
/// header row, one record per `\n` terminated line and no quoting. Fields are
/// written exactly as they are held, see `RESERVED_CHARACTERS`.
pub(crate) fn storage_writer<W: Write>(wtr: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(wtr)
}

/// Creates a CSV reader for the same dialect as `storage_writer`. Quote
/// characters carry no meaning and are kept as part of the field.
pub(crate) fn storage_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(rdr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salary() -> Transaction {
        Transaction::new(Kind::Income, 100.0, "Salary", "June")
            .with_timestamp("2024-06-01 09:30:00")
    }

    #[test]
    fn should_parse_kind_case_insensitively() {
        assert_eq!("INCOME".parse::<Kind>(), Ok(Kind::Income));
        assert_eq!("Expense".parse::<Kind>(), Ok(Kind::Expense));
        assert_eq!("income".parse::<Kind>(), Ok(Kind::Income));
    }

    #[test]
    fn should_fail_to_parse_unknown_kind() {
        assert_eq!("gift".parse::<Kind>(), Err(ParseKindError::new("gift")));

        // Surrounding whitespace is not stripped.
        assert!(" income".parse::<Kind>().is_err());
        assert!("".parse::<Kind>().is_err());
    }

    #[test]
    fn should_stamp_new_transactions_with_current_time() {
        let tx = Transaction::new(Kind::Expense, 5.0, "Food", "");

        // The timestamp must round trip through the storage format, which
        // means it has to parse back with exactly the same layout.
        assert!(chrono::NaiveDateTime::parse_from_str(tx.timestamp(), TIMESTAMP_FORMAT).is_ok());
        assert_eq!(tx.timestamp().len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn should_override_timestamp() {
        let tx = salary();
        assert_eq!(tx.timestamp(), "2024-06-01 09:30:00");
        assert_eq!(tx.kind(), Kind::Income);
        assert_eq!(tx.amount(), 100.0);
        assert_eq!(tx.category(), "Salary");
        assert_eq!(tx.notes(), "June");
    }

    #[test]
    fn should_format_display_line() {
        assert_eq!(
            salary().to_string(),
            "2024-06-01 09:30:00 | Income  | $  100.00 | Salary          | June"
        );

        let tx = Transaction::new(Kind::Expense, 1234.567, "Rent", "")
            .with_timestamp("2024-06-02 10:00:00");
        assert_eq!(
            tx.to_string(),
            "2024-06-02 10:00:00 | Expense | $ 1234.57 | Rent            | "
        );
    }

    #[test]
    fn should_format_storage_line() {
        let tx = Transaction::new(Kind::Expense, 42.5, "Food", "lunch")
            .with_timestamp("2024-06-02 12:15:00");
        assert_eq!(
            tx.to_storage_line().unwrap(),
            "expense|42.5|Food|lunch|2024-06-02 12:15:00\n"
        );
    }

    #[test]
    fn should_write_quotes_verbatim() {
        let tx = Transaction::new(Kind::Expense, 5.0, "\"Food\"", "\"best\" pizza")
            .with_timestamp("2024-06-01 09:30:00");
        assert_eq!(
            tx.to_storage_line().unwrap(),
            "expense|5.0|\"Food\"|\"best\" pizza|2024-06-01 09:30:00\n"
        );

        // A lone quote is just another character.
        let tx = Transaction::new(Kind::Income, 1.5, "Misc", "\"")
            .with_timestamp("2024-06-01 09:30:00");
        assert_eq!(
            tx.to_storage_line().unwrap(),
            "income|1.5|Misc|\"|2024-06-01 09:30:00\n"
        );
    }

    #[test]
    fn should_read_quotes_verbatim() {
        let data = "expense|5.0|Food|\"best\" pizza|2024-06-01 09:30:00\n\
                    income|1.5|Misc|\"|2024-06-01 09:30:00\n";
        let mut rdr = storage_reader(data.as_bytes());

        let rows: Vec<csv::StringRecord> = rdr.records().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "\"best\" pizza");
        assert_eq!(&rows[1][3], "\"");
        assert_eq!(rows[1].len(), 5);
    }
}
