use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, PartialEq)]
pub struct ParseKindError {
    kind: String,
}

impl ParseKindError {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum AddError {
    InvalidKind(ParseKindError),
    InvalidAmount(String),
    NonPositiveAmount(f64),
    EmptyCategory,
    ReservedCharacter { field: &'static str, found: char },
    Storage(StorageError),
}

#[derive(Debug, PartialEq)]
pub enum QueryError {
    EmptyLedger,
    NoMatches,
    InvalidKind(ParseKindError),
}

#[derive(Debug)]
pub enum StorageError {
    ReadFailure(csv::Error),
    WriteFailure(csv::Error),
    ParseFailure { line: u64, reason: String },
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transaction type must be 'income' or 'expense', got '{}'",
            self.kind
        )
    }
}

impl fmt::Display for AddError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AddError::InvalidKind(err) => write!(f, "unable to add transaction, {}", err),
            AddError::InvalidAmount(raw) => {
                write!(f, "invalid amount '{}', please enter a number", raw)
            }
            AddError::NonPositiveAmount(amount) => {
                write!(f, "amount must be a positive number, got {}", amount)
            }
            AddError::EmptyCategory => write!(f, "category cannot be empty"),
            AddError::ReservedCharacter { field, found } => {
                write!(f, "{} cannot contain {:?}", field, found)
            }
            AddError::Storage(err) => write!(f, "transaction recorded but not saved: {}", err),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::EmptyLedger => write!(f, "no transactions found"),
            QueryError::NoMatches => write!(f, "no transactions match the criteria"),
            QueryError::InvalidKind(err) => write!(f, "unable to filter transactions, {}", err),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ReadFailure(err) => write!(f, "failed to read ledger file: {}", err),
            StorageError::WriteFailure(err) => write!(f, "failed to write ledger file: {}", err),
            StorageError::ParseFailure { line, reason } => {
                write!(f, "malformed ledger entry on line {}: {}", line, reason)
            }
        }
    }
}

impl From<ParseKindError> for AddError {
    fn from(err: ParseKindError) -> Self {
        AddError::InvalidKind(err)
    }
}

impl From<ParseKindError> for QueryError {
    fn from(err: ParseKindError) -> Self {
        QueryError::InvalidKind(err)
    }
}

impl From<StorageError> for AddError {
    fn from(err: StorageError) -> Self {
        AddError::Storage(err)
    }
}

impl Error for ParseKindError {}
impl Error for AddError {}
impl Error for QueryError {}
impl Error for StorageError {}
