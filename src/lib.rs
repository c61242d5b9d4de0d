//! Fintrack is a terminal app for tracking your personal finances.
//!
//! This library provides the SQLite-backed operations for managing users,
//! transactions, and budgets, plus the interactive menu loop that drives them.

#![warn(missing_docs)]

mod auth;
mod budget;
mod cli;
mod db;
mod password;
mod report;
mod transaction;
mod user;

pub use auth::{authenticate, register};
pub use budget::{Budget, BudgetStatus, create_budget, get_budget_report};
pub use cli::run as run_cli;
pub use db::initialize as initialize_db;
pub use password::PasswordHash;
pub use report::{MonthlySummary, get_monthly_summaries};
pub use transaction::{
    Transaction, TransactionId, TransactionKind, count_transactions, create_transaction,
    delete_transaction, get_transactions, update_transaction,
};
pub use user::{User, UserID, count_users, create_user, get_user_by_username};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided a username and password combination that does not
    /// match a registered user.
    ///
    /// An unknown username and a wrong password both produce this error so
    /// that a failed log-in does not reveal which usernames are registered.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The username used to register already belongs to a registered user.
    #[error("the username is already taken")]
    DuplicateUsername,

    /// The user typed something that could not be parsed as the expected
    /// value, e.g. text where a number was expected.
    ///
    /// Callers should report the error and return to the menu rather than
    /// aborting the program.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging. It should not be
    /// shown to the user.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
