//! Code for creating the budget table and reporting spending against budgets.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, user::UserID};

/// A spending limit a user has set for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: i64,
    /// The ID of the user that owns the budget.
    pub user_id: UserID,
    /// The category the budget applies to.
    pub category: String,
    /// The spending limit.
    pub amount: f64,
}

/// A budget's ceiling alongside what has been spent against it.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    /// The category the budget applies to.
    pub category: String,
    /// The spending limit.
    pub budgeted: f64,
    /// The total of the user's expenses in the category, across all dates.
    pub spent: f64,
}

impl BudgetStatus {
    /// How much of the budget is left to spend.
    pub fn remaining(&self) -> f64 {
        self.budgeted - self.spent
    }
}

/// Create a budget for `user_id` and return it with its generated ID.
///
/// A user may set several budgets for the same category. Each budget row is
/// reported separately by [get_budget_report].
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn create_budget(
    user_id: UserID,
    category: &str,
    amount: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_id, category, amount) VALUES (?1, ?2, ?3);",
        (user_id.as_i64(), category, amount),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Budget {
        id,
        user_id,
        category: category.to_string(),
        amount,
    })
}

/// Compute the spend against each of the budgets owned by `user_id`, in the
/// order the budgets were created.
///
/// A transaction counts towards a budget when it is an expense and its
/// category is byte-for-byte equal to the budget's category, so "Food" and
/// "food" are tracked separately. A budget with no matching expenses reports
/// a spend of zero.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_budget_report(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetStatus>, Error> {
    connection
        .prepare(
            // Grouping by budget ID gives one row per budget, so duplicate
            // categories each report their own ceiling and spend.
            "SELECT b.category, b.amount,
                SUM(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END) AS spent
             FROM budget b
             LEFT JOIN \"transaction\" t
                ON t.user_id = b.user_id AND t.category = b.category
             WHERE b.user_id = :user_id
             GROUP BY b.id
             ORDER BY b.id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            Ok(BudgetStatus {
                category: row.get(0)?,
                budgeted: row.get(1)?,
                spent: row.get(2)?,
            })
        })?
        .map(|maybe_status| maybe_status.map_err(|error| error.into()))
        .collect()
}

/// Create the budget table in the database.
///
/// # Errors
///
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id)
                )",
        (),
    )?;

    Ok(())
}
