//! Monthly income and expense summaries.

use rusqlite::Connection;

use crate::{Error, user::UserID};

/// The total income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    /// The month in `YYYY-MM` format.
    pub month: String,
    /// The total of the user's income transactions in the month.
    pub income: f64,
    /// The total of the user's expense transactions in the month.
    pub expense: f64,
}

impl MonthlySummary {
    /// How much more was earned than spent in the month.
    pub fn savings(&self) -> f64 {
        self.income - self.expense
    }
}

/// Sum the income and expenses of `user_id`'s transactions per calendar
/// month, in chronological order.
///
/// Months without any transactions are absent from the result, and a month
/// with only one kind of transaction reports zero for the other kind.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_monthly_summaries(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<MonthlySummary>, Error> {
    connection
        .prepare(
            "SELECT strftime('%Y-%m', date) AS month,
                SUM(CASE WHEN kind = 'income' THEN amount ELSE 0 END) AS income,
                SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0 END) AS expense
             FROM \"transaction\"
             WHERE user_id = :user_id
             GROUP BY month
             ORDER BY month ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            Ok(MonthlySummary {
                month: row.get(0)?,
                income: row.get(1)?,
                expense: row.get(2)?,
            })
        })?
        .map(|maybe_summary| maybe_summary.map_err(|error| error.into()))
        .collect()
}
