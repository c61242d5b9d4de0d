//! Code for creating the transaction table and managing a user's transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, user::UserID};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether a transaction brings money in or takes money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money coming in, e.g. a salary payment.
    Income,
    /// Money going out, e.g. a grocery shop.
    Expense,
}

impl TransactionKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidInput(format!(
                "{string:?} is not a transaction type, expected 'income' or 'expense'"
            ))),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The label used to group transactions and match them against budgets.
    pub category: String,
    /// The amount of money involved.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
}

/// Create a transaction for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn create_transaction(
    user_id: UserID,
    kind: TransactionKind,
    category: &str,
    amount: f64,
    date: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, kind, category, amount, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, kind, category, amount, date",
        )?
        .query_row((user_id.as_i64(), kind, category, amount, date), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the transactions owned by `user_id`.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            // Sort by date, and then ID to keep transaction order stable after updates.
            "SELECT id, user_id, kind, category, amount, date FROM \"transaction\"
             WHERE user_id = :user_id
             ORDER BY date ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the kind, category, amount, and date of the transaction matching
/// both `transaction_id` and `user_id`.
///
/// Returns the number of rows changed, which is zero when `transaction_id`
/// does not refer to one of the user's transactions. Transactions owned by
/// other users are never touched, and targeting one is not an error.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn update_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    kind: TransactionKind,
    category: &str,
    amount: f64,
    date: Date,
    connection: &Connection,
) -> Result<usize, Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET kind = ?1, category = ?2, amount = ?3, date = ?4
         WHERE id = ?5 AND user_id = ?6",
        (kind, category, amount, date, transaction_id, user_id.as_i64()),
    )?;

    Ok(rows_affected)
}

/// Delete the transaction matching both `transaction_id` and `user_id`.
///
/// Returns the number of rows deleted, which is zero when `transaction_id`
/// does not refer to one of the user's transactions. Transactions owned by
/// other users are never touched, and targeting one is not an error.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    Ok(rows_affected)
}

/// Get the total number of transactions in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
///
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK(kind IN ('income', 'expense')),
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id)
                )",
        (),
    )?;

    // Composite index used by the budget report join.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_category
         ON \"transaction\"(user_id, category);",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let kind = row.get(2)?;
    let category = row.get(3)?;
    let amount = row.get(4)?;
    let date = row.get(5)?;

    Ok(Transaction {
        id,
        user_id: UserID::new(raw_user_id),
        kind,
        category,
        amount,
        date,
    })
}


#[cfg(test)]
mod transaction_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        db::initialize,
        transaction::{
            TransactionKind, count_transactions, create_transaction, delete_transaction,
            get_transactions, update_transaction,
        },
        user::{User, create_user},
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn create_test_user(username: &str, connection: &Connection) -> User {
        create_user(username, PasswordHash::new_unchecked("hunter2"), connection)
            .expect("Could not create test user")
    }

    #[test]
    fn create_transaction_succeeds() {
        let connection = get_test_db_connection();
        let test_user = create_test_user("alice", &connection);

        let transaction = create_transaction(
            test_user.id,
            TransactionKind::Expense,
            "Food",
            12.5,
            date!(2024 - 01 - 15),
            &connection,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.user_id, test_user.id);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.date, date!(2024 - 01 - 15));
    }

    #[test]
    fn list_returns_own_transactions_in_date_order() {
        let connection = get_test_db_connection();
        let test_user = create_test_user("alice", &connection);
        let other_user = create_test_user("bob", &connection);

        let second = create_transaction(
            test_user.id,
            TransactionKind::Expense,
            "Rent",
            800.0,
            date!(2024 - 02 - 10),
            &connection,
        )
        .unwrap();
        let first = create_transaction(
            test_user.id,
            TransactionKind::Income,
            "Salary",
            100.0,
            date!(2024 - 01 - 15),
            &connection,
        )
        .unwrap();
        create_transaction(
            other_user.id,
            TransactionKind::Expense,
            "Food",
            5.0,
            date!(2024 - 01 - 20),
            &connection,
        )
        .unwrap();

        let transactions =
            get_transactions(test_user.id, &connection).expect("Could not get transactions");

        assert_eq!(transactions, vec![first, second]);
    }

    #[test]
    fn update_transaction_overwrites_all_fields() {
        let connection = get_test_db_connection();
        let test_user = create_test_user("alice", &connection);
        let transaction = create_transaction(
            test_user.id,
            TransactionKind::Expense,
            "Food",
            12.5,
            date!(2024 - 01 - 15),
            &connection,
        )
        .unwrap();

        let rows_affected = update_transaction(
            transaction.id,
            test_user.id,
            TransactionKind::Income,
            "Salary",
            2000.0,
            date!(2024 - 02 - 01),
            &connection,
        )
        .expect("Could not update transaction");

        assert_eq!(rows_affected, 1);

        let transactions = get_transactions(test_user.id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::Income);
        assert_eq!(transactions[0].category, "Salary");
        assert_eq!(transactions[0].amount, 2000.0);
        assert_eq!(transactions[0].date, date!(2024 - 02 - 01));
    }

    #[test]
    fn update_ignores_other_users_transactions() {
        let connection = get_test_db_connection();
        let owner = create_test_user("alice", &connection);
        let other_user = create_test_user("bob", &connection);
        let transaction = create_transaction(
            owner.id,
            TransactionKind::Expense,
            "Food",
            12.5,
            date!(2024 - 01 - 15),
            &connection,
        )
        .unwrap();

        let rows_affected = update_transaction(
            transaction.id,
            other_user.id,
            TransactionKind::Income,
            "Salary",
            2000.0,
            date!(2024 - 02 - 01),
            &connection,
        )
        .expect("The scoped update should not error");

        assert_eq!(
            rows_affected, 0,
            "Want zero rows affected, got {rows_affected}"
        );

        let transactions = get_transactions(owner.id, &connection).unwrap();
        assert_eq!(
            transactions,
            vec![transaction],
            "Want the owner's transaction to be unchanged"
        );
    }

    #[test]
    fn delete_transaction_removes_row() {
        let connection = get_test_db_connection();
        let test_user = create_test_user("alice", &connection);
        let transaction = create_transaction(
            test_user.id,
            TransactionKind::Expense,
            "Food",
            12.5,
            date!(2024 - 01 - 15),
            &connection,
        )
        .unwrap();

        let rows_affected = delete_transaction(transaction.id, test_user.id, &connection)
            .expect("Could not delete transaction");

        assert_eq!(rows_affected, 1);
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }

    #[test]
    fn delete_ignores_other_users_transactions() {
        let connection = get_test_db_connection();
        let owner = create_test_user("alice", &connection);
        let other_user = create_test_user("bob", &connection);
        let transaction = create_transaction(
            owner.id,
            TransactionKind::Expense,
            "Food",
            12.5,
            date!(2024 - 01 - 15),
            &connection,
        )
        .unwrap();

        let rows_affected = delete_transaction(transaction.id, other_user.id, &connection)
            .expect("The scoped delete should not error");

        assert_eq!(
            rows_affected, 0,
            "Want zero rows affected, got {rows_affected}"
        );
        assert_eq!(
            count_transactions(&connection).unwrap(),
            1,
            "Want the owner's transaction to still be in the database"
        );
    }

    #[test]
    fn delete_with_unknown_id_affects_zero_rows() {
        let connection = get_test_db_connection();
        let test_user = create_test_user("alice", &connection);

        let rows_affected = delete_transaction(999_999, test_user.id, &connection)
            .expect("Deleting a missing transaction should not error");

        assert_eq!(rows_affected, 0);
    }

    #[test]
    fn returns_correct_count() {
        let connection = get_test_db_connection();
        let test_user = create_test_user("alice", &connection);
        let other_user = create_test_user("bob", &connection);

        let count = count_transactions(&connection).expect("Could not get transaction count");
        assert_eq!(
            0, count,
            "Want zero transactions before insertion, got {count}"
        );

        create_transaction(
            test_user.id,
            TransactionKind::Income,
            "Salary",
            100.0,
            date!(2024 - 01 - 15),
            &connection,
        )
        .unwrap();
        create_transaction(
            other_user.id,
            TransactionKind::Expense,
            "Food",
            5.0,
            date!(2024 - 01 - 20),
            &connection,
        )
        .unwrap();

        let count = count_transactions(&connection).expect("Could not get transaction count");
        assert_eq!(
            2, count,
            "Want the count to cover every user's transactions, got {count}"
        );
    }
}
