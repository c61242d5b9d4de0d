//! The interactive terminal menus that drive the application.
//!
//! Menu wiring only. All database work happens in the library functions this
//! module calls, and every user input error is reported and sent back to the
//! menu instead of aborting the program.

use std::{
    io::{self, Write},
    sync::OnceLock,
};

use numfmt::{Formatter, Precision};
use rusqlite::Connection;
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Error,
    auth::{authenticate, register},
    budget::{create_budget, get_budget_report},
    report::get_monthly_summaries,
    transaction::{
        Transaction, TransactionId, TransactionKind, create_transaction, delete_transaction,
        get_transactions, update_transaction,
    },
    user::UserID,
};

const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

/// Run the interactive menu loop until the user exits.
///
/// Reaching end of file on stdin behaves like choosing Exit.
pub fn run(connection: &Connection) {
    println!("Welcome to Personal Finance Manager!");

    loop {
        println!("\n1. Register\n2. Login\n3. Help\n4. Exit");

        let Some(choice) = read_line("Choose an option: ") else {
            return;
        };

        match choice.as_str() {
            "1" => register_menu(connection),
            "2" => {
                if let Some(user_id) = login_menu(connection) {
                    session_menu(user_id, connection);
                }
            }
            "3" => println!(
                "Help: This application helps you manage your personal finances by tracking income, expenses, and budgets."
            ),
            "4" => {
                println!("Goodbye!");
                return;
            }
            _ => print_error("Invalid option."),
        }
    }
}

fn register_menu(connection: &Connection) {
    let Some(username) = read_line("Enter a unique username: ") else {
        return;
    };

    let Some(password) = read_password("Enter a password: ") else {
        return;
    };

    match register(&username, &password, connection) {
        Ok(_) => println!("Registration successful!"),
        Err(Error::DuplicateUsername) => print_error("Username already exists."),
        Err(error) => print_error(error),
    }
}

fn login_menu(connection: &Connection) -> Option<UserID> {
    let username = read_line("Username: ")?;
    let password = read_password("Password: ")?;

    match authenticate(&username, &password, connection) {
        Ok(user_id) => {
            println!("Login successful!");
            Some(user_id)
        }
        Err(Error::InvalidCredentials) => {
            print_error("Invalid credentials.");
            None
        }
        Err(error) => {
            print_error(error);
            None
        }
    }
}

fn session_menu(user_id: UserID, connection: &Connection) {
    loop {
        println!(
            "\n1. Add Transaction\n2. Update Transaction\n3. Delete Transaction\n4. List Transactions\n5. Generate Report\n6. Set Budget\n7. Check Budget\n8. Logout"
        );

        let Some(choice) = read_line("Choose an option: ") else {
            return;
        };

        let result = match choice.as_str() {
            "1" => add_transaction_menu(user_id, connection),
            "2" => update_transaction_menu(user_id, connection),
            "3" => delete_transaction_menu(user_id, connection),
            "4" => list_transactions_menu(user_id, connection),
            "5" => report_menu(user_id, connection),
            "6" => set_budget_menu(user_id, connection),
            "7" => check_budget_menu(user_id, connection),
            "8" => return,
            _ => {
                print_error("Invalid option.");
                continue;
            }
        };

        // Bad input sends the user back to the menu instead of aborting.
        if let Err(error) = result {
            print_error(error);
        }
    }
}

fn add_transaction_menu(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let Some(kind_input) = read_line("Enter type (income/expense): ") else {
        return Ok(());
    };
    let kind: TransactionKind = kind_input.parse()?;

    let Some(category) = read_line("Enter category (e.g., Food, Rent, Salary): ") else {
        return Ok(());
    };

    let Some(amount_input) = read_line("Enter amount: ") else {
        return Ok(());
    };
    let amount = parse_amount(&amount_input)?;

    let Some(date_input) = read_line("Enter date (YYYY-MM-DD): ") else {
        return Ok(());
    };
    let date = parse_date_or_today(&date_input)?;

    create_transaction(user_id, kind, &category, amount, date, connection)?;
    println!("Transaction added successfully!");

    Ok(())
}

fn update_transaction_menu(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let Some(id_input) = read_line("Enter transaction ID to update: ") else {
        return Ok(());
    };
    let transaction_id = parse_id(&id_input)?;

    let Some(kind_input) = read_line("Enter new type (income/expense): ") else {
        return Ok(());
    };
    let kind: TransactionKind = kind_input.parse()?;

    let Some(category) = read_line("Enter new category: ") else {
        return Ok(());
    };

    let Some(amount_input) = read_line("Enter new amount: ") else {
        return Ok(());
    };
    let amount = parse_amount(&amount_input)?;

    let Some(date_input) = read_line("Enter new date (YYYY-MM-DD): ") else {
        return Ok(());
    };
    let date = parse_date_or_today(&date_input)?;

    // An ID that does not match one of the user's transactions is a no-op,
    // not an error.
    update_transaction(
        transaction_id,
        user_id,
        kind,
        &category,
        amount,
        date,
        connection,
    )?;
    println!("Transaction updated successfully!");

    Ok(())
}

fn delete_transaction_menu(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let Some(id_input) = read_line("Enter transaction ID to delete: ") else {
        return Ok(());
    };
    let transaction_id = parse_id(&id_input)?;

    delete_transaction(transaction_id, user_id, connection)?;
    println!("Transaction deleted successfully!");

    Ok(())
}

fn list_transactions_menu(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transactions = get_transactions(user_id, connection)?;

    if transactions.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    print!("{}", render_transactions(&transactions));

    Ok(())
}

fn report_menu(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let summaries = get_monthly_summaries(user_id, connection)?;

    println!("Monthly Financial Report:");

    for summary in &summaries {
        println!(
            "Month: {}, Income: {}, Expense: {}, Savings: {}",
            summary.month,
            currency(summary.income),
            currency(summary.expense),
            currency(summary.savings())
        );
    }

    Ok(())
}

fn set_budget_menu(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let Some(category) = read_line("Enter category to set budget for: ") else {
        return Ok(());
    };

    let Some(amount_input) = read_line("Enter budget amount: ") else {
        return Ok(());
    };
    let amount = parse_amount(&amount_input)?;

    create_budget(user_id, &category, amount, connection)?;
    println!("Budget set successfully!");

    Ok(())
}

fn check_budget_menu(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let report = get_budget_report(user_id, connection)?;

    println!("Budget Report:");

    for status in &report {
        println!(
            "Category: {}, Budget: {}, Spent: {}, Remaining: {}",
            status.category,
            currency(status.budgeted),
            currency(status.spent),
            currency(status.remaining())
        );
    }

    Ok(())
}

fn render_transactions(transactions: &[Transaction]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:>6}  {:<10}  {:<7}  {:<20}  {:>12}\n",
        "ID", "Date", "Type", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(63));
    output.push('\n');

    for transaction in transactions {
        output.push_str(&format!(
            "{:>6}  {:<10}  {:<7}  {:<20}  {:>12}\n",
            transaction.id,
            transaction.date.to_string(),
            transaction.kind.as_str(),
            transaction.category,
            currency(transaction.amount)
        ));
    }

    output
}

/// Print `prompt` and read one line from stdin with the line ending removed.
///
/// Returns [None] when stdin has reached end of file.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    if io::stdout().flush().is_err() {
        return None;
    }

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => {
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            Some(line)
        }
        Err(error) => {
            print_error(format!("Could not read from stdin: {error}"));
            None
        }
    }
}

/// Prompt for a password without echoing it to the terminal.
fn read_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn parse_amount(input: &str) -> Result<f64, Error> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{input:?} is not a number")))
}

fn parse_id(input: &str) -> Result<TransactionId, Error> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{input:?} is not a transaction ID")))
}

/// Parse a `YYYY-MM-DD` date, treating a blank line as today's date.
fn parse_date_or_today(input: &str) -> Result<Date, Error> {
    let input = input.trim();

    if input.is_empty() {
        return Ok(OffsetDateTime::now_utc().date());
    }

    Date::parse(input, DATE_FORMAT)
        .map_err(|_| Error::InvalidInput(format!("{input:?} is not a date in YYYY-MM-DD format")))
}

/// Format a dollar amount for terminal display, e.g. `-12.3` becomes `"-$12.30"`.
fn currency(number: f64) -> String {
    // numfmt renders non-finite values without the currency symbol, so we
    // return them as plain text instead.
    if !number.is_finite() {
        return number.to_string();
    }

    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}


#[cfg(test)]
mod render_tests {
    use time::macros::date;

    use crate::{
        transaction::{Transaction, TransactionKind},
        user::UserID,
    };

    use super::{currency, render_transactions};

    #[test]
    fn currency_renders_two_decimal_places() {
        assert_eq!(currency(12.3), "$12.30");
        assert_eq!(currency(75.0), "$75.00");
        assert_eq!(currency(0.05), "$0.05");
    }

    #[test]
    fn currency_renders_zero_with_cents() {
        assert_eq!(currency(0.0), "$0.00");
    }

    #[test]
    fn currency_renders_negative_amounts_with_leading_sign() {
        assert_eq!(currency(-5.0), "-$5.00");
    }

    #[test]
    fn currency_renders_non_finite_amounts_as_plain_text() {
        assert_eq!(currency(f64::INFINITY), "inf");
        assert_eq!(currency(f64::NEG_INFINITY), "-inf");
        assert_eq!(currency(f64::NAN), "NaN");
    }

    #[test]
    fn transaction_table_includes_every_field() {
        let transactions = vec![Transaction {
            id: 1,
            user_id: UserID::new(1),
            kind: TransactionKind::Expense,
            category: "Food".to_string(),
            amount: 12.5,
            date: date!(2024 - 01 - 15),
        }];

        let output = render_transactions(&transactions);

        let mut lines = output.lines();
        let header = lines.next().expect("Want a header line");
        assert!(header.contains("ID"));
        assert!(header.contains("Amount"));

        let row = lines.nth(1).expect("Want a row after the separator");
        assert!(row.contains("2024-01-15"));
        assert!(row.contains("expense"));
        assert!(row.contains("Food"));
        assert!(row.contains("$12.50"));
    }
}
