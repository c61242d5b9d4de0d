//! User registration and log-in checks against the user table.

use rusqlite::Connection;

use crate::{
    Error, PasswordHash,
    user::{User, UserID, create_user, get_user_by_username},
};

/// Register a new user with a unique username.
///
/// The password is salted and hashed before it is stored, so the raw password
/// never reaches the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DuplicateUsername] if `username` belongs to a registered user.
///   The existing user is left untouched.
/// - [Error::HashingError] if the password could not be hashed.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn register(username: &str, password: &str, connection: &Connection) -> Result<User, Error> {
    let password_hash = PasswordHash::from_raw_password(password, PasswordHash::DEFAULT_COST)?;

    create_user(username, password_hash, connection)
}

/// Check `username` and `password` against the registered users and return
/// the matching user's ID.
///
/// # Errors
///
/// This function will return a:
/// - [Error::InvalidCredentials] if the username is not registered or the
///   password does not match. The two cases are deliberately
///   indistinguishable.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn authenticate(
    username: &str,
    password: &str,
    connection: &Connection,
) -> Result<UserID, Error> {
    let user = get_user_by_username(username, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        error => error,
    })?;

    let is_password_valid = user.password_hash.verify(password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if is_password_valid {
        Ok(user.id)
    } else {
        Err(Error::InvalidCredentials)
    }
}
