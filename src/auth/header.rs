use crate::app::AppState;
use crate::auth::{self, Client};
use crate::schema::user;
use base64::prelude::BASE64_STANDARD;
use base64::{DecodeError, Engine};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use std::str::Utf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub enum AuthenticationError {
    FailedConnection(#[from] diesel::r2d2::PoolError),
    FailedQuery(#[from] diesel::result::Error),
    #[error("Invalid authentication type")]
    InvalidAuthType,
    InvalidEncoding(#[from] DecodeError),
    #[error("Authentication credentials are malformed")]
    MalformedCredentials,
    #[error("Invalid username and password combination")]
    UsernamePasswordMismatch,
    Utf8Conversion(#[from] Utf8Error),
}

/// Authenticates the Authorization header value. Only Basic authentication
/// is supported; there are no server-side sessions, so every privileged
/// request carries credentials.
pub fn authenticate_user(state: &AppState, auth: &str) -> Result<Client, AuthenticationError> {
    let (auth_type, credentials) = auth.split_once(' ').ok_or(AuthenticationError::MalformedCredentials)?;
    match auth_type {
        "Basic" => basic_access_authentication(state, credentials),
        _ => Err(AuthenticationError::InvalidAuthType),
    }
}

#[cfg(test)]
pub fn credentials_for(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    format!("Basic {}", BASE64_STANDARD.encode(credentials))
}

/// `credentials` are sent base64 encoded, so this function decodes them to utf-8.
fn decode_credentials(credentials: &str) -> Result<(String, String), AuthenticationError> {
    let decoded_credentials = BASE64_STANDARD.decode(credentials)?;
    let utf8_encoded_credentials = std::str::from_utf8(&decoded_credentials)?;
    utf8_encoded_credentials
        .split_once(':')
        .map(|(username, pass)| (username.to_owned(), pass.to_owned()))
        .ok_or(AuthenticationError::MalformedCredentials)
}

/// Checks that the given `credentials` are of the form "username:password"
/// and that the username/password combination is valid.
fn basic_access_authentication(state: &AppState, credentials: &str) -> Result<Client, AuthenticationError> {
    let (username, password) = decode_credentials(credentials)?;
    let mut conn = state.get_connection()?;

    // For security reasons, don't give any indication to the user if it was the password
    // or the username that was incorrect.
    let (user_id, password_hash): (i64, String) = user::table
        .select((user::user_id, user::password_hash))
        .filter(user::username.eq(username))
        .first(&mut conn)
        .optional()?
        .ok_or(AuthenticationError::UsernamePasswordMismatch)?;
    auth::password::is_valid_password(&state.config, &password_hash, &password)
        .map(|()| Client::new(Some(user_id)))
        .map_err(|_| AuthenticationError::UsernamePasswordMismatch)
}
