use anyhow::Result;
use rusqlite::{Connection, ErrorCode, OptionalExtension};

use parley_types::models::{Credential, CredentialStore, StoreError};

use crate::Database;
use crate::models::UserRow;

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

}

impl CredentialStore for Database {
    fn find_by_username(&self, username: &str) -> Result<Option<Credential>> {
        Ok(self.get_user_by_username(username)?.map(|row| Credential {
            username: row.username,
            password_hash: row.password,
        }))
    }

    fn insert(&self, credential: &Credential) -> Result<(), StoreError> {
        self.create_user(&credential.username, &credential.password_hash)
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::Duplicate
                } else {
                    StoreError::Backend(e)
                }
            })
    }
}

fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation
    )
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                username: row.get(0)?,
                password: row.get(1)?,
                created_at: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}
