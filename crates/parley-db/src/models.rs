//! Row types that map directly to SQLite rows.

pub struct UserRow {
    pub username: String,
    pub password: String,
    pub created_at: String,
}
