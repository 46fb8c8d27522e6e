//! Embedded schema migrations for plaza.
//!
//! Migrations are applied in order at startup; each entry is one version.

/// Ordered list of schema migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    "CREATE TABLE users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        email         TEXT NOT NULL UNIQUE,
        password      TEXT NOT NULL,
        display_name  TEXT NOT NULL,
        role          TEXT NOT NULL DEFAULT 'client',
        company       TEXT,
        created_at    TEXT NOT NULL DEFAULT (datetime('now')),
        last_login    TEXT,
        is_active     INTEGER NOT NULL DEFAULT 1
    );
    CREATE INDEX idx_users_role ON users(role);",
    // v2: refresh tokens. The UNIQUE constraint on token is load-bearing:
    // a random collision on insert must fail rather than overwrite, and the
    // conditional DELETE during rotation serializes concurrent refreshes.
    "CREATE TABLE refresh_tokens (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        token       TEXT NOT NULL UNIQUE,
        expires_at  TEXT NOT NULL,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX idx_refresh_tokens_user ON refresh_tokens(user_id);",
];
