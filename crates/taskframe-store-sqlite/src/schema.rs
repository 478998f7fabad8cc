//! SQL schema for the Taskframe SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    username     TEXT NOT NULL,
    fid          INTEGER NOT NULL UNIQUE,  -- external-network identity
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    project_id  TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    title       TEXT NOT NULL,
    description TEXT,
    status      TEXT NOT NULL DEFAULT 'active',  -- 'active' | 'completed' | 'paused'
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id     TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    title       TEXT NOT NULL,
    description TEXT,
    due_at      TEXT NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    project_id  TEXT REFERENCES projects(project_id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Feature grants. A user may accumulate several rows per feature; the live
-- ones are found through the active flag plus the expiration check.
CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    feature         TEXT NOT NULL,   -- 'notifications' | 'project_linking'
    is_active       INTEGER NOT NULL DEFAULT 1,
    expires_at      TEXT,            -- NULL means the grant never expires
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tasks_user_idx         ON tasks(user_id);
CREATE INDEX IF NOT EXISTS tasks_project_idx      ON tasks(project_id);
CREATE INDEX IF NOT EXISTS projects_user_idx      ON projects(user_id);
CREATE INDEX IF NOT EXISTS subscriptions_user_idx ON subscriptions(user_id, feature);

PRAGMA user_version = 1;
";
