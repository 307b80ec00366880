//! SQL schema for the Escala SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    id             TEXT PRIMARY KEY,
    email          TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL,
    role           TEXT NOT NULL DEFAULT 'admin',
    password_hash  TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS people (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    kind         TEXT NOT NULL
                 CHECK (kind IN ('minister', 'backing_vocalist', 'instrumentalist')),
    instruments  TEXT NOT NULL DEFAULT '[]',   -- JSON array of instrument tags
    created_at   TEXT NOT NULL
);

-- Person references are plain columns, not foreign keys: deleting a person
-- never cascades and never fails because an assignment still points at them.
CREATE TABLE IF NOT EXISTS assignments (
    id                 TEXT PRIMARY KEY,
    date               TEXT NOT NULL,      -- YYYY-MM-DD
    period             TEXT,               -- 'morning' | 'evening'; NULL on legacy rows
    minister_id        TEXT,
    backing_vocalists  TEXT NOT NULL DEFAULT '[]',   -- JSON array of person ids
    guitar_id          TEXT,
    keyboard_id        TEXT,
    bass_id            TEXT,
    drums_id           TEXT,
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS people_name_idx      ON people(name);
CREATE INDEX IF NOT EXISTS assignments_date_idx ON assignments(date);

PRAGMA user_version = 1;
";
