//! SQL schema for the Mutua SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Transcript mirror: strictly append-only, externally produced.
-- No UPDATE or DELETE is ever issued against this table.
-- `seq` preserves source order, the segmenter's tie-break for equal
-- timestamps; `created_at` stays the raw string the bot runtime sent.
CREATE TABLE IF NOT EXISTS messages (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT NOT NULL,
    message_id      TEXT NOT NULL,
    direction       TEXT NOT NULL,   -- 'IN' | 'OUT'
    text            TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

-- Overlay log: one row per appended version, never rewritten.
-- Readers take MAX(version) per conversation.
CREATE TABLE IF NOT EXISTS overlays (
    overlay_id      TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL,
    version         INTEGER NOT NULL,
    profile_json    TEXT NOT NULL,
    recorded_at     TEXT NOT NULL,
    UNIQUE (conversation_id, version),
    CHECK  (version >= 1)
);

CREATE INDEX IF NOT EXISTS messages_conversation_idx ON messages(conversation_id);
CREATE INDEX IF NOT EXISTS overlays_conversation_idx ON overlays(conversation_id);

PRAGMA user_version = 1;
";
