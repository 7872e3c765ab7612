//! SQL schema for the wordcard SQLite store.
//!
//! The DDL is versionless: it runs only when the backing file is created, and
//! an existing file is used as-is. Foreign-key enforcement is a per-connection
//! setting in SQLite, so [`FOREIGN_KEYS`] runs on every open.

// ─── Tables ──────────────────────────────────────────────────────────────────

pub const WORDS: &str = "words";
pub const CONTEXT: &str = "context";
pub const DEFINE: &str = "define";
pub const MASTERED: &str = "mastered";

// ─── Columns ─────────────────────────────────────────────────────────────────

pub const ID: &str = "id";
/// The word text in `words`; the foreign key to `words.id` everywhere else.
pub const WORD: &str = "word";
pub const CATEGORY: &str = "category";
pub const CREATE_TIME: &str = "create_time";
pub const UPDATE_TIME: &str = "update_time";
pub const MASTERED_FLAG: &str = MASTERED;
pub const CONTEXT_TEXT: &str = CONTEXT;
pub const DEFINE_TEXT: &str = DEFINE;

pub const FOREIGN_KEYS: &str = "PRAGMA foreign_keys = ON;";

/// Table DDL in creation order.
pub const TABLES: [(&str, &str); 4] = [
  (WORDS, "
CREATE TABLE words (
    id          INTEGER PRIMARY KEY,
    word        VARCHAR(30) UNIQUE,
    create_time INTEGER
);"),
  (CONTEXT, "
CREATE TABLE context (
    id          INTEGER PRIMARY KEY,
    word        INTEGER,
    context     VARCHAR(256),
    create_time INTEGER,
    FOREIGN KEY (word) REFERENCES words (id) ON DELETE CASCADE
);"),
  (DEFINE, "
CREATE TABLE define (
    id          INTEGER PRIMARY KEY,
    word        INTEGER,
    category    VARCHAR(30),
    define      VARCHAR(512),
    create_time INTEGER,
    FOREIGN KEY (word) REFERENCES words (id) ON DELETE CASCADE
);"),
  (MASTERED, "
CREATE TABLE mastered (
    id          INTEGER PRIMARY KEY,
    word        INTEGER,
    mastered    INTEGER DEFAULT FALSE,
    update_time INTEGER,
    FOREIGN KEY (word) REFERENCES words (id) ON DELETE CASCADE
);"),
];
