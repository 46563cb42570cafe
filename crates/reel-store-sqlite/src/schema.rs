//! SQL schema for the Reel SQLite store.
//!
//! Executed once at connection startup. The unique indexes here are load
//! bearing: one account per email, one per username, one per federated
//! pair, one fact per (user, video) and per (subscriber, channel). They are
//! the serialization point for racing duplicate writes.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id          TEXT PRIMARY KEY,
    username            TEXT NOT NULL,
    email               TEXT NOT NULL,   -- stored lowercase
    auth_provider       TEXT NOT NULL DEFAULT 'local',
    provider_subject_id TEXT,            -- NULL unless federated
    password_hash       TEXT,            -- argon2 PHC string; dormant while federated
    channel_name        TEXT NOT NULL,
    channel_description TEXT,
    avatar_url          TEXT,
    subscriber_count    INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS accounts_username_idx ON accounts(username);
CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_idx    ON accounts(email);

-- Partial unique index: federated identity pairs are unique, local accounts
-- (NULL subject) are exempt.
CREATE UNIQUE INDEX IF NOT EXISTS accounts_provider_idx
    ON accounts(auth_provider, provider_subject_id)
    WHERE provider_subject_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS videos (
    video_id   TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL REFERENCES accounts(account_id),
    title      TEXT NOT NULL,
    likes      INTEGER NOT NULL DEFAULT 0,
    dislikes   INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- One engagement fact per (user, video); switching kind is an UPDATE.
CREATE TABLE IF NOT EXISTS engagement_facts (
    user_id    TEXT NOT NULL REFERENCES accounts(account_id),
    video_id   TEXT NOT NULL REFERENCES videos(video_id),
    kind       TEXT NOT NULL,   -- 'like' | 'dislike'
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, video_id)
);

CREATE INDEX IF NOT EXISTS engagement_facts_video_idx
    ON engagement_facts(video_id);

-- Presence = subscribed. Self-subscription is rejected at the service layer;
-- the CHECK is the storage backstop.
CREATE TABLE IF NOT EXISTS subscription_facts (
    subscriber_id TEXT NOT NULL REFERENCES accounts(account_id),
    channel_id    TEXT NOT NULL REFERENCES accounts(account_id),
    created_at    TEXT NOT NULL,
    PRIMARY KEY (subscriber_id, channel_id),
    CHECK (subscriber_id != channel_id)
);

CREATE INDEX IF NOT EXISTS subscription_facts_channel_idx
    ON subscription_facts(channel_id);

PRAGMA user_version = 1;
";
