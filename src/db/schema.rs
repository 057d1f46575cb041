//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - identity: `people`, `accounts` (one canonical account per (person, provider))
/// - membership: `groups`, `group_members`
/// - resources: one table per resource kind (`packages`, `tools`) plus the
///   polymorphic `collaborators` join table
/// - agreements: `individual_signatures`, `organizations`, `contributors`,
///   `corporate_signatures`
/// - `commit_authors` observed per repository
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Identity
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY NOT NULL,
    person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    provider TEXT NOT NULL,
    uid TEXT NOT NULL,
    username TEXT NOT NULL,
    token TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(person_id, provider),
    UNIQUE(provider, uid)
);

CREATE INDEX IF NOT EXISTS idx_accounts_provider_username ON accounts(provider, username);

-- ---------------------------------------------------------------------------
-- Groups
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS group_members (
    id INTEGER PRIMARY KEY NOT NULL,
    group_id INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL, -- RFC3339
    UNIQUE(group_id, person_id)
);

-- ---------------------------------------------------------------------------
-- Resources (one table per kind)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS packages (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES people(id),
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS tools (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES people(id),
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

-- resource_kind holds the ResourceKind tag ("Package", "Tool").
CREATE TABLE IF NOT EXISTS collaborators (
    id INTEGER PRIMARY KEY NOT NULL,
    person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    resource_kind TEXT NOT NULL,
    resource_id INTEGER NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    UNIQUE(person_id, resource_kind, resource_id)
);

CREATE INDEX IF NOT EXISTS idx_collaborators_resource ON collaborators(resource_kind, resource_id);

-- ---------------------------------------------------------------------------
-- Agreements (append-only signatures)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS individual_signatures (
    id INTEGER PRIMARY KEY NOT NULL,
    person_id INTEGER NOT NULL REFERENCES people(id),
    agreement_version TEXT NOT NULL,
    signed_at TEXT NOT NULL, -- RFC3339
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_individual_signatures_person ON individual_signatures(person_id);

CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS contributors (
    id INTEGER PRIMARY KEY NOT NULL,
    organization_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL, -- RFC3339
    UNIQUE(organization_id, person_id)
);

CREATE TABLE IF NOT EXISTS corporate_signatures (
    id INTEGER PRIMARY KEY NOT NULL,
    person_id INTEGER NOT NULL REFERENCES people(id),
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    agreement_version TEXT NOT NULL,
    signed_at TEXT NOT NULL, -- RFC3339
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_corporate_signatures_person ON corporate_signatures(person_id);

-- ---------------------------------------------------------------------------
-- Commit authors (not necessarily linked to a person)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS commit_authors (
    id INTEGER PRIMARY KEY NOT NULL,
    login TEXT NOT NULL,
    repository TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    UNIQUE(login, repository)
);
"#;
