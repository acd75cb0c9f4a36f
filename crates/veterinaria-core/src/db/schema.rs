//! SQLite schema definition.

/// Complete database schema for the clinic.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Animal Types (species reference)
-- ============================================================================

CREATE TABLE IF NOT EXISTS animal_types (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Veterinarians
-- ============================================================================

CREATE TABLE IF NOT EXISTS veterinarians (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    specialty TEXT,
    phone TEXT,
    email TEXT,
    registration_number TEXT,
    hired_on TEXT,                               -- YYYY-MM-DD
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Pets
-- ============================================================================

CREATE TABLE IF NOT EXISTS pets (
    id TEXT PRIMARY KEY,
    animal_type_id TEXT NOT NULL REFERENCES animal_types(id),
    name TEXT NOT NULL,
    breed TEXT,
    age INTEGER CHECK (age IS NULL OR age >= 0),
    sex TEXT NOT NULL CHECK (sex IN ('male', 'female')),
    size TEXT,
    weight_kg TEXT,                              -- decimal as text
    color TEXT,
    owner_name TEXT NOT NULL,
    owner_phone TEXT,
    owner_email TEXT,
    owner_address TEXT,
    microchip TEXT UNIQUE,                       -- NULL when the pet has no chip
    observations TEXT,
    attending_veterinarian_id TEXT REFERENCES veterinarians(id),
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_pets_name ON pets(name);
CREATE INDEX IF NOT EXISTS idx_pets_active ON pets(active);

-- ============================================================================
-- Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    category_id TEXT NOT NULL REFERENCES categories(id),
    name TEXT NOT NULL,
    description TEXT,
    product_type TEXT NOT NULL,
    price TEXT NOT NULL,                         -- decimal as text
    code TEXT NOT NULL UNIQUE,
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    active_ingredient TEXT,
    concentration TEXT,
    laboratory TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id, active);

-- FTS5 virtual table for product search
CREATE VIRTUAL TABLE IF NOT EXISTS products_fts USING fts5(
    name,
    description,
    code,
    content='products',
    content_rowid='rowid'
);

-- Triggers to keep FTS5 in sync with main table
CREATE TRIGGER IF NOT EXISTS products_ai AFTER INSERT ON products BEGIN
    INSERT INTO products_fts(rowid, name, description, code)
    VALUES (new.rowid, new.name, new.description, new.code);
END;

CREATE TRIGGER IF NOT EXISTS products_ad AFTER DELETE ON products BEGIN
    INSERT INTO products_fts(products_fts, rowid, name, description, code)
    VALUES ('delete', old.rowid, old.name, old.description, old.code);
END;

CREATE TRIGGER IF NOT EXISTS products_au AFTER UPDATE ON products BEGIN
    INSERT INTO products_fts(products_fts, rowid, name, description, code)
    VALUES ('delete', old.rowid, old.name, old.description, old.code);
    INSERT INTO products_fts(rowid, name, description, code)
    VALUES (new.rowid, new.name, new.description, new.code);
END;

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    pet_id TEXT NOT NULL REFERENCES pets(id),
    scheduled_at TEXT NOT NULL,                  -- RFC 3339, whole seconds, UTC
    kind TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'scheduled',    -- scheduled, confirmed, in_progress, completed, cancelled, no_show
    reason TEXT NOT NULL,
    observations TEXT,
    veterinarian TEXT,
    estimated_price TEXT,                        -- decimal as text
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Conflict detection scans by time window and status
CREATE INDEX IF NOT EXISTS idx_appointments_schedule ON appointments(scheduled_at, status);
CREATE INDEX IF NOT EXISTS idx_appointments_pet ON appointments(pet_id);
"#;
