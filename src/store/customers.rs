/// SQLite-backed Customer Store
///
/// One `rusqlite::Connection` is shared by every request context behind a
/// mutex. Each public operation takes the lock once and performs its reads
/// and writes inside a single transaction, so every logical mutation is
/// atomic even though ordering across requests is unspecified.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use super::model::{Customer, CustomerStatus, CustomerUpdate, Patch, StoreStats};
use super::{StoreError, StoreResult};

const SELECT_COLUMNS: &str = "SELECT id, name, email, phone, status, created_at, updated_at FROM customers";

/// Reference data inserted into an empty table: (name, email, phone, status)
const SAMPLE_CUSTOMERS: [(&str, &str, &str, CustomerStatus); 10] = [
    ("Alice Johnson", "alice.johnson@email.com", "+1-555-0101", CustomerStatus::Active),
    ("Bob Smith", "bob.smith@email.com", "+1-555-0102", CustomerStatus::Active),
    ("Carol White", "carol.white@email.com", "+1-555-0103", CustomerStatus::Active),
    ("David Brown", "david.brown@email.com", "+1-555-0104", CustomerStatus::Disabled),
    ("Eve Davis", "eve.davis@email.com", "+1-555-0105", CustomerStatus::Active),
    ("Frank Miller", "frank.miller@email.com", "+1-555-0106", CustomerStatus::Active),
    ("Grace Wilson", "grace.wilson@email.com", "+1-555-0107", CustomerStatus::Active),
    ("Henry Moore", "henry.moore@email.com", "+1-555-0108", CustomerStatus::Disabled),
    ("Iris Taylor", "iris.taylor@email.com", "+1-555-0109", CustomerStatus::Active),
    ("Jack Anderson", "jack.anderson@email.com", "+1-555-0110", CustomerStatus::Active),
];

/// Handle to the customers database.
///
/// `Clone` is cheap: clones share the same connection.
#[derive(Clone)]
pub struct CustomerStore {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerStore {
    /// Open (or create) the database file at `path`.
    ///
    /// Creates the parent directory when missing, switches the journal to
    /// WAL, and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!(directory = %parent.display(), "Created data directory");
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database. Each call yields an isolated store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS customers (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT    NOT NULL,
                email       TEXT,
                phone       TEXT,
                status      TEXT    NOT NULL DEFAULT 'active'
                            CHECK(status IN ('active', 'disabled')),
                created_at  TEXT    NOT NULL,
                updated_at  TEXT    NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_customer_status ON customers(status);
            CREATE INDEX IF NOT EXISTS idx_customer_email ON customers(email);",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert the ten reference customers if the table is empty.
    ///
    /// Returns the number of rows inserted (0 when data already exists).
    pub fn seed_sample_data(&self) -> StoreResult<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }

        let now = Utc::now();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO customers (name, email, phone, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            )?;
            for (name, email, phone, status) in SAMPLE_CUSTOMERS {
                stmt.execute(params![name, email, phone, status.as_str(), now])?;
            }
        }
        tx.commit()?;

        info!(count = SAMPLE_CUSTOMERS.len(), "Seeded sample customers");
        Ok(SAMPLE_CUSTOMERS.len())
    }

    /// Row counts by status.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let conn = self.conn.lock();
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = 'active'), 0),
                    COALESCE(SUM(status = 'disabled'), 0)
             FROM customers",
            [],
            |row| {
                Ok(StoreStats {
                    total: row.get(0)?,
                    active: row.get(1)?,
                    disabled: row.get(2)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// Trivial read used by the health probe. Returns the row count.
    pub fn ping(&self) -> StoreResult<i64> {
        let conn = self.conn.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?)
    }

    pub fn get(&self, id: i64) -> StoreResult<Customer> {
        let conn = self.conn.lock();
        fetch(&conn, id)?.ok_or(StoreError::NotFound { id })
    }

    /// All customers in ascending id order, optionally restricted to one status.
    pub fn list(&self, status: Option<CustomerStatus>) -> StoreResult<Vec<Customer>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "{SELECT_COLUMNS} WHERE (?1 IS NULL OR status = ?1) ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map(params![status.map(|s| s.as_str())], customer_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Create an active customer. `name` is trimmed and must not be blank.
    pub fn add(&self, name: &str, email: Option<&str>, phone: Option<&str>) -> StoreResult<Customer> {
        let name = validate_name(name)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let now = Utc::now();
        tx.execute(
            "INSERT INTO customers (name, email, phone, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'active', ?4, ?4)",
            params![name, email, phone, now],
        )?;
        let id = tx.last_insert_rowid();
        let customer = fetch(&tx, id)?.ok_or(StoreError::NotFound { id })?;
        tx.commit()?;

        info!(customer_id = id, name = %customer.name, "Added customer");
        Ok(customer)
    }

    /// Apply a partial update. Only the fields present in `update` change.
    pub fn update(&self, id: i64, update: CustomerUpdate) -> StoreResult<Customer> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut customer = fetch(&tx, id)?.ok_or(StoreError::NotFound { id })?;
        if update.is_empty() {
            return Err(StoreError::Validation("No fields to update".to_string()));
        }

        match update.name {
            Patch::Keep => {}
            Patch::Clear => {
                return Err(StoreError::Validation(
                    "Customer name cannot be null".to_string(),
                ));
            }
            Patch::Set(name) => customer.name = validate_name(&name)?,
        }
        apply_optional(&mut customer.email, update.email);
        apply_optional(&mut customer.phone, update.phone);

        tx.execute(
            "UPDATE customers SET name = ?1, email = ?2, phone = ?3, updated_at = ?4 WHERE id = ?5",
            params![customer.name, customer.email, customer.phone, Utc::now(), id],
        )?;
        let customer = fetch(&tx, id)?.ok_or(StoreError::NotFound { id })?;
        tx.commit()?;

        info!(customer_id = id, "Updated customer");
        Ok(customer)
    }

    pub fn disable(&self, id: i64) -> StoreResult<Customer> {
        self.set_status(id, CustomerStatus::Disabled)
    }

    pub fn activate(&self, id: i64) -> StoreResult<Customer> {
        self.set_status(id, CustomerStatus::Active)
    }

    /// Idempotent status transition. A record already in `status` is
    /// returned unchanged and its `updated_at` is not refreshed.
    fn set_status(&self, id: i64, status: CustomerStatus) -> StoreResult<Customer> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let current = fetch(&tx, id)?.ok_or(StoreError::NotFound { id })?;
        if current.status == status {
            debug!(customer_id = id, %status, "Status unchanged");
            return Ok(current);
        }

        tx.execute(
            "UPDATE customers SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now(), id],
        )?;
        let customer = fetch(&tx, id)?.ok_or(StoreError::NotFound { id })?;
        tx.commit()?;

        info!(customer_id = id, %status, "Changed customer status");
        Ok(customer)
    }
}

fn validate_name(name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("Customer name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

fn apply_optional(field: &mut Option<String>, patch: Patch<String>) {
    match patch {
        Patch::Keep => {}
        Patch::Clear => *field = None,
        Patch::Set(value) => *field = Some(value),
    }
}

fn fetch(conn: &Connection, id: i64) -> rusqlite::Result<Option<Customer>> {
    conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?
        .query_row(params![id], customer_from_row)
        .optional()
}

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    let status: String = row.get(4)?;
    let status = status
        .parse::<CustomerStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;

    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        status,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
