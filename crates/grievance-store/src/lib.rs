//! Grievance Storage Layer
//!
//! Implements the GrievanceStore trait on SQLite.
//!
//! Listings only ever receive a [`QueryFilter`] built by the access policy, so
//! every SELECT here carries exactly the scope clause it was handed.
//!
//! # Examples
//!
//! ```no_run
//! use grievance_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for grievance operations
//! ```

#![warn(missing_docs)]

use grievance_domain::traits::GrievanceStore;
use grievance_domain::{
    ClassificationVerdict, DepartmentId, Grievance, GrievanceId, GrievanceQuery, GrievanceStatus,
    Priority, QueryFilter,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A grievance with this ID already exists
    #[error("Duplicate grievance: {0}")]
    Duplicate(GrievanceId),

    /// A citizen with this subject is already registered
    #[error("Subject already registered: {0}")]
    SubjectTaken(String),
}

const COLUMNS: &str = "id, submitter_id, message, department, priority, confidence, explanation, \
                       status, created_at, updated_at";

/// SQLite-based implementation of GrievanceStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between tasks
/// behind a mutex.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert GrievanceId to bytes for storage
    fn id_to_bytes(id: GrievanceId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to GrievanceId
    fn bytes_to_id(bytes: &[u8]) -> Result<GrievanceId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!(
                "Expected 16 bytes for GrievanceId, got {}",
                bytes.len()
            ))
        })?;
        Ok(GrievanceId::from_value(u128::from_be_bytes(arr)))
    }

    /// Rebuild a grievance from a row selected with [`COLUMNS`]
    fn row_to_grievance(row: &Row<'_>) -> rusqlite::Result<Grievance> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| conversion_error(0, Type::Blob, e))?;

        let department: String = row.get(3)?;
        let department = DepartmentId::parse(&department).ok_or_else(|| {
            conversion_error(3, Type::Text, StoreError::InvalidData(format!("Unknown department: {}", department)))
        })?;

        let priority: String = row.get(4)?;
        let priority = Priority::parse(&priority).ok_or_else(|| {
            conversion_error(4, Type::Text, StoreError::InvalidData(format!("Unknown priority: {}", priority)))
        })?;

        let status: String = row.get(7)?;
        let status = GrievanceStatus::parse(&status).ok_or_else(|| {
            conversion_error(7, Type::Text, StoreError::InvalidData(format!("Unknown status: {}", status)))
        })?;

        let explanation: String = row.get(6)?;
        let classification =
            ClassificationVerdict::new(department, priority, row.get(5)?, explanation)
                .map_err(|e| conversion_error(5, Type::Real, StoreError::InvalidData(e.to_string())))?;

        Ok(Grievance::restore(
            id,
            row.get(1)?,
            row.get(2)?,
            classification,
            status,
            row.get::<_, i64>(8)? as u64,
            row.get::<_, i64>(9)? as u64,
        ))
    }
}

fn conversion_error(column: usize, kind: Type, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, kind, Box::new(e))
}

/// SQLite integers are signed; a wrapped OFFSET would silently read as 0
fn to_sql_count(name: &str, value: usize) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{} out of range: {}", name, value)))
}

impl SqliteStore {
    /// Register a self-service citizen with a password hash
    ///
    /// Fails with [`StoreError::SubjectTaken`] if the subject already exists.
    pub fn register_citizen(
        &mut self,
        subject_id: &str,
        password_hash: &str,
        registered_at: u64,
    ) -> Result<(), StoreError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO citizens (subject_id, password_hash, registered_at)
             VALUES (?1, ?2, ?3)",
            params![subject_id, password_hash, registered_at as i64],
        )?;

        if inserted == 0 {
            return Err(StoreError::SubjectTaken(subject_id.to_string()));
        }
        debug!("Registered citizen {}", subject_id);
        Ok(())
    }

    /// Password hash of a registered citizen
    pub fn citizen_password_hash(&self, subject_id: &str) -> Result<Option<String>, StoreError> {
        let hash = self
            .conn
            .query_row(
                "SELECT password_hash FROM citizens WHERE subject_id = ?1",
                params![subject_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(hash)
    }
}

impl GrievanceStore for SqliteStore {
    type Error = StoreError;

    fn insert(&mut self, grievance: &Grievance) -> Result<GrievanceId, Self::Error> {
        let id_bytes = Self::id_to_bytes(grievance.id());

        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM grievances WHERE id = ?1",
                params![&id_bytes],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate(grievance.id()));
        }

        let verdict = grievance.classification();
        self.conn.execute(
            "INSERT INTO grievances (id, submitter_id, message, department, priority, confidence,
                                     explanation, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &id_bytes,
                grievance.submitter_id(),
                grievance.message(),
                verdict.department().as_str(),
                verdict.priority().as_str(),
                verdict.confidence(),
                verdict.explanation(),
                grievance.status().as_str(),
                grievance.created_at() as i64,
                grievance.updated_at() as i64,
            ],
        )?;

        debug!("Stored grievance {} ({})", grievance.id(), verdict.department());
        Ok(grievance.id())
    }

    fn get(&self, id: GrievanceId) -> Result<Option<Grievance>, Self::Error> {
        let sql = format!("SELECT {} FROM grievances WHERE id = ?1", COLUMNS);
        let grievance = self
            .conn
            .query_row(&sql, params![Self::id_to_bytes(id)], Self::row_to_grievance)
            .optional()?;

        Ok(grievance)
    }

    fn list(&self, query: &GrievanceQuery) -> Result<Vec<Grievance>, Self::Error> {
        let mut sql = format!("SELECT {} FROM grievances WHERE 1=1", COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        match &query.filter {
            QueryFilter::Unrestricted => {}
            QueryFilter::DepartmentEquals(department) => {
                sql.push_str(" AND department = ?");
                params.push(Box::new(department.as_str()));
            }
            QueryFilter::DepartmentIn(departments) => {
                if departments.is_empty() {
                    return Ok(Vec::new());
                }
                let placeholders = vec!["?"; departments.len()].join(", ");
                sql.push_str(&format!(" AND department IN ({})", placeholders));
                for department in departments {
                    params.push(Box::new(department.as_str()));
                }
            }
            QueryFilter::SubmitterEquals(submitter) => {
                sql.push_str(" AND submitter_id = ?");
                params.push(Box::new(submitter.clone()));
            }
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str()));
        }

        // id breaks ties between grievances created in the same millisecond
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        params.push(Box::new(to_sql_count("limit", query.limit)?));
        params.push(Box::new(to_sql_count("offset", query.offset)?));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let grievances = stmt
            .query_map(&param_refs[..], Self::row_to_grievance)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(grievances)
    }

    fn update_status(
        &mut self,
        id: GrievanceId,
        status: GrievanceStatus,
        now: u64,
    ) -> Result<Option<Grievance>, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE grievances SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), now as i64, Self::id_to_bytes(id)],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        self.get(id)
    }
}
