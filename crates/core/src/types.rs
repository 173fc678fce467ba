/// Rule identities are PostgreSQL BIGSERIAL. Zero means "not yet assigned".
pub type DbId = i64;

/// Sentinel id carried by a rule that has never been persisted.
pub const UNASSIGNED_ID: DbId = 0;
