use sqlx::PgPool;

/// Handler for single-statement queries against the connection pool.
///
/// Query request structs implement `kanau::processor::Processor` against
/// this type. Multi-statement work (reconciliation) goes through
/// transaction-scoped associated functions on the entity types instead.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
