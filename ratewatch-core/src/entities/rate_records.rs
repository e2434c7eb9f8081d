use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;

const RATE_COLUMNS: &str = "id, base_currency, target_currency, rate, created_at, updated_at";

/// A stored quote of one currency (`target_currency`) in terms of another
/// (`base_currency`). At most one live record is expected per pair; this is
/// enforced by lookup-before-insert, not by the schema.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RateRecord {
    pub id: i64,
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
/// List every rate record, oldest first.
pub struct GetAllRates;

impl Processor<GetAllRates> for DatabaseProcessor {
    type Output = Vec<RateRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAllRates")]
    async fn process(&self, _query: GetAllRates) -> Result<Vec<RateRecord>, sqlx::Error> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "SELECT {RATE_COLUMNS} FROM rate_records ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Look up a rate record by its store-assigned id.
pub struct GetRateById {
    pub id: i64,
}

impl Processor<GetRateById> for DatabaseProcessor {
    type Output = Option<RateRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetRateById")]
    async fn process(&self, query: GetRateById) -> Result<Option<RateRecord>, sqlx::Error> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "SELECT {RATE_COLUMNS} FROM rate_records WHERE id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Look up a rate record by its (base, target) currency pair.
pub struct GetRateByPair {
    pub base_currency: String,
    pub target_currency: String,
}

impl Processor<GetRateByPair> for DatabaseProcessor {
    type Output = Option<RateRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetRateByPair")]
    async fn process(&self, query: GetRateByPair) -> Result<Option<RateRecord>, sqlx::Error> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "SELECT {RATE_COLUMNS} FROM rate_records \
             WHERE base_currency = $1 AND target_currency = $2"
        ))
        .bind(query.base_currency)
        .bind(query.target_currency)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Insert a new rate record, returning the stored row.
pub struct InsertRate {
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
}

impl Processor<InsertRate> for DatabaseProcessor {
    type Output = RateRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertRate")]
    async fn process(&self, insert: InsertRate) -> Result<RateRecord, sqlx::Error> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "INSERT INTO rate_records (base_currency, target_currency, rate) \
             VALUES ($1, $2, $3) RETURNING {RATE_COLUMNS}"
        ))
        .bind(insert.base_currency)
        .bind(insert.target_currency)
        .bind(insert.rate)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Replace a record's rate and advance `updated_at`. `created_at` is never
/// touched. Returns the updated row, or `None` if the id does not exist.
pub struct UpdateRateValue {
    pub id: i64,
    pub new_rate: Decimal,
}

impl Processor<UpdateRateValue> for DatabaseProcessor {
    type Output = Option<RateRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateRateValue")]
    async fn process(&self, update: UpdateRateValue) -> Result<Option<RateRecord>, sqlx::Error> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "UPDATE rate_records SET rate = $2, updated_at = now() \
             WHERE id = $1 RETURNING {RATE_COLUMNS}"
        ))
        .bind(update.id)
        .bind(update.new_rate)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Delete a rate record by id. Returns the number of rows removed.
pub struct DeleteRateById {
    pub id: i64,
}

impl Processor<DeleteRateById> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteRateById")]
    async fn process(&self, delete: DeleteRateById) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rate_records WHERE id = $1")
            .bind(delete.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl RateRecord {
    /// Look up a pair within a reconciliation transaction.
    pub async fn get_by_pair_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        base_currency: &str,
        target_currency: &str,
    ) -> Result<Option<RateRecord>, sqlx::Error> {
        sqlx::query_as::<_, RateRecord>(&format!(
            "SELECT {RATE_COLUMNS} FROM rate_records \
             WHERE base_currency = $1 AND target_currency = $2"
        ))
        .bind(base_currency)
        .bind(target_currency)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Insert a new pair within a reconciliation transaction.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        base_currency: &str,
        target_currency: &str,
        rate: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO rate_records (base_currency, target_currency, rate) \
             VALUES ($1, $2, $3)",
        )
        .bind(base_currency)
        .bind(target_currency)
        .bind(rate)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Replace a record's rate within a reconciliation transaction.
    pub async fn update_rate_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i64,
        new_rate: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rate_records SET rate = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(new_rate)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
