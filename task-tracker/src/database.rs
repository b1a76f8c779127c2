//! Thin data-access layer over a sea-orm connection.
//!
//! Every operation takes the statement text plus positional parameters and
//! runs exactly one statement. Values are always bound, never spliced into
//! the SQL. Errors are returned as-is; nothing here retries or classifies.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, QueryResult, Statement, TryGetable, Value,
};

/// Handle to the task store.
///
/// Wraps a pooled [`DatabaseConnection`]: each call checks a connection out
/// for the duration of one statement and hands it back on every exit path.
#[derive(Debug)]
pub struct Database {
    conn: DatabaseConnection,
}

impl From<DatabaseConnection> for Database {
    fn from(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl Database {
    /// Connects to the store behind `database_url`.
    #[tracing::instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let conn = sea_orm::Database::connect(database_url).await?;
        Ok(Self { conn })
    }

    /// Returns the underlying connection.
    pub fn into_inner(self) -> DatabaseConnection {
        self.conn
    }

    fn statement<I>(&self, sql: &str, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(self.conn.get_database_backend(), sql, values)
    }

    /// Runs a query and returns every row, in the order the store produced them.
    ///
    /// Columns are read by name with [`QueryResult::try_get`]; NULLs decode to
    /// `None` when read as an `Option`.
    pub async fn query<I>(&self, sql: &str, values: I) -> Result<Vec<QueryResult>, DbErr>
    where
        I: IntoIterator<Item = Value>,
    {
        let statement = self.statement(sql, values);
        tracing::debug!(sql = %statement.sql, "query");
        self.conn.query_all(statement).await
    }

    /// Runs a statement that produces no rows and returns the affected-row count.
    pub async fn execute_non_query<I>(&self, sql: &str, values: I) -> Result<u64, DbErr>
    where
        I: IntoIterator<Item = Value>,
    {
        let statement = self.statement(sql, values);
        tracing::debug!(sql = %statement.sql, "execute");
        let result = self.conn.execute(statement).await?;
        Ok(result.rows_affected())
    }

    /// Runs a query and decodes the first column of the first row as `T`.
    ///
    /// Returns `None` when there is no row or the value is NULL.
    pub async fn execute_scalar<T, I>(&self, sql: &str, values: I) -> Result<Option<T>, DbErr>
    where
        T: TryGetable,
        I: IntoIterator<Item = Value>,
    {
        let statement = self.statement(sql, values);
        tracing::debug!(sql = %statement.sql, "scalar");
        match self.conn.query_one(statement).await? {
            Some(row) => row.try_get_by_index::<Option<T>>(0),
            None => Ok(None),
        }
    }

    /// Runs an insert and returns the key the store generated for it.
    ///
    /// The statement must hand the key back as its first column, e.g. with
    /// `RETURNING id`.
    pub async fn execute_insert_and_get_id<I>(&self, sql: &str, values: I) -> Result<i64, DbErr>
    where
        I: IntoIterator<Item = Value>,
    {
        let statement = self.statement(sql, values);
        tracing::debug!(sql = %statement.sql, "insert");
        let row = self
            .conn
            .query_one(statement)
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        row.try_get_by_index::<i64>(0)
    }
}
