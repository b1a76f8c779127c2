use sea_orm::ConnectionTrait;
use task_tracker::database::Database;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};

const SCHEMA: &str = include_str!("../../sql/tasks.sql");

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<Database> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let db_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
    let conn = sea_orm::Database::connect(&db_url).await?;
    conn.execute_unprepared(SCHEMA).await?;
    Ok(Database::from(conn))
}
