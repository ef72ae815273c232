use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(255) NULL,
        first_name VARCHAR(255) NULL,
        last_name VARCHAR(255) NULL,
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS schedule_batches (
        id BIGSERIAL PRIMARY KEY,
        status VARCHAR(16) NOT NULL DEFAULT 'DRAFTED',
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        total_days INTEGER NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_status CHECK (status IN ('DRAFTED', 'PUBLISHED')),
        CONSTRAINT valid_date_span CHECK (end_date >= start_date)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS schedule_entries (
        id BIGSERIAL PRIMARY KEY,
        batch_id BIGINT NOT NULL REFERENCES schedule_batches(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id),
        date DATE NOT NULL,
        start_time TIME NOT NULL,
        end_time TIME NOT NULL,
        total_hours DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT valid_time_range CHECK (end_time > start_time)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_schedule_entries_batch_id ON schedule_entries(batch_id);",
    "CREATE INDEX IF NOT EXISTS idx_schedule_entries_user_date ON schedule_entries(user_id, date);",
    "CREATE INDEX IF NOT EXISTS idx_schedule_batches_created_at ON schedule_batches(created_at);",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // One statement per query; prepared statements reject batches.
    for statement in STATEMENTS {
        sqlx::query(*statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
