//! Table definitions, applied idempotently at startup.

use sqlx::PgPool;

pub const CREATE_TABLES: [&str; 6] = [
    "CREATE TABLE IF NOT EXISTS makes (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS body_styles (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS colors (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS models (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        make_id BIGINT NOT NULL REFERENCES makes (id) ON DELETE RESTRICT,
        body_style_id BIGINT NOT NULL REFERENCES body_styles (id) ON DELETE RESTRICT
    )",
    "CREATE TABLE IF NOT EXISTS model_colors (
        model_id BIGINT NOT NULL REFERENCES models (id) ON DELETE CASCADE,
        color_id BIGINT NOT NULL REFERENCES colors (id) ON DELETE CASCADE,
        PRIMARY KEY (model_id, color_id)
    )",
    "CREATE TABLE IF NOT EXISTS cars (
        id BIGSERIAL PRIMARY KEY,
        year INTEGER NOT NULL,
        model_id BIGINT NOT NULL REFERENCES models (id) ON DELETE RESTRICT,
        color_id BIGINT NOT NULL REFERENCES colors (id) ON DELETE RESTRICT
    )",
];

pub async fn apply(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in CREATE_TABLES {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
