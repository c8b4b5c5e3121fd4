/// View counter persistence
///
/// The counter is a single row in `stats`. A bump updates the row and, if
/// no row exists yet, inserts it inside the same transaction. The insert is
/// an upsert on the singleton key, so two first bumps racing each other both
/// land on the same row.
use sqlx::PgPool;
use tracing::debug;

/// Add `delta` to the view counter, creating it on first use
pub async fn increment_views(pool: &PgPool, delta: i64) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query("UPDATE stats SET view = view + $1 WHERE id = 1")
        .bind(delta)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if updated == 0 {
        debug!("View counter row missing, creating it");
        sqlx::query(
            r#"
            INSERT INTO stats (id, view)
            VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE SET view = stats.view + EXCLUDED.view
            "#,
        )
        .bind(delta)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Current view count, `None` if nothing was ever counted
pub async fn read_views(pool: &PgPool) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64,)>("SELECT view FROM stats WHERE id = 1")
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(view,)| view))
}
