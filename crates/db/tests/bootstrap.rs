use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    foltia_db::health_check(&pool).await.unwrap();

    let tables = [
        "foltia_station",
        "foltia_program",
        "foltia_subtitle",
        "foltia_m2pfiles",
        "foltia_mp4files",
        "foltia_hdmp4files",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Re-running the embedded migrator on a migrated database is a no-op.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_migrations_are_idempotent(pool: PgPool) {
    foltia_db::run_migrations(&pool).await.unwrap();
}
