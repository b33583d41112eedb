//! # 지속(durable) 키-값 저장소 쿼리 모듈
//!
//! 브라우저의 localStorage에 해당하는 저장소입니다.
//! `storage_items` 테이블 한 행이 키 하나입니다.
//!
//! ## 동시성
//! 잠금 규칙은 없습니다. 같은 키를 두 탭이 동시에 쓰면 나중에 쓴 값이 남습니다.

use crate::error::AppError;
use sqlx::SqlitePool;

/// 키의 값을 읽습니다. 없으면 `None`.
pub async fn get_item(pool: &SqlitePool, key: &str) -> Result<Option<String>, AppError> {
    // query_scalar: 한 컬럼만 꺼낼 때 튜플/구조체 없이 바로 값으로 받습니다.
    let value = sqlx::query_scalar::<_, String>(
        r#"
        SELECT value FROM storage_items WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value)
}

/// 키에 값을 씁니다. 이미 있으면 덮어씁니다.
pub async fn set_item(pool: &SqlitePool, key: &str, value: &str) -> Result<(), AppError> {
    // ON CONFLICT ... DO UPDATE: SQLite의 upsert 문법
    sqlx::query(
        r#"
        INSERT INTO storage_items (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE
        SET value = excluded.value,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// 키를 지웁니다. 지운 행이 있었으면 true.
pub async fn remove_item(pool: &SqlitePool, key: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM storage_items WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// `keep`에 있는 키를 제외하고 모두 지웁니다.
///
/// "모든 데이터 지우기"에서 화면 테마 같은 일부 설정은 남겨야 하므로
/// 남길 키 목록을 받습니다.
pub async fn clear_items_except(pool: &SqlitePool, keep: &[&str]) -> Result<u64, AppError> {
    let mut deleted = 0;
    let keys = sqlx::query_scalar::<_, String>("SELECT key FROM storage_items")
        .fetch_all(pool)
        .await?;

    for key in keys.iter().filter(|k| !keep.contains(&k.as_str())) {
        if remove_item(pool, key).await? {
            deleted += 1;
        }
    }

    Ok(deleted)
}
