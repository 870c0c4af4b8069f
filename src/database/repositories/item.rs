use sqlx::PgPool;

use crate::database::models::item::ItemEntity;

/// 条目存储库
///
/// 更新和删除都带属主条件，零行命中由调用方按不存在处理，
/// 这里不区分"没有这一行"和"这一行不是你的"。
pub struct ItemRepository;

impl ItemRepository {
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: i64,
    ) -> Result<Vec<ItemEntity>, sqlx::Error> {
        let items = sqlx::query_as::<_, ItemEntity>(
            r#"
            SELECT id, title, description, user_id, created_at, updated_at
            FROM items
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    pub async fn find_for_owner(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<ItemEntity>, sqlx::Error> {
        let item = sqlx::query_as::<_, ItemEntity>(
            r#"
            SELECT id, title, description, user_id, created_at, updated_at
            FROM items
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    pub async fn create(
        pool: &PgPool,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<ItemEntity, sqlx::Error> {
        let item = sqlx::query_as::<_, ItemEntity>(
            r#"
            INSERT INTO items (title, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, user_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    /// 条件更新，行级条件是并发写的唯一串行化点
    pub async fn update_for_owner(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Option<ItemEntity>, sqlx::Error> {
        let item = sqlx::query_as::<_, ItemEntity>(
            r#"
            UPDATE items
            SET title = $1, description = $2, updated_at = now()
            WHERE id = $3 AND user_id = $4
            RETURNING id, title, description, user_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    pub async fn delete_for_owner(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<ItemEntity>, sqlx::Error> {
        let item = sqlx::query_as::<_, ItemEntity>(
            r#"
            DELETE FROM items
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, description, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    pub async fn count_for_owner(pool: &PgPool, owner_id: i64) -> Result<i64, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE user_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(total)
    }
}
