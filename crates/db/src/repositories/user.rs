use crate::models::DbUser;
use eyre::Result;
use sqlx::PgExecutor;

pub async fn create_user<'e, E: PgExecutor<'e>>(
    executor: E,
    email: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<DbUser> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (email, first_name, last_name)
        VALUES ($1, $2, $3)
        RETURNING id, email, first_name, last_name
        "#,
    )
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(executor)
    .await?;

    tracing::debug!("User created: id={}", user.id);
    Ok(user)
}

/// Contacts for the given ids. Soft-deleted users are left out.
pub async fn get_contacts<'e, E: PgExecutor<'e>>(executor: E, ids: &[i64]) -> Result<Vec<DbUser>> {
    let users = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, first_name, last_name
        FROM users
        WHERE id = ANY($1) AND is_deleted = FALSE
        ORDER BY id ASC
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(users)
}
