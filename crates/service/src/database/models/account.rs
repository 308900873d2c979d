use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use common::account::Account;

use super::super::Database;

#[derive(Debug, thiserror::Error)]
pub enum AccountStoreError {
    #[error("account not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt account record: {0}")]
    Corrupt(String),
}

/// Insert or replace an account record in one statement.
pub async fn create_or_update(account: &Account, db: &Database) -> Result<(), AccountStoreError> {
    sqlx::query(
        r#"
        INSERT INTO accounts
            (name, driver, username, password, root_folder, status, drive_id,
             proxy, sort_by, sort_direction, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(name) DO UPDATE SET
            driver = excluded.driver,
            username = excluded.username,
            password = excluded.password,
            root_folder = excluded.root_folder,
            status = excluded.status,
            drive_id = excluded.drive_id,
            proxy = excluded.proxy,
            sort_by = excluded.sort_by,
            sort_direction = excluded.sort_direction,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&account.name)
    .bind(&account.driver)
    .bind(&account.username)
    .bind(&account.password)
    .bind(&account.root_folder)
    .bind(&account.status)
    .bind(&account.drive_id)
    .bind(account.proxy)
    .bind(account.sort_by.to_string())
    .bind(account.sort_direction.to_string())
    .bind(account.updated_at)
    .execute(&**db)
    .await?;
    Ok(())
}

pub async fn get_by_name(name: &str, db: &Database) -> Result<Option<Account>, AccountStoreError> {
    let row = sqlx::query("SELECT * FROM accounts WHERE name = ?1")
        .bind(name)
        .fetch_optional(&**db)
        .await?;
    row.map(|r| from_row(&r)).transpose()
}

pub async fn delete_by_name(name: &str, db: &Database) -> Result<(), AccountStoreError> {
    let result = sqlx::query("DELETE FROM accounts WHERE name = ?1")
        .bind(name)
        .execute(&**db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AccountStoreError::NotFound(name.to_string()));
    }
    Ok(())
}

pub async fn list_all(db: &Database) -> Result<Vec<Account>, AccountStoreError> {
    let rows = sqlx::query("SELECT * FROM accounts ORDER BY name")
        .fetch_all(&**db)
        .await?;
    rows.iter().map(from_row).collect()
}

fn from_row(row: &SqliteRow) -> Result<Account, AccountStoreError> {
    let sort_by: String = row.try_get("sort_by")?;
    let sort_direction: String = row.try_get("sort_direction")?;
    let updated_at: Option<DateTime<Utc>> = row.try_get("updated_at")?;
    Ok(Account {
        name: row.try_get("name")?,
        driver: row.try_get("driver")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        root_folder: row.try_get("root_folder")?,
        status: row.try_get("status")?,
        drive_id: row.try_get("drive_id")?,
        proxy: row.try_get("proxy")?,
        sort_by: sort_by.parse().map_err(AccountStoreError::Corrupt)?,
        sort_direction: sort_direction.parse().map_err(AccountStoreError::Corrupt)?,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::account::{SortBy, SortDirection};
    use url::Url;

    async fn memory_db() -> Database {
        let url = Url::parse("sqlite::memory:").unwrap();
        Database::connect(&url).await.expect("connect")
    }

    fn sample(name: &str) -> Account {
        Account {
            name: name.into(),
            driver: "local".into(),
            username: String::new(),
            password: String::new(),
            root_folder: "/srv/data".into(),
            status: "work".into(),
            drive_id: String::new(),
            proxy: true,
            sort_by: SortBy::Size,
            sort_direction: SortDirection::Desc,
            updated_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn round_trip_and_upsert() {
        let db = memory_db().await;
        let mut account = sample("disk");
        create_or_update(&account, &db).await.unwrap();

        let loaded = get_by_name("disk", &db).await.unwrap().expect("present");
        assert_eq!(loaded.root_folder, "/srv/data");
        assert_eq!(loaded.sort_by, SortBy::Size);
        assert!(loaded.proxy);

        account.status = "root folder missing".into();
        create_or_update(&account, &db).await.unwrap();
        let reloaded = get_by_name("disk", &db).await.unwrap().unwrap();
        assert_eq!(reloaded.status, "root folder missing");
        assert_eq!(list_all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let db = memory_db().await;
        let err = delete_by_name("ghost", &db).await.unwrap_err();
        assert!(matches!(err, AccountStoreError::NotFound(_)));
    }
}
