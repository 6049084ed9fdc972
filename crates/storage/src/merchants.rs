use tally_core::{LocationId, Merchant, MerchantId, MerchantLocation};

use crate::db::{DbPool, StorageError};

pub async fn insert_merchant(pool: &DbPool, name: &str) -> Result<MerchantId, StorageError> {
    let result = sqlx::query("INSERT INTO merchants (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(MerchantId(result.last_insert_rowid()))
}

pub async fn get_merchant_by_id(
    pool: &DbPool,
    id: MerchantId,
) -> Result<Option<Merchant>, StorageError> {
    let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM merchants WHERE id = ?")
        .bind(id.0)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Merchant { id: Some(MerchantId(r.0)), name: r.1 }))
}

pub async fn get_all_merchants(pool: &DbPool) -> Result<Vec<Merchant>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM merchants ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| Merchant { id: Some(MerchantId(r.0)), name: r.1 })
        .collect())
}

pub async fn insert_merchant_location(
    pool: &DbPool,
    merchant_id: MerchantId,
    latitude: Option<f64>,
    longitude: Option<f64>,
    description: &str,
) -> Result<LocationId, StorageError> {
    let result = sqlx::query(
        "INSERT INTO merchant_locations (merchant_id, latitude, longitude, description) VALUES (?, ?, ?, ?)",
    )
    .bind(merchant_id.0)
    .bind(latitude)
    .bind(longitude)
    .bind(description)
    .execute(pool)
    .await?;
    Ok(LocationId(result.last_insert_rowid()))
}

/// The whole location catalog, in insertion order.
///
/// Always queries the store; nothing is cached between calls.
pub async fn get_all_merchant_locations(
    pool: &DbPool,
) -> Result<Vec<MerchantLocation>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, i64, Option<f64>, Option<f64>, String)>(
        "SELECT id, merchant_id, latitude, longitude, description FROM merchant_locations ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| MerchantLocation {
            id: LocationId(r.0),
            merchant_id: MerchantId(r.1),
            latitude: r.2,
            longitude: r.3,
            description: r.4,
        })
        .collect())
}

pub async fn get_locations_for_merchant(
    pool: &DbPool,
    merchant_id: MerchantId,
) -> Result<Vec<MerchantLocation>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, i64, Option<f64>, Option<f64>, String)>(
        "SELECT id, merchant_id, latitude, longitude, description FROM merchant_locations WHERE merchant_id = ? ORDER BY id",
    )
    .bind(merchant_id.0)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| MerchantLocation {
            id: LocationId(r.0),
            merchant_id: MerchantId(r.1),
            latitude: r.2,
            longitude: r.3,
            description: r.4,
        })
        .collect())
}

pub async fn delete_merchant_location(pool: &DbPool, id: LocationId) -> Result<(), StorageError> {
    let result = sqlx::query("DELETE FROM merchant_locations WHERE id = ?")
        .bind(id.0)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound { table: "merchant_locations", id: id.0 });
    }
    Ok(())
}
