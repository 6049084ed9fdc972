use tally_core::{AccountId, Amount, Coordinate, MerchantId, Money, Transaction, TransactionId};

use crate::db::{parse_date, DbPool, StorageError};

type TransactionRow = (
    i64,
    String,
    String,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<f64>,
    Option<f64>,
);

const SELECT_TRANSACTION: &str = "SELECT id, date, description, merchant_id, account_id, receipt_file_name, latitude, longitude FROM transactions";

/// Insert a new transaction or update an existing one, replacing its amounts.
///
/// On success `tx.id` and every amount id are filled in.
pub async fn upsert_transaction(
    pool: &DbPool,
    tx: &mut Transaction,
) -> Result<TransactionId, StorageError> {
    tx.validate()?;

    let (lat, lon) = match tx.coordinate {
        Some(c) => (Some(c.latitude), Some(c.longitude)),
        None => (None, None),
    };

    let mut db = pool.begin().await?;

    let id = match tx.id {
        None => {
            let result = sqlx::query(
                "INSERT INTO transactions (date, description, merchant_id, account_id, receipt_file_name, latitude, longitude) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(tx.date.to_string())
            .bind(&tx.description)
            .bind(tx.merchant_id.map(|m| m.0))
            .bind(tx.account_id.map(|a| a.0))
            .bind(&tx.receipt_file_name)
            .bind(lat)
            .bind(lon)
            .execute(&mut *db)
            .await?;
            TransactionId(result.last_insert_rowid())
        }
        Some(id) => {
            let result = sqlx::query(
                "UPDATE transactions SET date = ?, description = ?, merchant_id = ?, account_id = ?, receipt_file_name = ?, latitude = ?, longitude = ? WHERE id = ?",
            )
            .bind(tx.date.to_string())
            .bind(&tx.description)
            .bind(tx.merchant_id.map(|m| m.0))
            .bind(tx.account_id.map(|a| a.0))
            .bind(&tx.receipt_file_name)
            .bind(lat)
            .bind(lon)
            .bind(id.0)
            .execute(&mut *db)
            .await?;
            if result.rows_affected() == 0 {
                return Err(StorageError::NotFound { table: "transactions", id: id.0 });
            }
            sqlx::query("DELETE FROM amounts WHERE transaction_id = ?")
                .bind(id.0)
                .execute(&mut *db)
                .await?;
            id
        }
    };

    let mut amount_ids = Vec::with_capacity(tx.amounts.len());
    for amount in &tx.amounts {
        let result = sqlx::query(
            "INSERT INTO amounts (transaction_id, amount_cents, description) VALUES (?, ?, ?)",
        )
        .bind(id.0)
        .bind(amount.money.to_cents())
        .bind(&amount.description)
        .execute(&mut *db)
        .await?;
        amount_ids.push(result.last_insert_rowid());
    }

    db.commit().await?;

    tx.id = Some(id);
    for (amount, amount_id) in tx.amounts.iter_mut().zip(amount_ids) {
        amount.id = Some(amount_id);
    }
    Ok(id)
}

pub async fn get_transaction_by_id(
    pool: &DbPool,
    id: TransactionId,
) -> Result<Option<Transaction>, StorageError> {
    let row = sqlx::query_as::<_, TransactionRow>(&format!("{SELECT_TRANSACTION} WHERE id = ?"))
        .bind(id.0)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let amounts = get_amounts(pool, id).await?;
            Ok(Some(transaction_from_row(row, amounts)?))
        }
        None => Ok(None),
    }
}

/// Newest first.
pub async fn get_all_transactions(pool: &DbPool) -> Result<Vec<Transaction>, StorageError> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "{SELECT_TRANSACTION} ORDER BY date DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let amounts = get_amounts(pool, TransactionId(row.0)).await?;
        out.push(transaction_from_row(row, amounts)?);
    }
    Ok(out)
}

pub async fn delete_transaction(pool: &DbPool, id: TransactionId) -> Result<(), StorageError> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id.0)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound { table: "transactions", id: id.0 });
    }
    Ok(())
}

async fn get_amounts(pool: &DbPool, id: TransactionId) -> Result<Vec<Amount>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, i64, Option<String>)>(
        "SELECT id, amount_cents, description FROM amounts WHERE transaction_id = ? ORDER BY id",
    )
    .bind(id.0)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Amount {
            id: Some(r.0),
            money: Money::from_cents(r.1),
            description: r.2,
        })
        .collect())
}

fn transaction_from_row(row: TransactionRow, amounts: Vec<Amount>) -> Result<Transaction, StorageError> {
    let coordinate = match (row.6, row.7) {
        (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
        (None, None) => None,
        _ => {
            return Err(StorageError::CorruptRow {
                table: "transactions",
                detail: format!("transaction {} has half a coordinate", row.0),
            })
        }
    };

    Ok(Transaction {
        id: Some(TransactionId(row.0)),
        date: parse_date("transactions", &row.1)?,
        description: row.2,
        merchant_id: row.3.map(MerchantId),
        account_id: row.4.map(AccountId),
        receipt_file_name: row.5,
        coordinate,
        amounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;
    use crate::merchants::insert_merchant;
    use chrono::NaiveDate;

    fn sample() -> Transaction {
        let mut tx = Transaction::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), "Lunch");
        tx.receipt_file_name = Some("IMG_0042.jpg".into());
        tx.coordinate = Some(Coordinate::new(35.782024, -78.633039));
        tx.amounts.push(Amount::new(Money::from_cents(1250), Some("sandwich".into())));
        tx.amounts.push(Amount::new(Money::from_cents(300), Some("tip".into())));
        tx
    }

    #[tokio::test]
    async fn insert_assigns_ids() {
        let (_dir, pool) = temp_db().await;
        let mut tx = sample();

        let id = upsert_transaction(&pool, &mut tx).await.unwrap();

        assert_eq!(tx.id, Some(id));
        assert!(tx.amounts.iter().all(|a| a.id.is_some()));
    }

    #[tokio::test]
    async fn roundtrip_preserves_fields() {
        let (_dir, pool) = temp_db().await;
        let merchant = insert_merchant(&pool, "Deli").await.unwrap();
        let mut tx = sample();
        tx.merchant_id = Some(merchant);
        let id = upsert_transaction(&pool, &mut tx).await.unwrap();

        let loaded = get_transaction_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(loaded, tx);
        assert_eq!(loaded.total().to_cents(), 1550);
    }

    #[tokio::test]
    async fn update_rewrites_row_and_amounts() {
        let (_dir, pool) = temp_db().await;
        let mut tx = sample();
        let id = upsert_transaction(&pool, &mut tx).await.unwrap();

        tx.receipt_file_name = Some("IMG_0042_1.jpg".into());
        tx.amounts.truncate(1);
        let again = upsert_transaction(&pool, &mut tx).await.unwrap();
        assert_eq!(again, id);

        let loaded = get_transaction_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(loaded.receipt_file_name.as_deref(), Some("IMG_0042_1.jpg"));
        assert_eq!(loaded.amounts.len(), 1);
        assert_eq!(get_all_transactions(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let (_dir, pool) = temp_db().await;
        let mut tx = sample();
        tx.id = Some(TransactionId(77));
        assert!(matches!(
            upsert_transaction(&pool, &mut tx).await,
            Err(StorageError::NotFound { table: "transactions", id: 77 })
        ));
    }

    #[tokio::test]
    async fn invalid_transaction_is_refused() {
        let (_dir, pool) = temp_db().await;
        let mut tx = sample();
        tx.description = String::new();
        assert!(matches!(
            upsert_transaction(&pool, &mut tx).await,
            Err(StorageError::Ledger(_))
        ));
        assert!(tx.id.is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (_dir, pool) = temp_db().await;
        let mut older = Transaction::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Old");
        let mut newer = Transaction::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), "New");
        upsert_transaction(&pool, &mut older).await.unwrap();
        upsert_transaction(&pool, &mut newer).await.unwrap();

        let all = get_all_transactions(&pool).await.unwrap();
        assert_eq!(all[0].description, "New");
        assert_eq!(all[1].description, "Old");
    }

    #[tokio::test]
    async fn delete_cascades_amounts() {
        let (_dir, pool) = temp_db().await;
        let mut tx = sample();
        let id = upsert_transaction(&pool, &mut tx).await.unwrap();

        delete_transaction(&pool, id).await.unwrap();

        assert!(get_transaction_by_id(&pool, id).await.unwrap().is_none());
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM amounts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
