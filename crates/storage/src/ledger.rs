use std::str::FromStr;

use tally_core::{Account, AccountId, AccountKind, DateRange, Money, Statement, Tag, TransactionId};

use crate::db::{parse_date, DbPool, StorageError};

// ── Accounts ──────────────────────────────────────────────────────────────────

pub async fn insert_account(pool: &DbPool, account: &Account) -> Result<AccountId, StorageError> {
    let result = sqlx::query("INSERT INTO accounts (name, kind, is_archived) VALUES (?, ?, ?)")
        .bind(&account.name)
        .bind(account.kind.to_string())
        .bind(account.is_archived)
        .execute(pool)
        .await?;
    Ok(AccountId(result.last_insert_rowid()))
}

/// Active accounts, by name.
pub async fn get_all_accounts(pool: &DbPool) -> Result<Vec<Account>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, String, String, bool)>(
        "SELECT id, name, kind, is_archived FROM accounts WHERE is_archived = 0 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            let kind = AccountKind::from_str(&r.2)
                .map_err(|detail| StorageError::CorruptRow { table: "accounts", detail })?;
            Ok(Account {
                id: Some(AccountId(r.0)),
                name: r.1,
                kind,
                is_archived: r.3,
            })
        })
        .collect()
}

// ── Tags ──────────────────────────────────────────────────────────────────────

/// Returns the tag called `name`, creating it if needed.
pub async fn insert_tag(pool: &DbPool, name: &str) -> Result<Tag, StorageError> {
    sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(Tag { id: Some(id), name: name.to_string() })
}

pub async fn tag_transaction(
    pool: &DbPool,
    transaction_id: TransactionId,
    tag_id: i64,
) -> Result<(), StorageError> {
    sqlx::query("INSERT OR IGNORE INTO transaction_tags (transaction_id, tag_id) VALUES (?, ?)")
        .bind(transaction_id.0)
        .bind(tag_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_tags_for_transaction(
    pool: &DbPool,
    transaction_id: TransactionId,
) -> Result<Vec<Tag>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT t.id, t.name
        FROM tags t
        JOIN transaction_tags tt ON tt.tag_id = t.id
        WHERE tt.transaction_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(transaction_id.0)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| Tag { id: Some(r.0), name: r.1 }).collect())
}

// ── Statements ────────────────────────────────────────────────────────────────

pub async fn insert_statement(pool: &DbPool, statement: &Statement) -> Result<i64, StorageError> {
    let result = sqlx::query(
        "INSERT INTO statements (account_id, start_date, end_date, starting_balance_cents, ending_balance_cents) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(statement.account_id.0)
    .bind(statement.period.start.to_string())
    .bind(statement.period.end.to_string())
    .bind(statement.starting_balance.to_cents())
    .bind(statement.ending_balance.to_cents())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Oldest period first.
pub async fn get_statements_for_account(
    pool: &DbPool,
    account_id: AccountId,
) -> Result<Vec<Statement>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, i64, String, String, i64, i64)>(
        "SELECT id, account_id, start_date, end_date, starting_balance_cents, ending_balance_cents FROM statements WHERE account_id = ? ORDER BY start_date",
    )
    .bind(account_id.0)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(Statement {
                id: Some(r.0),
                account_id: AccountId(r.1),
                period: DateRange::new(
                    parse_date("statements", &r.2)?,
                    parse_date("statements", &r.3)?,
                ),
                starting_balance: Money::from_cents(r.4),
                ending_balance: Money::from_cents(r.5),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;
    use crate::transactions::upsert_transaction;
    use chrono::NaiveDate;
    use tally_core::Transaction;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn archived_accounts_are_hidden() {
        let (_dir, pool) = temp_db().await;
        insert_account(&pool, &Account::new("Visa", AccountKind::Credit)).await.unwrap();
        let mut old = Account::new("Old Savings", AccountKind::Savings);
        old.is_archived = true;
        insert_account(&pool, &old).await.unwrap();

        let accounts = get_all_accounts(&pool).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Visa");
        assert_eq!(accounts[0].kind, AccountKind::Credit);
    }

    #[tokio::test]
    async fn insert_tag_is_idempotent() {
        let (_dir, pool) = temp_db().await;
        let first = insert_tag(&pool, "groceries").await.unwrap();
        let second = insert_tag(&pool, "groceries").await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn tags_attach_to_transactions() {
        let (_dir, pool) = temp_db().await;
        let mut tx = Transaction::new(d(2024, 2, 2), "Market");
        let tx_id = upsert_transaction(&pool, &mut tx).await.unwrap();
        let food = insert_tag(&pool, "food").await.unwrap();
        let weekly = insert_tag(&pool, "weekly").await.unwrap();

        tag_transaction(&pool, tx_id, weekly.id.unwrap()).await.unwrap();
        tag_transaction(&pool, tx_id, food.id.unwrap()).await.unwrap();
        tag_transaction(&pool, tx_id, food.id.unwrap()).await.unwrap();

        let names: Vec<_> = get_tags_for_transaction(&pool, tx_id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["food", "weekly"]);
    }

    #[tokio::test]
    async fn statements_roundtrip_in_period_order() {
        let (_dir, pool) = temp_db().await;
        let acct = insert_account(&pool, &Account::new("Checking", AccountKind::Checking))
            .await
            .unwrap();

        let feb = Statement::new(
            acct,
            DateRange::new(d(2024, 2, 1), d(2024, 2, 29)),
            Money::from_cents(50_000),
            Money::from_cents(42_000),
        )
        .unwrap();
        let jan = Statement::new(
            acct,
            DateRange::new(d(2024, 1, 1), d(2024, 1, 31)),
            Money::from_cents(60_000),
            Money::from_cents(50_000),
        )
        .unwrap();
        insert_statement(&pool, &feb).await.unwrap();
        insert_statement(&pool, &jan).await.unwrap();

        let statements = get_statements_for_account(&pool, acct).await.unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].period.start, d(2024, 1, 1));
        assert_eq!(statements[1].net_change().to_cents(), -8_000);
    }
}
