use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Row};

use crate::db::{self, Db};
use crate::domain::period::{format_date, DATE_FORMAT};
use crate::error::AppError;
use crate::models::{
  Account, AccountInput, Category, CategoryInput, CategoryQuery, EntryType, Transaction, TransactionInput,
  TransactionQuery,
};

pub trait CategoryStore: Send + Sync {
  fn categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, AppError>;
}

pub trait TransactionStore: Send + Sync {
  fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, AppError>;
}

pub trait AccountStore: Send + Sync {
  fn accounts(&self, user_id: &str) -> Result<Vec<Account>, AppError>;
}

pub struct SqliteLedger {
  db: Arc<Db>,
}

impl SqliteLedger {
  pub fn new(db: Arc<Db>) -> Self {
    Self { db }
  }

  pub fn create_category(&self, input: CategoryInput) -> Result<Category, AppError> {
    db::with_conn(&self.db, |conn| {
      conn.execute(
        "INSERT INTO categories (user_id, name, type, spending_limit, color) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
          input.user_id,
          input.name,
          input.category_type.as_str(),
          input.spending_limit,
          input.color
        ],
      )?;
      let id = conn.last_insert_rowid();
      Ok(Category {
        id,
        user_id: input.user_id,
        name: input.name,
        category_type: input.category_type,
        spending_limit: input.spending_limit,
        color: input.color,
      })
    })
  }

  pub fn set_spending_limit(&self, category_id: i64, limit: Option<f64>) -> Result<(), AppError> {
    db::with_conn(&self.db, |conn| {
      let changed = conn.execute(
        "UPDATE categories SET spending_limit = ?1 WHERE id = ?2",
        params![limit, category_id],
      )?;
      if changed == 0 {
        return Err(AppError::new("NOT_FOUND", format!("category {category_id} not found")));
      }
      Ok(())
    })
  }

  pub fn create_account(&self, input: AccountInput) -> Result<Account, AppError> {
    db::with_conn(&self.db, |conn| {
      conn.execute(
        "INSERT INTO accounts (user_id, name, balance) VALUES (?1, ?2, ?3)",
        params![input.user_id, input.name, input.balance],
      )?;
      Ok(Account {
        id: conn.last_insert_rowid(),
        user_id: input.user_id,
        name: input.name,
        balance: input.balance,
      })
    })
  }

  pub fn create_transaction(&self, input: TransactionInput) -> Result<Transaction, AppError> {
    db::with_conn(&self.db, |conn| {
      conn.execute(
        "INSERT INTO transactions (user_id, category_id, account_id, type, amount, date, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
          input.user_id,
          input.category_id,
          input.account_id,
          input.tx_type.as_str(),
          input.amount,
          format_date(input.date),
          input.description
        ],
      )?;
      Ok(Transaction {
        id: conn.last_insert_rowid(),
        user_id: input.user_id,
        category_id: input.category_id,
        account_id: input.account_id,
        tx_type: input.tx_type,
        amount: input.amount,
        date: input.date,
        description: input.description,
      })
    })
  }
}

impl CategoryStore for SqliteLedger {
  fn categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, AppError> {
    let mut sql = String::from(
      "SELECT id, user_id, name, type, spending_limit, color FROM categories WHERE user_id = ?",
    );
    let mut values = vec![Value::Text(query.user_id.clone())];
    if let Some(category_type) = query.category_type {
      sql.push_str(" AND type = ?");
      values.push(Value::Text(category_type.as_str().to_string()));
    }
    if query.with_spending_limit {
      sql.push_str(" AND spending_limit IS NOT NULL");
    }
    sql.push_str(" ORDER BY name");

    db::with_conn(&self.db, |conn| {
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(Category {
          id: row.get(0)?,
          user_id: row.get(1)?,
          name: row.get(2)?,
          category_type: entry_type_column(row, 3)?,
          spending_limit: row.get(4)?,
          color: row.get(5)?,
        })
      })?;
      let mut data = Vec::new();
      for row in rows {
        data.push(row?);
      }
      Ok(data)
    })
  }
}

impl TransactionStore for SqliteLedger {
  fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, AppError> {
    let mut sql = String::from(
      "SELECT id, user_id, category_id, account_id, type, amount, date, description
       FROM transactions
       WHERE user_id = ? AND date BETWEEN ? AND ?",
    );
    let mut values = vec![
      Value::Text(query.user_id.clone()),
      Value::Text(format_date(query.start_date)),
      Value::Text(format_date(query.end_date)),
    ];
    if let Some(category_id) = query.category_id {
      sql.push_str(" AND category_id = ?");
      values.push(Value::Integer(category_id));
    }
    if let Some(tx_type) = query.tx_type {
      sql.push_str(" AND type = ?");
      values.push(Value::Text(tx_type.as_str().to_string()));
    }
    sql.push_str(" ORDER BY date, id");

    db::with_conn(&self.db, |conn| {
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(Transaction {
          id: row.get(0)?,
          user_id: row.get(1)?,
          category_id: row.get(2)?,
          account_id: row.get(3)?,
          tx_type: entry_type_column(row, 4)?,
          amount: row.get(5)?,
          date: date_column(row, 6)?,
          description: row.get(7)?,
        })
      })?;
      let mut data = Vec::new();
      for row in rows {
        data.push(row?);
      }
      Ok(data)
    })
  }
}

impl AccountStore for SqliteLedger {
  fn accounts(&self, user_id: &str) -> Result<Vec<Account>, AppError> {
    db::with_conn(&self.db, |conn| {
      let mut stmt = conn.prepare("SELECT id, user_id, name, balance FROM accounts WHERE user_id = ?1 ORDER BY name")?;
      let rows = stmt.query_map(params![user_id], |row| {
        Ok(Account {
          id: row.get(0)?,
          user_id: row.get(1)?,
          name: row.get(2)?,
          balance: row.get(3)?,
        })
      })?;
      let mut data = Vec::new();
      for row in rows {
        data.push(row?);
      }
      Ok(data)
    })
  }
}

fn entry_type_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<EntryType> {
  let raw: String = row.get(idx)?;
  EntryType::parse(&raw).ok_or_else(|| {
    rusqlite::Error::FromSqlConversionFailure(
      idx,
      Type::Text,
      Box::new(AppError::new("DB_ERROR", format!("unknown entry type '{raw}'"))),
    )
  })
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
  let raw: String = row.get(idx)?;
  NaiveDate::parse_from_str(&raw, DATE_FORMAT)
    .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}
