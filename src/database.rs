use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id             TEXT    PRIMARY KEY,
    login          TEXT    UNIQUE NOT NULL,
    name           TEXT    NOT NULL,
    email          TEXT    NOT NULL,
    password_hash  TEXT    NOT NULL,
    created        TEXT    NOT NULL
);
"#;

const CREATE_OPERATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS operations (
    id       TEXT PRIMARY KEY,
    name     TEXT NOT NULL,
    id_user  TEXT NOT NULL,
    created  TEXT NOT NULL
);
"#;

const CREATE_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id          TEXT PRIMARY KEY,
    kind        TEXT,
    name        TEXT NOT NULL,
    description TEXT,
    icon        TEXT,
    created     TEXT NOT NULL,
    updated     TEXT NOT NULL
);
"#;

const CREATE_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id           TEXT PRIMARY KEY,
    id_operation TEXT NOT NULL,
    name         TEXT NOT NULL,
    amount       REAL NOT NULL,
    created      TEXT NOT NULL,
    updated      TEXT NOT NULL
);
"#;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id            TEXT PRIMARY KEY,
    id_operation  TEXT NOT NULL,
    category_name TEXT NOT NULL,
    category_icon TEXT NOT NULL,
    name          TEXT NOT NULL,
    kind          TEXT NOT NULL,
    amount        REAL NOT NULL,
    date_amount   TEXT NOT NULL,
    created       TEXT NOT NULL,
    updated       TEXT NOT NULL
);
"#;

const CREATE_BUDGETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS budgets (
    id            TEXT PRIMARY KEY,
    id_operation  TEXT NOT NULL,
    id_category   TEXT NOT NULL,
    category_name TEXT NOT NULL,
    category_ref  TEXT NOT NULL DEFAULT '',
    kind          TEXT NOT NULL,
    amount        REAL NOT NULL
);
"#;

const CREATE_OPERATIONS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_operations_user ON operations(id_user);
"#;

const CREATE_ENTRIES_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_entries_operation ON entries(id_operation);
"#;

const CREATE_EXPENSES_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_expenses_operation ON expenses(id_operation);
"#;

const CREATE_BUDGETS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_budgets_operation ON budgets(id_operation);
"#;

pub type Db = Arc<RwLock<Connection>>;

/// Databases created before the typed category columns carry only the
/// composite `id_category` string. Add the columns and split the composite
/// once here, so nothing ever parses the delimiter at query time.
async fn ensure_budget_category_columns(conn: &Connection) -> Result<()> {
    let mut rows = conn.query("PRAGMA table_info(budgets)", ()).await?;
    let mut has_category_name = false;
    let mut has_category_ref = false;

    while let Some(row) = rows.next().await? {
        let name: String = row.get(1)?;
        match name.as_str() {
            "category_name" => has_category_name = true,
            "category_ref" => has_category_ref = true,
            _ => {}
        }
    }

    if has_category_name && has_category_ref {
        return Ok(());
    }

    if !has_category_name {
        conn.execute(
            "ALTER TABLE budgets ADD COLUMN category_name TEXT NOT NULL DEFAULT ''",
            (),
        )
        .await?;
    }
    if !has_category_ref {
        conn.execute(
            "ALTER TABLE budgets ADD COLUMN category_ref TEXT NOT NULL DEFAULT ''",
            (),
        )
        .await?;
    }

    conn.execute(
        "UPDATE budgets SET \
             category_name = CASE WHEN instr(id_category, '|') > 0 \
                 THEN substr(id_category, 1, instr(id_category, '|') - 1) \
                 ELSE id_category END, \
             category_ref = CASE WHEN instr(id_category, '|') > 0 \
                 THEN substr(id_category, instr(id_category, '|') + 1) \
                 ELSE '' END \
         WHERE category_name = ''",
        (),
    )
    .await?;

    Ok(())
}

/// Ledger database (ledger.db) holding every collection.
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join("ledger.db");
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    conn.execute(CREATE_USERS_TABLE, ()).await?;
    conn.execute(CREATE_OPERATIONS_TABLE, ()).await?;
    conn.execute(CREATE_CATEGORIES_TABLE, ()).await?;
    conn.execute(CREATE_ENTRIES_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute(CREATE_BUDGETS_TABLE, ()).await?;
    ensure_budget_category_columns(&conn).await?;
    conn.execute(CREATE_OPERATIONS_INDEX, ()).await?;
    conn.execute(CREATE_ENTRIES_INDEX, ()).await?;
    conn.execute(CREATE_EXPENSES_INDEX, ()).await?;
    conn.execute(CREATE_BUDGETS_INDEX, ()).await?;

    Ok(Arc::new(RwLock::new(conn)))
}
