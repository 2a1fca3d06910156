use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a001_sales_record::aggregate::SalesRecord;
use contracts::domain::a002_rfv_entry::aggregate::RfvEntry;
use contracts::domain::a003_seller::aggregate::Seller;
use contracts::domain::a004_client_geoloc::aggregate::ClientGeoloc;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    FromQueryResult, Statement, Value,
};

use super::{AnalyticsStore, RfvQuery, StoreError, StoreResult};
use crate::system::users::PortalUser;

/// Минимальная схема: таблицы создаются, если их нет
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS db_relatorio_vendas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        vend TEXT NOT NULL,
        ft_nfiscal TEXT,
        valor TEXT,
        emissao_nf TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_vendas_vend_emissao ON db_relatorio_vendas (vend, emissao_nf)",
    r#"
    CREATE TABLE IF NOT EXISTS db_rfv (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        codigo TEXT NOT NULL,
        nome_empresa TEXT,
        vendedor TEXT,
        qtd_pedido INTEGER,
        fat_total REAL,
        ticket_medio REAL,
        pri_compra TEXT,
        ult_compra TEXT,
        int_compra REAL,
        dduc INTEGER,
        recencia INTEGER,
        frequencia INTEGER,
        valor INTEGER,
        media_nota REAL,
        status TEXT,
        acao TEXT,
        ranking TEXT,
        rec_freq INTEGER,
        id_atendente INTEGER,
        documento TEXT,
        cs_ativo INTEGER,
        classificacao TEXT,
        descricao TEXT,
        tp_comercio TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_rfv_vendedor ON db_rfv (vendedor)",
    "CREATE INDEX IF NOT EXISTS idx_rfv_codigo ON db_rfv (codigo)",
    r#"
    CREATE TABLE IF NOT EXISTS db_cliente_geoloc (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        id_cliente TEXT,
        lat TEXT,
        lon TEXT
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS db_vendedores (
        id_protheus TEXT PRIMARY KEY NOT NULL,
        nome TEXT NOT NULL,
        telefone TEXT,
        disponivel INTEGER NOT NULL DEFAULT 1,
        foto TEXT,
        email TEXT
    )"#,
    r#"
    CREATE TABLE IF NOT EXISTS db_login_portal (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email_vend TEXT NOT NULL,
        senha_vend TEXT NOT NULL,
        nome TEXT NOT NULL,
        funcao TEXT,
        status TEXT,
        foto_perfil TEXT
    )"#,
];

const RFV_COLUMNS: &str = r#"
    id,
    COALESCE(codigo, '')              AS code,
    nome_empresa                      AS company_name,
    vendedor                          AS seller_name,
    CAST(qtd_pedido AS INTEGER)       AS order_count,
    CAST(fat_total AS REAL)           AS revenue_total,
    CAST(ticket_medio AS REAL)        AS average_ticket,
    pri_compra                        AS first_purchase,
    ult_compra                        AS last_purchase,
    CAST(int_compra AS REAL)          AS purchase_interval,
    CAST(dduc AS INTEGER)             AS days_since_last_purchase,
    CAST(recencia AS INTEGER)         AS recency,
    CAST(frequencia AS INTEGER)       AS frequency,
    CAST(valor AS INTEGER)            AS value,
    CAST(media_nota AS REAL)          AS average_rating,
    status,
    acao                              AS action,
    ranking,
    CAST(rec_freq AS INTEGER)         AS recency_frequency,
    CAST(id_atendente AS INTEGER)     AS attendant_id,
    documento                         AS document,
    CAST(cs_ativo AS INTEGER)         AS cs_active,
    classificacao                     AS classification,
    descricao                         AS description,
    tp_comercio                       AS business_type
"#;

const SELLER_COLUMNS: &str = r#"
    id_protheus                 AS id,
    nome                        AS name,
    telefone                    AS phone,
    foto                        AS photo,
    email,
    CAST(disponivel AS INTEGER) AS available
"#;

const PORTAL_USER_COLUMNS: &str = r#"
    id,
    email_vend  AS email,
    senha_vend  AS credential,
    nome        AS name,
    funcao      AS role,
    status,
    foto_perfil AS photo
"#;

#[derive(Debug, FromQueryResult)]
struct SalesRow {
    seller_id: String,
    invoice_id: Option<String>,
    amount: Option<String>,
    issue_date: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct RfvRow {
    id: i64,
    code: String,
    company_name: Option<String>,
    seller_name: Option<String>,
    order_count: Option<i64>,
    revenue_total: Option<f64>,
    average_ticket: Option<f64>,
    first_purchase: Option<String>,
    last_purchase: Option<String>,
    purchase_interval: Option<f64>,
    days_since_last_purchase: Option<i64>,
    recency: Option<i32>,
    frequency: Option<i32>,
    value: Option<i32>,
    average_rating: Option<f64>,
    status: Option<String>,
    action: Option<String>,
    ranking: Option<String>,
    recency_frequency: Option<i32>,
    attendant_id: Option<i64>,
    document: Option<String>,
    cs_active: Option<i32>,
    classification: Option<String>,
    description: Option<String>,
    business_type: Option<String>,
}

impl From<RfvRow> for RfvEntry {
    fn from(r: RfvRow) -> Self {
        RfvEntry {
            id: r.id,
            code: r.code,
            company_name: r.company_name,
            seller_name: r.seller_name,
            order_count: r.order_count,
            revenue_total: r.revenue_total,
            average_ticket: r.average_ticket,
            first_purchase: r.first_purchase,
            last_purchase: r.last_purchase,
            purchase_interval: r.purchase_interval,
            days_since_last_purchase: r.days_since_last_purchase,
            recency: r.recency,
            frequency: r.frequency,
            value: r.value,
            average_rating: r.average_rating,
            status: r.status,
            action: r.action,
            ranking: r.ranking,
            recency_frequency: r.recency_frequency,
            attendant_id: r.attendant_id,
            document: r.document,
            cs_active: r.cs_active.map(|v| v != 0),
            classification: r.classification,
            description: r.description,
            business_type: r.business_type,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct SellerRow {
    id: String,
    name: String,
    phone: Option<String>,
    photo: Option<String>,
    email: Option<String>,
    available: Option<i32>,
}

impl From<SellerRow> for Seller {
    fn from(r: SellerRow) -> Self {
        Seller {
            id: r.id,
            name: r.name,
            phone: r.phone,
            photo: r.photo,
            email: r.email,
            available: r.available.unwrap_or(0) != 0,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct PortalUserRow {
    id: i64,
    email: String,
    credential: String,
    name: String,
    role: Option<String>,
    status: Option<String>,
    photo: Option<String>,
}

impl From<PortalUserRow> for PortalUser {
    fn from(r: PortalUserRow) -> Self {
        PortalUser {
            id: r.id,
            email: r.email,
            credential: r.credential,
            name: r.name,
            role: r.role,
            status: r.status,
            photo: r.photo,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct GeolocRow {
    id: i64,
    client_id: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct CodeRow {
    code: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

fn query_err(e: sea_orm::DbErr) -> StoreError {
    StoreError::Query(e.to_string())
}

fn build_sqlite_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Хранилище на SQLite (sea-orm, "сырые" SQL-запросы)
pub struct SqliteStore {
    conn: DatabaseConnection,
}

impl SqliteStore {
    /// Open (and create if needed) the database file, then bootstrap the schema
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Self::open_url(&build_sqlite_url(&absolute)).await
    }

    pub async fn open_url(url: &str) -> anyhow::Result<Self> {
        let mut options = ConnectOptions::new(url.to_string());
        options.sqlx_logging(false);
        // In-memory databases live per connection
        if url.contains(":memory:") {
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(24 * 60 * 60));
        }
        let conn = Database::connect(options).await?;
        let store = Self { conn };
        store.bootstrap_schema().await?;
        Ok(store)
    }

    async fn bootstrap_schema(&self) -> anyhow::Result<()> {
        for sql in SCHEMA {
            self.conn
                .execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
                .await?;
        }
        tracing::info!("SQLite schema ready");
        Ok(())
    }

    async fn fetch_all<T: FromQueryResult>(
        &self,
        sql: &str,
        values: Vec<Value>,
    ) -> StoreResult<Vec<T>> {
        let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values);
        T::find_by_statement(stmt)
            .all(&self.conn)
            .await
            .map_err(query_err)
    }

    pub async fn count_portal_users(&self) -> StoreResult<i64> {
        let rows: Vec<CountRow> = self
            .fetch_all("SELECT COUNT(*) AS total FROM db_login_portal", vec![])
            .await?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    pub async fn insert_portal_user(
        &self,
        email: &str,
        credential: &str,
        name: &str,
        role: Option<&str>,
    ) -> StoreResult<()> {
        self.execute(
            "INSERT INTO db_login_portal (email_vend, senha_vend, nome, funcao, status) \
             VALUES (?, ?, ?, ?, 'ativo')",
            vec![
                email.into(),
                credential.into(),
                name.into(),
                role.map(str::to_string).into(),
            ],
        )
        .await
    }

    pub async fn execute(&self, sql: &str, values: Vec<Value>) -> StoreResult<()> {
        self.conn
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                sql,
                values,
            ))
            .await
            .map_err(query_err)?;
        Ok(())
    }
}

/// `.single()` semantics: exactly one row or nothing
fn single<T>(mut rows: Vec<T>) -> Option<T> {
    if rows.len() == 1 {
        rows.pop()
    } else {
        None
    }
}

#[async_trait]
impl AnalyticsStore for SqliteStore {
    async fn sales_between(
        &self,
        seller_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<SalesRecord>> {
        let sql = r#"
            SELECT
                vend                     AS seller_id,
                CAST(ft_nfiscal AS TEXT) AS invoice_id,
                CAST(valor AS TEXT)      AS amount,
                date(emissao_nf)         AS issue_date
            FROM db_relatorio_vendas
            WHERE vend = ?
              AND date(emissao_nf) >= ?
              AND date(emissao_nf) <= ?
            ORDER BY id ASC
        "#;
        let rows: Vec<SalesRow> = self
            .fetch_all(
                sql,
                vec![
                    seller_id.into(),
                    from.format("%Y-%m-%d").to_string().into(),
                    to.format("%Y-%m-%d").to_string().into(),
                ],
            )
            .await?;

        rows.into_iter()
            .map(|r| {
                let raw = r.issue_date.unwrap_or_default();
                let issue_date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|e| StoreError::Decode(format!("emissao_nf '{}': {}", raw, e)))?;
                Ok(SalesRecord {
                    seller_id: r.seller_id,
                    invoice_id: r.invoice_id,
                    amount: r.amount,
                    issue_date,
                })
            })
            .collect()
    }

    async fn rfv_entries(&self, query: &RfvQuery) -> StoreResult<Vec<RfvEntry>> {
        let mut sql = format!("SELECT {} FROM db_rfv WHERE 1 = 1", RFV_COLUMNS);
        let mut params: Vec<Value> = Vec::new();

        if let Some(ref name) = query.seller_name {
            sql.push_str(" AND vendedor = ?");
            params.push(name.clone().into());
        }
        if let Some(ref status) = query.status {
            sql.push_str(" AND status = ?");
            params.push(status.clone().into());
        }
        if let Some(ref classification) = query.classification {
            sql.push_str(" AND classificacao = ?");
            params.push(classification.clone().into());
        }
        if let Some(value) = query.value {
            sql.push_str(" AND valor = ?");
            params.push(value.into());
        }
        sql.push_str(" ORDER BY id ASC");

        let rows: Vec<RfvRow> = self.fetch_all(&sql, params).await?;
        Ok(rows.into_iter().map(RfvEntry::from).collect())
    }

    async fn rfv_by_id(&self, id: i64) -> StoreResult<Option<RfvEntry>> {
        let sql = format!("SELECT {} FROM db_rfv WHERE id = ?", RFV_COLUMNS);
        let rows: Vec<RfvRow> = self.fetch_all(&sql, vec![id.into()]).await?;
        Ok(single(rows).map(RfvEntry::from))
    }

    async fn rfv_by_codes(&self, codes: &[String]) -> StoreResult<Vec<RfvEntry>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<&str> = codes.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT {} FROM db_rfv WHERE codigo IN ({}) ORDER BY id ASC",
            RFV_COLUMNS,
            placeholders.join(", ")
        );
        let params: Vec<Value> = codes.iter().map(|c| c.clone().into()).collect();
        let rows: Vec<RfvRow> = self.fetch_all(&sql, params).await?;
        Ok(rows.into_iter().map(RfvEntry::from).collect())
    }

    async fn rfv_codes(&self) -> StoreResult<Vec<String>> {
        let rows: Vec<CodeRow> = self
            .fetch_all("SELECT codigo AS code FROM db_rfv", vec![])
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.code)
            .filter(|c| !c.is_empty())
            .collect())
    }

    async fn geolocations(&self) -> StoreResult<Vec<ClientGeoloc>> {
        let sql = r#"
            SELECT
                id,
                id_cliente        AS client_id,
                CAST(lat AS TEXT) AS lat,
                CAST(lon AS TEXT) AS lon
            FROM db_cliente_geoloc
            WHERE lat IS NOT NULL AND lon IS NOT NULL
            ORDER BY id ASC
        "#;
        let rows: Vec<GeolocRow> = self.fetch_all(sql, vec![]).await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                let lat = r.lat?;
                let lon = r.lon?;
                ClientGeoloc::from_raw(r.id, r.client_id, &lat, &lon)
            })
            .collect())
    }

    async fn sellers(&self) -> StoreResult<Vec<Seller>> {
        let sql = format!("SELECT {} FROM db_vendedores ORDER BY nome ASC", SELLER_COLUMNS);
        let rows: Vec<SellerRow> = self.fetch_all(&sql, vec![]).await?;
        Ok(rows.into_iter().map(Seller::from).collect())
    }

    async fn seller_by_id(&self, id: &str) -> StoreResult<Option<Seller>> {
        let sql = format!(
            "SELECT {} FROM db_vendedores WHERE id_protheus = ?",
            SELLER_COLUMNS
        );
        let rows: Vec<SellerRow> = self.fetch_all(&sql, vec![id.into()]).await?;
        Ok(single(rows).map(Seller::from))
    }

    async fn portal_user_by_email(&self, email: &str) -> StoreResult<Option<PortalUser>> {
        let sql = format!(
            "SELECT {} FROM db_login_portal WHERE email_vend = ? LIMIT 2",
            PORTAL_USER_COLUMNS
        );
        let rows: Vec<PortalUserRow> = self.fetch_all(&sql, vec![email.into()]).await?;
        if rows.len() > 1 {
            tracing::warn!("Duplicate portal users for email {}", email);
        }
        Ok(single(rows).map(PortalUser::from))
    }

    async fn portal_user_by_id(&self, id: i64) -> StoreResult<Option<PortalUser>> {
        let sql = format!(
            "SELECT {} FROM db_login_portal WHERE id = ?",
            PORTAL_USER_COLUMNS
        );
        let rows: Vec<PortalUserRow> = self.fetch_all(&sql, vec![id.into()]).await?;
        Ok(single(rows).map(PortalUser::from))
    }
}
