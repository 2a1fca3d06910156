use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a001_sales_record::aggregate::SalesRecord;
use contracts::domain::a002_rfv_entry::aggregate::RfvEntry;
use contracts::domain::a003_seller::aggregate::Seller;
use contracts::domain::a004_client_geoloc::aggregate::ClientGeoloc;
use serde_json::{Map, Value};

use super::{AnalyticsStore, RfvQuery, StoreError, StoreResult};
use crate::shared::config::PostgrestConfig;
use crate::system::users::PortalUser;

type Row = Map<String, Value>;

/// HTTP-клиент для хостинга PostgREST (Supabase REST API)
pub struct PostgrestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn from_config(config: &PostgrestConfig) -> StoreResult<Self> {
        let base_url = config
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| StoreError::Config("SUPABASE_URL is required".into()))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| StoreError::Config("Supabase API key is required".into()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /rest/v1/{table}?{query}
    async fn select(&self, table: &str, query: &str) -> StoreResult<Vec<Row>> {
        let url = format!("{}/rest/v1/{}?{}", self.base_url, table, query);
        tracing::debug!("PostgREST GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreError::Http(format!("Request to {} failed: {}", table, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        if !status.is_success() {
            tracing::error!("PostgREST request failed ({}): {}", status, body);
            return Err(StoreError::Http(error_message(&body).unwrap_or_else(|| {
                format!("PostgREST request failed with status {}", status)
            })));
        }

        serde_json::from_str::<Vec<Row>>(&body).map_err(|e| {
            let preview: String = body.chars().take(300).collect();
            StoreError::Decode(format!("{}: {}", e, preview))
        })
    }
}

/// Поле `message` из тела ошибки PostgREST
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn enc(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn eq(column: &str, value: &str) -> String {
    format!("{}=eq.{}", column, enc(value))
}

/// `in.("a","b")` с экранированием кавычек
fn in_list(column: &str, values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("{}=in.({})", column, enc(&quoted.join(",")))
}

fn text(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn float(row: &Row, key: &str) -> Option<f64> {
    match row.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn int(row: &Row, key: &str) -> Option<i64> {
    match row.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn small_int(row: &Row, key: &str) -> Option<i32> {
    int(row, key).and_then(|v| i32::try_from(v).ok())
}

fn flag(row: &Row, key: &str) -> Option<bool> {
    match row.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "1" => Some(true),
            "false" | "f" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn rfv_from_row(row: &Row) -> RfvEntry {
    RfvEntry {
        id: int(row, "id").unwrap_or_default(),
        code: text(row, "codigo").unwrap_or_default(),
        company_name: text(row, "nome_empresa"),
        seller_name: text(row, "vendedor"),
        order_count: int(row, "qtd_pedido"),
        revenue_total: float(row, "fat_total"),
        average_ticket: float(row, "ticket_medio"),
        first_purchase: text(row, "pri_compra"),
        last_purchase: text(row, "ult_compra"),
        purchase_interval: float(row, "int_compra"),
        days_since_last_purchase: int(row, "dduc"),
        recency: small_int(row, "recencia"),
        frequency: small_int(row, "frequencia"),
        value: small_int(row, "valor"),
        average_rating: float(row, "media_nota"),
        status: text(row, "status"),
        action: text(row, "acao"),
        ranking: text(row, "ranking"),
        recency_frequency: small_int(row, "rec_freq"),
        attendant_id: int(row, "id_atendente"),
        document: text(row, "documento"),
        cs_active: flag(row, "cs_ativo"),
        classification: text(row, "classificacao"),
        description: text(row, "descricao"),
        business_type: text(row, "tp_comercio"),
    }
}

fn seller_from_row(row: &Row) -> Option<Seller> {
    Some(Seller {
        id: text(row, "id_protheus")?,
        name: text(row, "nome")?,
        phone: text(row, "telefone"),
        photo: text(row, "foto"),
        email: text(row, "email"),
        available: flag(row, "disponivel").unwrap_or(false),
    })
}

fn portal_user_from_row(row: &Row) -> Option<PortalUser> {
    Some(PortalUser {
        id: int(row, "id")?,
        email: text(row, "email_vend")?,
        credential: text(row, "senha_vend")?,
        name: text(row, "nome").unwrap_or_default(),
        role: text(row, "funcao"),
        status: text(row, "status"),
        photo: text(row, "foto_perfil"),
    })
}

/// Окно продаж по календарным датам: `from <= emissao_nf < to + 1 день`,
/// так что продажи последнего дня с временем тоже попадают в окно
fn sales_window_query(seller_id: &str, from: NaiveDate, to: NaiveDate) -> String {
    let upper = to.succ_opt().unwrap_or(to);
    format!(
        "select=vend,ft_nfiscal,valor,emissao_nf&{}&emissao_nf=gte.{}&emissao_nf=lt.{}",
        eq("vend", seller_id),
        from.format("%Y-%m-%d"),
        upper.format("%Y-%m-%d")
    )
}

/// Rows whose `emissao_nf` is not a date are skipped, not fatal
fn sales_from_rows(rows: &[Row], seller_id: &str) -> Vec<SalesRecord> {
    rows.iter()
        .filter_map(|row| {
            let raw = text(row, "emissao_nf").unwrap_or_default();
            let day: String = raw.chars().take(10).collect();
            let issue_date = match NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!(
                        "Skipping sales row of seller {} with emissao_nf '{}': {}",
                        seller_id,
                        raw,
                        e
                    );
                    return None;
                }
            };
            Some(SalesRecord {
                seller_id: text(row, "vend").unwrap_or_else(|| seller_id.to_string()),
                invoice_id: text(row, "ft_nfiscal"),
                amount: text(row, "valor"),
                issue_date,
            })
        })
        .collect()
}

fn single<T>(mut rows: Vec<T>) -> Option<T> {
    if rows.len() == 1 {
        rows.pop()
    } else {
        None
    }
}

#[async_trait]
impl AnalyticsStore for PostgrestStore {
    async fn sales_between(
        &self,
        seller_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<SalesRecord>> {
        let query = sales_window_query(seller_id, from, to);
        let rows = self.select("db_relatorio_vendas", &query).await?;
        Ok(sales_from_rows(&rows, seller_id))
    }

    async fn rfv_entries(&self, query: &RfvQuery) -> StoreResult<Vec<RfvEntry>> {
        let mut parts = vec!["select=*".to_string()];
        if let Some(ref name) = query.seller_name {
            parts.push(eq("vendedor", name));
        }
        if let Some(ref status) = query.status {
            parts.push(eq("status", status));
        }
        if let Some(ref classification) = query.classification {
            parts.push(eq("classificacao", classification));
        }
        if let Some(value) = query.value {
            parts.push(format!("valor=eq.{}", value));
        }
        parts.push("order=id.asc".to_string());

        let rows = self.select("db_rfv", &parts.join("&")).await?;
        Ok(rows.iter().map(rfv_from_row).collect())
    }

    async fn rfv_by_id(&self, id: i64) -> StoreResult<Option<RfvEntry>> {
        let rows = self
            .select("db_rfv", &format!("select=*&id=eq.{}", id))
            .await?;
        Ok(single(rows.iter().map(rfv_from_row).collect()))
    }

    async fn rfv_by_codes(&self, codes: &[String]) -> StoreResult<Vec<RfvEntry>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("select=*&{}&order=id.asc", in_list("codigo", codes));
        let rows = self.select("db_rfv", &query).await?;
        Ok(rows.iter().map(rfv_from_row).collect())
    }

    async fn rfv_codes(&self) -> StoreResult<Vec<String>> {
        let rows = self.select("db_rfv", "select=codigo").await?;
        Ok(rows
            .iter()
            .filter_map(|r| text(r, "codigo"))
            .filter(|c| !c.is_empty())
            .collect())
    }

    async fn geolocations(&self) -> StoreResult<Vec<ClientGeoloc>> {
        let rows = self
            .select(
                "db_cliente_geoloc",
                "select=id,id_cliente,lat,lon&lat=not.is.null&lon=not.is.null&order=id.asc",
            )
            .await?;
        Ok(rows
            .iter()
            .filter_map(|r| {
                ClientGeoloc::from_raw(
                    int(r, "id")?,
                    text(r, "id_cliente"),
                    &text(r, "lat")?,
                    &text(r, "lon")?,
                )
            })
            .collect())
    }

    async fn sellers(&self) -> StoreResult<Vec<Seller>> {
        let rows = self
            .select(
                "db_vendedores",
                "select=id_protheus,nome,telefone,foto,email,disponivel&order=nome.asc",
            )
            .await?;
        Ok(rows.iter().filter_map(seller_from_row).collect())
    }

    async fn seller_by_id(&self, id: &str) -> StoreResult<Option<Seller>> {
        let query = format!("select=*&{}", eq("id_protheus", id));
        let rows = self.select("db_vendedores", &query).await?;
        Ok(single(rows.iter().filter_map(seller_from_row).collect()))
    }

    async fn portal_user_by_email(&self, email: &str) -> StoreResult<Option<PortalUser>> {
        let query = format!("select=*&{}", eq("email_vend", email));
        let rows = self.select("db_login_portal", &query).await?;
        Ok(single(rows.iter().filter_map(portal_user_from_row).collect()))
    }

    async fn portal_user_by_id(&self, id: i64) -> StoreResult<Option<PortalUser>> {
        let rows = self
            .select("db_login_portal", &format!("select=*&id=eq.{}", id))
            .await?;
        Ok(single(rows.iter().filter_map(portal_user_from_row).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let mut config = PostgrestConfig::default();
        assert!(matches!(
            PostgrestStore::from_config(&config),
            Err(StoreError::Config(_))
        ));

        config.url = Some("https://x.supabase.co/".into());
        config.api_key = Some("key".into());
        let store = PostgrestStore::from_config(&config).unwrap();
        assert_eq!(store.base_url(), "https://x.supabase.co");
    }

    #[test]
    fn test_filters_are_url_encoded() {
        assert_eq!(eq("vendedor", "Ana Maria"), "vendedor=eq.Ana%20Maria");
        assert_eq!(
            in_list("codigo", &["A1".to_string(), "B,2".to_string()]),
            "codigo=in.(%22A1%22%2C%22B%2C2%22)"
        );
    }

    #[test]
    fn test_sales_window_keeps_whole_last_day() {
        let from = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 10, 31).unwrap();
        let query = sales_window_query("V1", from, to);
        assert_eq!(
            query,
            "select=vend,ft_nfiscal,valor,emissao_nf&vend=eq.V1\
             &emissao_nf=gte.2026-10-01&emissao_nf=lt.2026-11-01"
        );
        assert!(!query.contains("lte."));

        // December rolls into the next year
        let dec = sales_window_query(
            "V1",
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        );
        assert!(dec.ends_with("emissao_nf=lt.2026-01-01"));
    }

    #[test]
    fn test_sales_rows_with_bad_dates_are_skipped() {
        let rows = vec![
            row(json!({
                "vend": "V1",
                "ft_nfiscal": 10,
                "valor": "R$ 100,00",
                "emissao_nf": "2026-10-31T18:45:00"
            })),
            row(json!({"vend": "V1", "ft_nfiscal": "11", "valor": "5", "emissao_nf": "31/10/2026"})),
            row(json!({"vend": "V1", "ft_nfiscal": "12", "valor": "5", "emissao_nf": null})),
        ];
        let sales = sales_from_rows(&rows, "V1");
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].invoice_id.as_deref(), Some("10"));
        assert_eq!(
            sales[0].issue_date,
            NaiveDate::from_ymd_opt(2026, 10, 31).unwrap()
        );
    }

    #[test]
    fn test_error_message_is_extracted() {
        assert_eq!(
            error_message(r#"{"code":"42P01","message":"relation does not exist"}"#).as_deref(),
            Some("relation does not exist")
        );
        assert!(error_message("<html>").is_none());
    }

    #[test]
    fn test_rfv_row_accepts_numbers_and_strings() {
        let entry = rfv_from_row(&row(json!({
            "id": 7,
            "codigo": "C7",
            "fat_total": "1500.5",
            "recencia": 4,
            "frequencia": "2",
            "valor": null,
            "cs_ativo": true
        })));
        assert_eq!(entry.id, 7);
        assert_eq!(entry.revenue_total, Some(1500.5));
        assert_eq!(entry.recency, Some(4));
        assert_eq!(entry.frequency, Some(2));
        assert_eq!(entry.value, None);
        assert_eq!(entry.cs_active, Some(true));
    }

    #[test]
    fn test_seller_row_requires_id_and_name() {
        assert!(seller_from_row(&row(json!({"nome": "Ana"}))).is_none());
        let seller = seller_from_row(&row(json!({
            "id_protheus": "001",
            "nome": "Ana",
            "disponivel": 1
        })))
        .unwrap();
        assert!(seller.available);
    }
}
