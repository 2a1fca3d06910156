//! Терпимая десериализация полей запросов.
//!
//! Клиенты дашборда шлют флаги как `true`, `"true"` или `1`, а списки
//! иногда строкой. Такие поля не должны валить запрос целиком.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `true` только для `true` и `"true"`; всё остальное `false`
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.trim() == "true",
        _ => false,
    })
}

/// Массив строк; числа приводятся к строке, прочие элементы отбрасываются.
/// Не-массив даёт пустой список.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}
