//! Контракты (DTO), общие для backend и любого клиента дашборда.
//!
//! Крейт не зависит от рантайма: только serde-типы и чистые функции.

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod system;
