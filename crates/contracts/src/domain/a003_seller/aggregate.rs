use serde::{Deserialize, Serialize};

/// Продавец из справочника
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// Идентификатор в ERP (Protheus)
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub email: Option<String>,
    pub available: bool,
}

/// Identity fields that travel with every metrics payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerIdentity {
    pub id: String,
    pub name: String,
    pub photo: Option<String>,
    pub available: bool,
}

impl From<&Seller> for SellerIdentity {
    fn from(s: &Seller) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            photo: s.photo.clone(),
            available: s.available,
        }
    }
}
