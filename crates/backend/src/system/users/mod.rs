pub mod service;

use contracts::system::auth::UserInfo;

/// Пользователь портала (таблица db_login_portal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalUser {
    pub id: i64,
    pub email: String,
    /// Argon2 PHC hash (или старый пароль открытым текстом)
    pub credential: String,
    pub name: String,
    pub role: Option<String>,
    pub status: Option<String>,
    pub photo: Option<String>,
}

impl PortalUser {
    /// Статус `inativo` без учёта регистра
    pub fn is_inactive(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("inativo"))
    }

    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.to_string(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            photo: self.photo.clone(),
        }
    }
}
