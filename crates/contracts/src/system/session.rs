//! Клиентская сессия: токен хранится не в глобальном состоянии,
//! а в явном контексте с подставляемым хранилищем.

use std::cell::RefCell;

use super::auth::{SessionResponse, SignInResponse, UserInfo};

/// Capability for persisting the bearer token (browser storage, keychain, memory...)
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn store(&self, token: Option<&str>);
}

/// Хранилище в памяти (тесты, CLI-клиенты)
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn store(&self, token: Option<&str>) {
        *self.token.borrow_mut() = token.map(str::to_string);
    }
}

/// Session state handed to the presentation layer
pub struct SessionContext<S: TokenStore> {
    store: S,
    user: Option<UserInfo>,
}

impl<S: TokenStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        Self { store, user: None }
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.store.load().is_some()
    }

    /// Значение заголовка `Authorization`, если токен сохранён
    pub fn authorization_header(&self) -> Option<String> {
        self.store.load().map(|t| format!("Bearer {}", t))
    }

    pub fn apply_sign_in(&mut self, response: SignInResponse) {
        self.store.store(Some(&response.session.access_token));
        self.user = Some(response.user);
    }

    /// Result of a session check; a `null` user drops the stored token
    pub fn apply_session(&mut self, response: SessionResponse) {
        if response.user.is_none() {
            self.store.store(None);
        }
        self.user = response.user;
    }

    pub fn sign_out(&mut self) {
        self.store.store(None);
        self.user = None;
    }
}
