//! 会话模块
//!
//! 持有管理员 token 的唯一入口。token 只存一份，缺失即视为未登录。

use crate::storage::KeyValueStore;
use tracing::info;

pub struct Session<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(&self.key)
    }

    /// 覆盖写入，不校验 token 格式；返回是否持久化成功
    pub fn set_token(&self, token: &str) -> bool {
        self.store.set(&self.key, token)
    }

    /// 幂等：没有 token 时为空操作
    pub fn clear_token(&self) {
        self.store.remove(&self.key);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn logout(&self) {
        info!("admin session cleared");
        self.clear_token();
    }

    /// `Authorization` 头的值；未登录时返回 None
    pub fn bearer(&self) -> Option<String> {
        self.token()
            .map(|t| format!("{}{}", sms_admin_shared::BEARER_PREFIX, t))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use sms_admin_shared::TOKEN_STORAGE_KEY;

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new(), TOKEN_STORAGE_KEY)
    }

    #[test]
    fn set_then_get() {
        let s = session();
        for token in ["abc", "", "eyJhbGciOiJIUzI1NiJ9.e30.sig", "with space"] {
            s.set_token(token);
            assert_eq!(s.token().as_deref(), Some(token));
        }
    }

    #[test]
    fn clear_is_idempotent() {
        let s = session();
        s.clear_token();
        assert_eq!(s.token(), None);

        s.set_token("abc");
        s.clear_token();
        s.clear_token();
        assert_eq!(s.token(), None);
        assert!(!s.is_authenticated());
    }

    #[test]
    fn uses_fixed_key() {
        let s = session();
        s.set_token("abc");
        assert_eq!(s.store().get("sms_admin_token").as_deref(), Some("abc"));
        assert_eq!(s.bearer().as_deref(), Some("Bearer abc"));
    }
}
