//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 实现 `KeyValueStore`。

use crate::storage::KeyValueStore;
use tracing::warn;

/// 浏览器 LocalStorage
///
/// 无状态，每次调用时重新获取 `window.localStorage`。
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStorage {
    /// 键不存在或发生错误时返回 `None`
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 写入失败（如隐私模式、配额满）时返回 false
    fn set(&self, key: &str, value: &str) -> bool {
        let ok = Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some();
        if !ok {
            warn!(key, "localStorage.setItem failed");
        }
        ok
    }

    fn remove(&self, key: &str) {
        let ok = Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some();
        if !ok {
            warn!(key, "localStorage.removeItem failed");
        }
    }
}
