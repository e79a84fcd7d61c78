use sms_admin_shared::{ListQuery, TOKEN_STORAGE_KEY};

// =========================================================
// 客户端配置 (Client Configuration)
// =========================================================

/// 默认为空：浏览器内使用同源相对路径
const DEFAULT_BASE_URL: &str = "";

/// 客户端配置
///
/// 所有字段都有默认值，UI 层只需覆盖需要修改的部分。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// 后端根地址，如 `https://gateway.example.com`
    pub base_url: String,
    /// 存储 token 使用的键
    pub token_key: String,
    /// `fetch_sms_files` 未指定参数时的查询条件
    pub default_query: ListQuery,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_key: TOKEN_STORAGE_KEY.to_string(),
            default_query: ListQuery::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn with_default_query(mut self, query: ListQuery) -> Self {
        self.default_query = query;
        self
    }

    /// 拼接完整 URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_trimmed() {
        let cfg = ClientConfig::new("http://localhost:8000/");
        assert_eq!(cfg.url("/admin/login"), "http://localhost:8000/admin/login");
        assert_eq!(cfg.url("admin/login"), "http://localhost:8000/admin/login");
    }

    #[test]
    fn same_origin_by_default() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.url("/admin/login"), "/admin/login");
        assert_eq!(cfg.token_key, "sms_admin_token");
    }
}
