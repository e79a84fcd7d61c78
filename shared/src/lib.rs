use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod date;
pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 浏览器 localStorage 中保存管理员 token 的键
pub const TOKEN_STORAGE_KEY: &str = "sms_admin_token";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 50;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// smsd 的 spool 目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Folder {
    Checked,
    Failed,
    Incoming,
    Outgoing,
    Sent,
}

impl Folder {
    pub const ALL: [Folder; 5] = [
        Folder::Checked,
        Folder::Failed,
        Folder::Incoming,
        Folder::Outgoing,
        Folder::Sent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Checked => "checked",
            Folder::Failed => "failed",
            Folder::Incoming => "incoming",
            Folder::Outgoing => "outgoing",
            Folder::Sent => "sent",
        }
    }
}

impl AsRef<str> for Folder {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知目录名
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown folder: {0}")]
pub struct UnknownFolder(pub String);

impl FromStr for Folder {
    type Err = UnknownFolder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Folder::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFolder(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Modified,
    Name,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Modified => "modified",
            SortBy::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// 文件列表查询参数
///
/// 排序、过滤、分页全部交给服务端处理，客户端只负责拼接 query string。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// 空字符串表示不过滤
    #[serde(default)]
    pub search: String,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            search: String::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListQuery {
    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// 按请求顺序输出 query 参数；`search` 为空时整个参数省略
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("sort_by", self.sort_by.as_str().to_string()),
            ("sort_order", self.sort_order.as_str().to_string()),
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs
    }
}

/// 列表中的单个文件元数据
///
/// 除 `filename` 外的字段都可能缺失；服务端新增的字段保留在 `extra` 中，
/// 重新序列化后与服务端返回的 JSON 一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsFileEntry {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Unix 纪元秒
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_iso: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SmsFileEntry {
    pub fn modified_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        modified_at(self.modified_iso.as_deref(), self.modified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsFileListing {
    #[serde(default)]
    pub files: Vec<SmsFileEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    // 旧版服务端不返回分页字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// 单个 SMS 文件的完整内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsFile {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SmsFile {
    pub fn modified_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        modified_at(self.modified_iso.as_deref(), self.modified)
    }
}

/// 优先使用 ISO 字符串，其次是纪元秒
fn modified_at(iso: Option<&str>, secs: Option<f64>) -> Option<chrono::DateTime<chrono::Utc>> {
    iso.and_then(date::parse_iso)
        .or_else(|| secs.and_then(date::from_epoch_secs))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// 服务端错误体，形如 `{"detail": "INVALID_ADMIN_KEY"}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// 发送测试短信的结果
///
/// 服务端字段并不固定，未知字段保留在 `extra` 中。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SendTestSmsResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_omits_empty_search() {
        let pairs = ListQuery::default().to_pairs();
        assert!(pairs.iter().all(|(k, _)| *k != "search"));
        assert_eq!(
            pairs,
            vec![
                ("sort_by", "modified".to_string()),
                ("sort_order", "desc".to_string()),
                ("page", "1".to_string()),
                ("per_page", "50".to_string()),
            ]
        );
    }

    #[test]
    fn query_keeps_search_last() {
        let pairs = ListQuery::default()
            .sort_by(SortBy::Name)
            .sort_order(SortOrder::Asc)
            .search("foo")
            .page(3)
            .per_page(10)
            .to_pairs();
        assert_eq!(pairs.last(), Some(&("search", "foo".to_string())));
        assert_eq!(pairs[0].1, "name");
        assert_eq!(pairs[1].1, "asc");
        assert_eq!(pairs[2].1, "3");
        assert_eq!(pairs[3].1, "10");
    }

    #[test]
    fn folder_parse() {
        assert_eq!("sent".parse::<Folder>(), Ok(Folder::Sent));
        assert!("inbox".parse::<Folder>().is_err());
        for f in Folder::ALL {
            assert_eq!(f.as_str().parse::<Folder>(), Ok(f));
        }
    }

    #[test]
    fn listing_without_pagination_fields() {
        let listing: SmsFileListing =
            serde_json::from_str(r#"{"files": [], "total": 0}"#).unwrap();
        assert!(listing.files.is_empty());
        assert_eq!(listing.page, None);
    }

    #[test]
    fn entry_tolerates_missing_and_extra_fields() {
        let raw = serde_json::json!({"filename": "sms_1.sms", "modified": 1.5, "sender": "0901"});
        let entry: SmsFileEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.size, None);
        assert_eq!(entry.extra.get("sender"), Some(&serde_json::json!("0901")));
        assert_eq!(entry.modified_at().unwrap().timestamp_millis(), 1500);
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn unknown_folder_message() {
        let err = "inbox".parse::<Folder>().unwrap_err();
        assert_eq!(err.to_string(), "unknown folder: inbox");
    }

    #[test]
    fn send_result_keeps_unknown_fields() {
        let res: SendTestSmsResult =
            serde_json::from_str(r#"{"status": "OK", "file": "sms_1.sms", "queued": true}"#)
                .unwrap();
        assert_eq!(res.status.as_deref(), Some("OK"));
        assert_eq!(res.extra.get("queued"), Some(&serde_json::Value::Bool(true)));
    }
}
