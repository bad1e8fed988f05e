use super::{AccountEdit, NewAccount, NewPage, PublishError};
use crate::models::ContentNode;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// A page path as issued by the API: a slugged title followed by the
/// publication month and day, and an optional counter for duplicates
/// (`Sample-Page-12-15`, `Sample-Page-12-15-2`).
pub static PAGE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/?#\s]+-\d{2}-\d{2}(?:-\d+)?$").unwrap());

pub const MAX_PAGE_LIST_LIMIT: u32 = 200;

/// A publishing account.  `access_token` and `auth_url` are only returned
/// by account creation and token revocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    pub short_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u64>,
}

/// A published page.  `content` is only present when it was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    pub path: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentNode>>,
    #[serde(default)]
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
}

/// Pages of one account, most recently created first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageList {
    pub total_count: u64,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageViews {
    pub views: u64,
}

/// The `{ok, result, error}` wrapper every API method answers with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, turning `ok: false` (or a missing result) into
    /// [`PublishError::UpstreamRejection`] carrying the API's error text.
    pub fn into_result(self) -> Result<T, PublishError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (_, _) => Err(PublishError::UpstreamRejection(
                self.error.unwrap_or_else(|| "no result in response".to_string()),
            )),
        }
    }
}

/// Account fields `getAccountInfo` can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    ShortName,
    AuthorName,
    AuthorUrl,
    AuthUrl,
    PageCount,
}

impl AccountField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountField::ShortName => "short_name",
            AccountField::AuthorName => "author_name",
            AccountField::AuthorUrl => "author_url",
            AccountField::AuthUrl => "auth_url",
            AccountField::PageCount => "page_count",
        }
    }
}

/// Time bucket for `getViews`.  Each finer field needs the coarser ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewsPeriod {
    pub year: Option<u16>,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
}

impl ViewsPeriod {
    fn validate(&self) -> Result<(), PublishError> {
        let needs = |present: bool, coarser: bool, field: &str, parent: &str| {
            if present && !coarser {
                Err(PublishError::InvalidArgument(format!(
                    "{field} requires {parent}"
                )))
            } else {
                Ok(())
            }
        };
        needs(self.month.is_some(), self.year.is_some(), "month", "year")?;
        needs(self.day.is_some(), self.month.is_some(), "day", "month")?;
        needs(self.hour.is_some(), self.day.is_some(), "hour", "day")?;
        if self.month.is_some_and(|m| !(1..=12).contains(&m)) {
            return Err(PublishError::InvalidArgument("month out of range".to_string()));
        }
        if self.day.is_some_and(|d| !(1..=31).contains(&d)) {
            return Err(PublishError::InvalidArgument("day out of range".to_string()));
        }
        if self.hour.is_some_and(|h| h > 24) {
            return Err(PublishError::InvalidArgument("hour out of range".to_string()));
        }
        Ok(())
    }
}

/// Where the API and the upload endpoint live.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base of every method URL.  Must end with `/`.
    pub base_url: String,
    /// Multipart image upload endpoint.
    pub upload_url: String,
    /// Site root that relative upload paths resolve against.
    pub site_url: String,
}

impl Default for ApiConfig {
    fn default() -> ApiConfig {
        ApiConfig {
            base_url: String::from("https://api.telegra.ph/"),
            upload_url: String::from("https://telegra.ph/upload"),
            site_url: String::from("https://telegra.ph"),
        }
    }
}

impl ApiConfig {
    fn method_url(&self, method: &str, params: &[(&str, String)]) -> Result<Url, PublishError> {
        let base = Url::parse(&self.base_url)?;
        let mut url = base.join(method)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(url)
    }

    pub fn create_account_url(&self, account: &NewAccount) -> Result<Url, PublishError> {
        account.validate()?;
        self.method_url("createAccount", &account_params(account))
    }

    /// Only the fields set on `edit` are sent.
    pub fn edit_account_info_url(
        &self,
        access_token: &str,
        edit: &AccountEdit,
    ) -> Result<Url, PublishError> {
        edit.validate()?;
        let mut params = vec![("access_token", access_token.to_string())];
        let fields = [
            ("short_name", &edit.short_name),
            ("author_name", &edit.author_name),
            ("author_url", &edit.author_url),
        ];
        params.extend(
            fields
                .into_iter()
                .filter_map(|(name, value)| value.clone().map(|value| (name, value))),
        );
        self.method_url("editAccountInfo", &params)
    }

    pub fn get_account_info_url(
        &self,
        access_token: &str,
        fields: &[AccountField],
    ) -> Result<Url, PublishError> {
        let mut params = vec![("access_token", access_token.to_string())];
        if !fields.is_empty() {
            let names = fields.iter().map(|f| f.as_str()).collect::<Vec<_>>();
            params.push(("fields", serde_json::to_string(&names)?));
        }
        self.method_url("getAccountInfo", &params)
    }

    pub fn revoke_access_token_url(&self, access_token: &str) -> Result<Url, PublishError> {
        self.method_url(
            "revokeAccessToken",
            &[("access_token", access_token.to_string())],
        )
    }

    /// `createPage` URL with the content list serialised as JSON.  The page
    /// is validated first, so an over-long title or oversized content never
    /// leaves the process.
    pub fn create_page_url(&self, access_token: &str, page: &NewPage) -> Result<Url, PublishError> {
        page.validate()?;
        let mut params = vec![("access_token", access_token.to_string())];
        params.extend(page_params(page)?);
        self.method_url("createPage", &params)
    }

    pub fn edit_page_url(
        &self,
        access_token: &str,
        path: &str,
        page: &NewPage,
    ) -> Result<Url, PublishError> {
        page.validate()?;
        let path = checked_path(path)?;
        let mut params = vec![("access_token", access_token.to_string())];
        params.extend(page_params(page)?);
        self.method_url(&format!("editPage/{path}"), &params)
    }

    pub fn get_page_url(&self, path: &str, return_content: bool) -> Result<Url, PublishError> {
        let path = checked_path(path)?;
        let mut params = vec![];
        if return_content {
            params.push(("return_content", "true".to_string()));
        }
        self.method_url(&format!("getPage/{path}"), &params)
    }

    pub fn get_page_list_url(
        &self,
        access_token: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Url, PublishError> {
        if limit == 0 || limit > MAX_PAGE_LIST_LIMIT {
            return Err(PublishError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_PAGE_LIST_LIMIT}"
            )));
        }
        self.method_url(
            "getPageList",
            &[
                ("access_token", access_token.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    pub fn get_views_url(&self, path: &str, period: &ViewsPeriod) -> Result<Url, PublishError> {
        let path = checked_path(path)?;
        period.validate()?;
        let mut params = vec![];
        if let Some(year) = period.year {
            params.push(("year", year.to_string()));
        }
        if let Some(month) = period.month {
            params.push(("month", month.to_string()));
        }
        if let Some(day) = period.day {
            params.push(("day", day.to_string()));
        }
        if let Some(hour) = period.hour {
            params.push(("hour", hour.to_string()));
        }
        self.method_url(&format!("getViews/{path}"), &params)
    }

    /// Read the upload endpoint's answer and return the absolute URL of the
    /// first uploaded file.
    ///
    /// Success looks like `[{"src": "/file/abc.png"}]`; failure like
    /// `{"error": "File type invalid"}`.
    pub fn parse_upload_response(&self, body: &str) -> Result<String, PublishError> {
        #[derive(Deserialize)]
        struct Uploaded {
            src: String,
        }
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum UploadResponse {
            Files(Vec<Uploaded>),
            Failed { error: String },
        }

        match serde_json::from_str::<UploadResponse>(body)? {
            UploadResponse::Failed { error } => Err(PublishError::UpstreamRejection(error)),
            UploadResponse::Files(files) => {
                let file = files.into_iter().next().ok_or_else(|| {
                    PublishError::UpstreamRejection("upload returned no files".to_string())
                })?;
                Ok(Url::parse(&self.site_url)?.join(&file.src)?.to_string())
            }
        }
    }
}

fn account_params(account: &NewAccount) -> Vec<(&'static str, String)> {
    let mut params = vec![("short_name", account.short_name.clone())];
    if let Some(author_name) = account.author_name.as_ref().filter(|s| !s.is_empty()) {
        params.push(("author_name", author_name.clone()));
    }
    if let Some(author_url) = account.author_url.as_ref().filter(|s| !s.is_empty()) {
        params.push(("author_url", author_url.clone()));
    }
    params
}

fn page_params(page: &NewPage) -> Result<Vec<(&'static str, String)>, PublishError> {
    let mut params = vec![
        ("title", page.title.clone()),
        ("content", serde_json::to_string(&page.content)?),
    ];
    if let Some(author_name) = page.author_name.as_ref().filter(|s| !s.is_empty()) {
        params.push(("author_name", author_name.clone()));
    }
    if let Some(author_url) = page.author_url.as_ref().filter(|s| !s.is_empty()) {
        params.push(("author_url", author_url.clone()));
    }
    if page.return_content {
        params.push(("return_content", "true".to_string()));
    }
    Ok(params)
}

fn checked_path(url_or_path: &str) -> Result<String, PublishError> {
    page_path(url_or_path)
        .ok_or_else(|| PublishError::InvalidArgument(format!("not a page path: {url_or_path}")))
}

/// Extract the page path from a full page URL or a bare path.
///
/// # Examples
///
/// ```rust
/// use telegraph_content::publish::page_path;
///
/// assert_eq!(
///     page_path("https://telegra.ph/Sample-Page-12-15").as_deref(),
///     Some("Sample-Page-12-15")
/// );
/// assert_eq!(page_path("Sample-Page-12-15-3").as_deref(), Some("Sample-Page-12-15-3"));
/// assert_eq!(page_path("https://telegra.ph/"), None);
/// ```
pub fn page_path(url_or_path: &str) -> Option<String> {
    let candidate = match Url::parse(url_or_path) {
        Ok(url) => url.path().trim_matches('/').to_string(),
        Err(_) => url_or_path.trim_matches('/').to_string(),
    };
    PAGE_PATH.is_match(&candidate).then_some(candidate)
}
