//! The publishing side of the content tree: request types with the API's
//! field limits, URL construction for each API method, and the publish /
//! provision policy that sits in front of an HTTP transport.
//!
//! No HTTP client lives here.  Integrators implement [`PublishingApi`] over
//! whatever transport they use (see [`ApiConfig`] for the URLs) and
//! [`CredentialStore`] over their user table.

mod api;

pub use api::{
    Account, AccountField, ApiConfig, ApiResponse, MAX_PAGE_LIST_LIMIT, PAGE_PATH, Page,
    PageList, PageViews, ViewsPeriod, page_path,
};

use crate::models::ContentNode;
use thiserror::Error;

pub const MAX_SHORT_NAME_CHARS: usize = 32;
pub const MAX_TITLE_CHARS: usize = 256;
pub const MAX_AUTHOR_NAME_CHARS: usize = 128;
pub const MAX_AUTHOR_URL_CHARS: usize = 512;
/// Upper bound on the serialised `content` field.
pub const MAX_CONTENT_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("content and title cannot be empty")]
    EmptyInput,
    #[error("no publishing credential stored for this user")]
    MissingCredential,
    #[error("publishing service rejected the request: {0}")]
    UpstreamRejection(String),
    #[error("{field} is longer than {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("content is {size} bytes, the limit is {max}")]
    ContentTooLarge { size: usize, max: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("json error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), PublishError> {
    if value.chars().count() > max {
        return Err(PublishError::FieldTooLong { field, max });
    }
    Ok(())
}

fn check_optional_len(
    field: &'static str,
    value: &Option<String>,
    max: usize,
) -> Result<(), PublishError> {
    match value {
        Some(value) => check_len(field, value, max),
        None => Ok(()),
    }
}

/// Parameters for creating an account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewAccount {
    pub short_name: String,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
}

impl NewAccount {
    pub fn new(short_name: impl Into<String>) -> NewAccount {
        NewAccount {
            short_name: short_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), PublishError> {
        if self.short_name.is_empty() {
            return Err(PublishError::EmptyInput);
        }
        check_len("short_name", &self.short_name, MAX_SHORT_NAME_CHARS)?;
        check_optional_len("author_name", &self.author_name, MAX_AUTHOR_NAME_CHARS)?;
        check_optional_len("author_url", &self.author_url, MAX_AUTHOR_URL_CHARS)
    }
}

/// Changes to an existing account.  Only the fields that are `Some` are
/// sent; the rest keep their current value.  An empty `author_name` or
/// `author_url` clears that field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountEdit {
    pub short_name: Option<String>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
}

impl AccountEdit {
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.short_name.is_none() && self.author_name.is_none() && self.author_url.is_none() {
            return Err(PublishError::InvalidArgument(
                "an account edit must change at least one field".to_string(),
            ));
        }
        if self.short_name.as_deref() == Some("") {
            return Err(PublishError::EmptyInput);
        }
        check_optional_len("short_name", &self.short_name, MAX_SHORT_NAME_CHARS)?;
        check_optional_len("author_name", &self.author_name, MAX_AUTHOR_NAME_CHARS)?;
        check_optional_len("author_url", &self.author_url, MAX_AUTHOR_URL_CHARS)
    }
}

/// A page about to be created or edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewPage {
    pub title: String,
    /// Encoded content, typically [`crate::Codec::encode_children`] of the
    /// editor's root.
    pub content: Vec<ContentNode>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    /// Ask the API to echo the content back in the returned [`Page`].
    pub return_content: bool,
}

impl NewPage {
    pub fn new(title: impl Into<String>, content: Vec<ContentNode>) -> NewPage {
        NewPage {
            title: title.into(),
            content,
            ..Default::default()
        }
    }

    /// Check the API's limits locally.  Tags are not checked; the service
    /// decides which tags it renders.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.title.is_empty() || self.content.is_empty() {
            return Err(PublishError::EmptyInput);
        }
        check_len("title", &self.title, MAX_TITLE_CHARS)?;
        check_optional_len("author_name", &self.author_name, MAX_AUTHOR_NAME_CHARS)?;
        check_optional_len("author_url", &self.author_url, MAX_AUTHOR_URL_CHARS)?;
        let size = serde_json::to_vec(&self.content)?.len();
        if size > MAX_CONTENT_BYTES {
            return Err(PublishError::ContentTooLarge {
                size,
                max: MAX_CONTENT_BYTES,
            });
        }
        Ok(())
    }
}

/// Maps an application user to the publishing credential issued for them.
pub trait CredentialStore {
    fn token_for(&self, user_id: &str) -> Option<String>;
    fn save_token(&mut self, user_id: &str, token: String);
}

/// The two API calls the publish flow needs.  Implementations report any
/// non-success answer as [`PublishError::UpstreamRejection`].
pub trait PublishingApi {
    fn create_account(&self, account: &NewAccount) -> Result<Account, PublishError>;
    fn create_page(&self, access_token: &str, page: &NewPage) -> Result<Page, PublishError>;
}

/// Publish `content` under `title` for `user_id`.
///
/// Empty input is refused before the credential lookup, and a missing
/// credential is refused before any API call.  Upstream failures are
/// returned as they come; nothing is retried.
pub fn publish_article<S, A>(
    store: &S,
    api: &A,
    user_id: &str,
    title: &str,
    content: Vec<ContentNode>,
    author_name: Option<String>,
) -> Result<Page, PublishError>
where
    S: CredentialStore + ?Sized,
    A: PublishingApi + ?Sized,
{
    if title.is_empty() || content.is_empty() {
        return Err(PublishError::EmptyInput);
    }
    let token = store
        .token_for(user_id)
        .ok_or(PublishError::MissingCredential)?;
    let page = NewPage {
        author_name,
        ..NewPage::new(title, content)
    };
    page.validate()?;
    api.create_page(&token, &page)
}

/// Create a publishing account named `short_name` and store its token for
/// `user_id`.  Returns the account as the API reported it.
pub fn provision_account<S, A>(
    store: &mut S,
    api: &A,
    user_id: &str,
    short_name: &str,
) -> Result<Account, PublishError>
where
    S: CredentialStore + ?Sized,
    A: PublishingApi + ?Sized,
{
    let request = NewAccount::new(short_name);
    request.validate()?;
    let account = api.create_account(&request)?;
    let token = account.access_token.clone().ok_or_else(|| {
        PublishError::UpstreamRejection("account created without an access token".to_string())
    })?;
    store.save_token(user_id, token);
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementNode;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        tokens: HashMap<String, String>,
    }

    impl CredentialStore for MemoryStore {
        fn token_for(&self, user_id: &str) -> Option<String> {
            self.tokens.get(user_id).cloned()
        }
        fn save_token(&mut self, user_id: &str, token: String) {
            self.tokens.insert(user_id.to_string(), token);
        }
    }

    #[derive(Default)]
    struct FakeApi {
        reject_with: Option<String>,
        calls: RefCell<Vec<String>>,
        issue_token: bool,
    }

    impl PublishingApi for FakeApi {
        fn create_account(&self, account: &NewAccount) -> Result<Account, PublishError> {
            self.calls
                .borrow_mut()
                .push(format!("createAccount {}", account.short_name));
            Ok(Account {
                short_name: account.short_name.clone(),
                access_token: self.issue_token.then(|| "fresh-token".to_string()),
                ..Default::default()
            })
        }

        fn create_page(&self, access_token: &str, page: &NewPage) -> Result<Page, PublishError> {
            self.calls
                .borrow_mut()
                .push(format!("createPage {access_token} {}", page.title));
            if let Some(reason) = &self.reject_with {
                return Err(PublishError::UpstreamRejection(reason.clone()));
            }
            Ok(Page {
                path: "Title-10-19".to_string(),
                url: "https://telegra.ph/Title-10-19".to_string(),
                title: page.title.clone(),
                author_name: page.author_name.clone(),
                ..Default::default()
            })
        }
    }

    fn content() -> Vec<ContentNode> {
        vec![ElementNode::new("p").with_child("Body").into()]
    }

    fn store_with_token() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.save_token("42", "secret".to_string());
        store
    }

    #[test]
    fn publish_sends_stored_token() {
        let api = FakeApi::default();
        let page = publish_article(
            &store_with_token(),
            &api,
            "42",
            "Title",
            content(),
            Some("Ann".to_string()),
        )
        .unwrap();
        assert_eq!(page.title, "Title");
        assert_eq!(page.author_name.as_deref(), Some("Ann"));
        assert_eq!(*api.calls.borrow(), vec!["createPage secret Title".to_string()]);
    }

    #[test]
    fn publish_refuses_empty_input_before_lookup() {
        let api = FakeApi::default();
        let empty_store = MemoryStore::default();
        assert!(matches!(
            publish_article(&empty_store, &api, "42", "", content(), None),
            Err(PublishError::EmptyInput)
        ));
        assert!(matches!(
            publish_article(&empty_store, &api, "42", "Title", vec![], None),
            Err(PublishError::EmptyInput)
        ));
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn publish_refuses_missing_credential() {
        let api = FakeApi::default();
        let result = publish_article(&MemoryStore::default(), &api, "7", "Title", content(), None);
        assert!(matches!(result, Err(PublishError::MissingCredential)));
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn publish_propagates_upstream_rejection_once() {
        let api = FakeApi {
            reject_with: Some("PAGE_SAVE_FAILED".to_string()),
            ..Default::default()
        };
        let err = publish_article(&store_with_token(), &api, "42", "Title", content(), None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "publishing service rejected the request: PAGE_SAVE_FAILED"
        );
        assert_eq!(api.calls.borrow().len(), 1);
    }

    #[test]
    fn publish_refuses_oversized_content_locally() {
        let api = FakeApi::default();
        let big = vec![ContentNode::from("x".repeat(MAX_CONTENT_BYTES))];
        let result = publish_article(&store_with_token(), &api, "42", "Title", big, None);
        assert!(matches!(result, Err(PublishError::ContentTooLarge { .. })));
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn title_limit_counts_chars() {
        let at_limit = NewPage::new("é".repeat(MAX_TITLE_CHARS), content());
        assert!(at_limit.validate().is_ok());
        let over = NewPage::new("é".repeat(MAX_TITLE_CHARS + 1), content());
        assert!(matches!(
            over.validate(),
            Err(PublishError::FieldTooLong { field: "title", .. })
        ));
    }

    #[test]
    fn account_validation() {
        assert!(matches!(NewAccount::new("").validate(), Err(PublishError::EmptyInput)));
        assert!(NewAccount::new("Sandbox").validate().is_ok());
        let long = NewAccount::new("x".repeat(MAX_SHORT_NAME_CHARS + 1));
        assert!(matches!(
            long.validate(),
            Err(PublishError::FieldTooLong { field: "short_name", max: 32 })
        ));
        let long_url = NewAccount {
            author_url: Some("u".repeat(MAX_AUTHOR_URL_CHARS + 1)),
            ..NewAccount::new("Sandbox")
        };
        assert!(long_url.validate().is_err());
    }

    #[test]
    fn provision_stores_issued_token() {
        let api = FakeApi {
            issue_token: true,
            ..Default::default()
        };
        let mut store = MemoryStore::default();
        let account = provision_account(&mut store, &api, "42", "Ann").unwrap();
        assert_eq!(account.short_name, "Ann");
        assert_eq!(store.token_for("42").as_deref(), Some("fresh-token"));
    }

    #[test]
    fn provision_without_token_is_rejected() {
        let api = FakeApi::default();
        let mut store = MemoryStore::default();
        let result = provision_account(&mut store, &api, "42", "Ann");
        assert!(matches!(result, Err(PublishError::UpstreamRejection(_))));
        assert_eq!(store.token_for("42"), None);
    }
}
