/* 📖 # Why is the self href supplied through a trait?

A top-level document always links to itself, but only the web layer knows the
URL of the request being answered. `RequestContext` is the seam: a framework
adapter implements it on its request type, tests pass a plain string, and the
document code never has to know where the URL came from.
*/

use std::fmt;

use hal_base::{ErrorKind, HalResult};
use url::Url;

/// Source of the URL of the resource currently being rendered.
pub trait RequestContext: fmt::Debug {
    /// The href used for the automatic `self` link.
    fn current_url(&self) -> String;
}

impl RequestContext for str {
    fn current_url(&self) -> String {
        self.to_string()
    }
}

impl RequestContext for String {
    fn current_url(&self) -> String {
        self.clone()
    }
}

impl RequestContext for Url {
    fn current_url(&self) -> String {
        self.to_string()
    }
}

impl<C: RequestContext + ?Sized> RequestContext for &C {
    fn current_url(&self) -> String {
        (**self).current_url()
    }
}

impl<C: RequestContext + ?Sized> RequestContext for Box<C> {
    fn current_url(&self) -> String {
        (**self).current_url()
    }
}

/// A request path resolved against a base URL.
///
/// # Examples
/// ```
/// use hal_document::{RequestContext, ResolvedContext};
///
/// let context = ResolvedContext::new("https://api.example.com/v1/", "orders/7").unwrap();
/// assert_eq!(context.current_url(), "https://api.example.com/v1/orders/7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    url: Url,
}

impl ResolvedContext {
    /// Join `path` onto `base_url` following RFC 3986 reference resolution.
    pub fn new(base_url: &str, path: &str) -> HalResult<Self> {
        let base = parse_url(base_url)?;
        let url = base.join(path).map_err(|source| ErrorKind::InvalidUrl {
            url: path.to_string(),
            source,
        })?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RequestContext for ResolvedContext {
    fn current_url(&self) -> String {
        self.url.to_string()
    }
}

fn parse_url(url: &str) -> HalResult<Url> {
    Url::parse(url).map_err(|source| {
        ErrorKind::InvalidUrl {
            url: url.to_string(),
            source,
        }
        .into()
    })
}
