/* 📖 # Why keep the relation outside the link object?

In HAL the relation is the key under `_links`, not a property of the link:

    "_links": { "next": { "href": "/orders?page=2" } }

A `Link` still carries its `rel` so a `Collection` can be a flat, ordered list.
Grouping by relation only happens when the collection is serialized, which
keeps `append` trivial and preserves the order in which links were added.
*/

use serde_json::{Map, Value};

use crate::context::RequestContext;

/// Reserved document key holding the links map.
pub const LINKS_KEY: &str = "_links";
/// Relation of the link pointing at the resource itself.
pub const SELF_REL: &str = "self";
/// Relation holding CURIE definitions. Always serialized as an array.
pub const CURIES_REL: &str = "curies";

/// A single hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    rel: String,
    href: String,
    templated: Option<bool>,
    media_type: Option<String>,
    deprecation: Option<String>,
    name: Option<String>,
    profile: Option<String>,
    title: Option<String>,
    hreflang: Option<String>,
}

impl Link {
    /// Create a link for `rel` pointing at `href`, with no optional attributes.
    ///
    /// # Examples
    /// ```
    /// use hal_document::Link;
    ///
    /// let link = Link::new("next", "/orders?page=2").with_title("Next page");
    /// assert_eq!(link.rel(), "next");
    /// assert_eq!(link.title(), Some("Next page"));
    /// ```
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            templated: None,
            media_type: None,
            deprecation: None,
            name: None,
            profile: None,
            title: None,
            hreflang: None,
        }
    }

    /// Create a link whose href is a URI template (`templated: true`).
    pub fn templated(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(rel, href).with_templated(true)
    }

    /// Create the `self` link. The href is taken from `context`.
    ///
    /// # Examples
    /// ```
    /// use hal_document::Link;
    ///
    /// let link = Link::self_link("/orders/123");
    /// assert_eq!(link.rel(), "self");
    /// assert_eq!(link.href(), "/orders/123");
    /// ```
    pub fn self_link<C: RequestContext + ?Sized>(context: &C) -> Self {
        Self::new(SELF_REL, context.current_url())
    }

    /// Create a CURIE definition. `href` must contain the `{rel}` placeholder.
    pub fn curie(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self::templated(CURIES_REL, href).with_name(name)
    }

    /// Mark whether the href is a URI template.
    pub fn with_templated(mut self, templated: bool) -> Self {
        self.templated = Some(templated);
        self
    }

    /// Set the media type hint, emitted as `type`.
    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Mark the link as deprecated; the value is a URL explaining the deprecation.
    pub fn with_deprecation(mut self, deprecation: impl Into<String>) -> Self {
        self.deprecation = Some(deprecation.into());
        self
    }

    /// Set the secondary key used to tell links of the same relation apart.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the profile URI describing the target resource.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the human-readable label.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the language of the target resource.
    pub fn with_hreflang(mut self, hreflang: impl Into<String>) -> Self {
        self.hreflang = Some(hreflang.into());
        self
    }

    pub fn rel(&self) -> &str {
        &self.rel
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn is_templated(&self) -> bool {
        self.templated.unwrap_or(false)
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The link object as it appears under its relation: `{"href": ..., ...}`.
    ///
    /// Attributes that were never set are omitted.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("href".to_string(), Value::String(self.href.clone()));
        if let Some(templated) = self.templated {
            object.insert("templated".to_string(), Value::Bool(templated));
        }
        let attributes = [
            ("type", &self.media_type),
            ("deprecation", &self.deprecation),
            ("name", &self.name),
            ("profile", &self.profile),
            ("title", &self.title),
            ("hreflang", &self.hreflang),
        ];
        for (key, value) in attributes {
            if let Some(value) = value {
                object.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        Value::Object(object)
    }

    /// The link keyed by its relation: `{rel: {"href": ..., ...}}`.
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert(self.rel.clone(), self.to_value());
        dict
    }
}

/// An ordered collection of links, grouped by relation on serialization.
///
/// Appending never replaces an existing link for the same relation; a
/// relation with several links serializes as an array in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    links: Vec<Link>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Add a link after all existing ones.
    pub fn append(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Builder-style [`Collection::append`].
    pub fn with(mut self, link: Link) -> Self {
        self.append(link);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// All links for `rel`, in append order.
    pub fn get<'a>(&'a self, rel: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |link| link.rel == rel)
    }

    /// The `_links` part of a document: `{"_links": {rel: representation, ...}}`.
    ///
    /// Relations appear in the order they were first appended. A relation
    /// with a single link maps to the link object, otherwise to an array.
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut by_rel = Map::new();
        for link in &self.links {
            let value = link.to_value();
            match by_rel.get_mut(&link.rel) {
                Some(Value::Array(existing)) => existing.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    let value = if link.rel == CURIES_REL {
                        Value::Array(vec![value])
                    } else {
                        value
                    };
                    by_rel.insert(link.rel.clone(), value);
                }
            }
        }

        let mut dict = Map::new();
        dict.insert(LINKS_KEY.to_string(), Value::Object(by_rel));
        dict
    }
}

impl From<Vec<Link>> for Collection {
    fn from(links: Vec<Link>) -> Self {
        Self { links }
    }
}

impl FromIterator<Link> for Collection {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl Extend<Link> for Collection {
    fn extend<I: IntoIterator<Item = Link>>(&mut self, iter: I) {
        self.links.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
