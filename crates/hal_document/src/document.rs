/* 📖 # Why split BaseDocument and Document?

Both hold the same three parts: the resource's own data, a links collection and
named embedded resources. They differ in one rule. A top-level `Document` must
link to itself, so building one appends a `self` link taken from the request
context. Nested resources do not need an address of their own and stay plain
`BaseDocument`s (aliased as `Embedded`).

The `self` link is only ever appended. A caller-supplied `self` link is kept,
and the two serialize as an array in the order caller, then synthesized.
*/

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use hal_base::{HalResult, ResultExt};

use crate::context::RequestContext;
use crate::link::{Collection, Link};

/// Reserved document key holding embedded resources.
pub const EMBEDDED_KEY: &str = "_embedded";

/// Anything that can be flattened into a HAL JSON object.
///
/// Implemented by [`BaseDocument`] and [`Document`]; implement it on your own
/// types to embed them directly.
pub trait HalResource: fmt::Debug + Send + Sync {
    /// The document as a JSON object.
    fn to_dict(&self) -> Map<String, Value>;

    /// The document encoded as compact JSON text.
    fn to_json(&self) -> HalResult<String> {
        serde_json::to_string(&self.to_dict()).context("Failed to encode HAL document")
    }

    /// The document encoded as indented JSON text.
    fn to_json_pretty(&self) -> HalResult<String> {
        serde_json::to_string_pretty(&self.to_dict()).context("Failed to encode HAL document")
    }
}

/// A resource placed under `_embedded`: a single document or an array of them.
#[derive(Debug)]
pub enum EmbeddedEntry {
    One(Box<dyn HalResource>),
    Many(Vec<Box<dyn HalResource>>),
}

impl EmbeddedEntry {
    /// Wrap any resource as a single embedded entry.
    pub fn one(resource: impl HalResource + 'static) -> Self {
        Self::One(Box::new(resource))
    }

    /// Wrap a list of resources as an embedded array.
    pub fn many<R: HalResource + 'static>(resources: impl IntoIterator<Item = R>) -> Self {
        Self::Many(
            resources
                .into_iter()
                .map(|r| Box::new(r) as Box<dyn HalResource>)
                .collect(),
        )
    }

    /// Number of documents in this entry.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(resources) => resources.len(),
        }
    }

    /// True for an empty `Many`; such an entry serializes as `[]`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entry as it appears under `_embedded`: an object or an array of objects.
    pub fn to_value(&self) -> Value {
        match self {
            Self::One(resource) => Value::Object(resource.to_dict()),
            Self::Many(resources) => Value::Array(
                resources
                    .iter()
                    .map(|r| Value::Object(r.to_dict()))
                    .collect(),
            ),
        }
    }
}

impl From<BaseDocument> for EmbeddedEntry {
    fn from(document: BaseDocument) -> Self {
        Self::one(document)
    }
}

impl From<Document> for EmbeddedEntry {
    fn from(document: Document) -> Self {
        Self::one(document)
    }
}

impl From<Vec<BaseDocument>> for EmbeddedEntry {
    fn from(documents: Vec<BaseDocument>) -> Self {
        Self::many(documents)
    }
}

impl From<Vec<Document>> for EmbeddedEntry {
    fn from(documents: Vec<Document>) -> Self {
        Self::many(documents)
    }
}

/// Data, links and embedded resources of a HAL document, without a `self` link.
///
/// # Examples
/// ```
/// use hal_document::{BaseDocument, Collection, HalResource, Link};
/// use serde_json::json;
///
/// let document = BaseDocument::new()
///     .with_data(json!({"total": 2}))
///     .with_links(Collection::new().with(Link::new("next", "/orders?page=2")));
///
/// assert_eq!(
///     document.to_json().unwrap(),
///     r#"{"total":2,"_links":{"next":{"href":"/orders?page=2"}}}"#
/// );
/// ```
#[derive(Debug, Default)]
pub struct BaseDocument {
    data: Option<Value>,
    links: Collection,
    embedded: BTreeMap<String, EmbeddedEntry>,
}

/// A nested resource. It never receives an automatic `self` link.
pub type Embedded = BaseDocument;

impl BaseDocument {
    /// Create an empty document: no data, no links, nothing embedded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource's own fields. Only a JSON object contributes to the
    /// output; any other value is kept but ignored when serializing.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the resource's own fields from any serializable value.
    ///
    /// Fails if the value has no JSON representation, e.g. a map with
    /// non-string keys.
    pub fn with_serialized_data<T: Serialize + ?Sized>(self, data: &T) -> HalResult<Self> {
        let data = serde_json::to_value(data).context("Failed to convert document data to JSON")?;
        Ok(self.with_data(data))
    }

    /// Replace the links collection.
    pub fn with_links(mut self, links: Collection) -> Self {
        self.links = links;
        self
    }

    /// Append a single link.
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.append(link);
        self
    }

    /// Embed `entry` under `name`, replacing any entry already there.
    pub fn with_embedded(
        mut self,
        name: impl Into<String>,
        entry: impl Into<EmbeddedEntry>,
    ) -> Self {
        self.embedded.insert(name.into(), entry.into());
        self
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn links(&self) -> &Collection {
        &self.links
    }

    /// Mutable access for appending links after construction.
    pub fn links_mut(&mut self) -> &mut Collection {
        &mut self.links
    }

    pub fn set_links(&mut self, links: Collection) {
        self.links = links;
    }

    pub fn embedded(&self) -> &BTreeMap<String, EmbeddedEntry> {
        &self.embedded
    }
}

impl HalResource for BaseDocument {
    /// Flatten into a single JSON object.
    ///
    /// Object data is copied first, so the reserved `_links` and `_embedded`
    /// keys override user keys with the same name. Reserved keys are only
    /// added when there is at least one link or embedded entry.
    fn to_dict(&self) -> Map<String, Value> {
        let mut document = Map::new();

        match &self.data {
            Some(Value::Object(fields)) => document.extend(fields.clone()),
            Some(other) => debug!(kind = json_kind(other), "ignoring non-object document data"),
            None => {}
        }

        if !self.links.is_empty() {
            document.extend(self.links.to_dict());
        }

        if !self.embedded.is_empty() {
            let embedded: Map<String, Value> = self
                .embedded
                .iter()
                .map(|(name, entry)| (name.clone(), entry.to_value()))
                .collect();
            document.insert(EMBEDDED_KEY.to_string(), Value::Object(embedded));
        }

        document
    }
}

/// A top-level HAL document. Always carries a `self` link.
///
/// # Examples
/// ```
/// use hal_document::{BaseDocument, Document, HalResource};
/// use serde_json::json;
///
/// let document = Document::new(
///     BaseDocument::new().with_data(json!({"name": "Alice"})),
///     "/users/alice",
/// );
///
/// assert_eq!(
///     serde_json::Value::Object(document.to_dict()),
///     json!({"name": "Alice", "_links": {"self": {"href": "/users/alice"}}})
/// );
/// ```
#[derive(Debug)]
pub struct Document {
    base: BaseDocument,
}

impl Document {
    /// Turn `base` into a top-level document by appending a `self` link whose
    /// href comes from `context`. Links already in `base` keep their order.
    #[instrument(level = "trace", skip_all, fields(link_count = base.links().len()))]
    pub fn new<C: RequestContext + ?Sized>(mut base: BaseDocument, context: &C) -> Self {
        let self_link = Link::self_link(context);
        trace!(href = self_link.href(), "appending self link");
        base.links.append(self_link);
        Self { base }
    }

    /// A document with nothing but its `self` link.
    pub fn empty<C: RequestContext + ?Sized>(context: &C) -> Self {
        Self::new(BaseDocument::new(), context)
    }

    pub fn data(&self) -> Option<&Value> {
        self.base.data()
    }

    pub fn links(&self) -> &Collection {
        self.base.links()
    }

    pub fn links_mut(&mut self) -> &mut Collection {
        self.base.links_mut()
    }

    pub fn embedded(&self) -> &BTreeMap<String, EmbeddedEntry> {
        self.base.embedded()
    }

    /// Give back the underlying parts, including the synthesized `self` link.
    pub fn into_base(self) -> BaseDocument {
        self.base
    }
}

impl HalResource for Document {
    fn to_dict(&self) -> Map<String, Value> {
        self.base.to_dict()
    }
}

/* 📖 # Why implement Serialize by hand?
Web frameworks take `impl Serialize` for JSON responses. Emitting the flattened
map lets a document be handed over directly, and guarantees the wire form is
byte-for-byte what `to_json` produces.
*/

impl Serialize for BaseDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_dict(self.to_dict(), serializer)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_dict(self.to_dict(), serializer)
    }
}

fn serialize_dict<S: Serializer>(dict: Map<String, Value>, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(dict.len()))?;
    for (key, value) in &dict {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{LINKS_KEY, SELF_REL};
    use expect_test::expect;
    use hal_base::ErrorKind;
    use serde_json::json;
    use std::collections::HashMap;

    const SELF_URL: &str = "https://api.example.com/orders/123";

    fn dict_value(resource: &dyn HalResource) -> Value {
        Value::Object(resource.to_dict())
    }

    #[test]
    fn test_empty_base_document_has_no_reserved_keys() {
        let document = BaseDocument::new();
        assert!(document.to_dict().is_empty());
        assert_eq!(document.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_empty_document_has_single_self_link() {
        let document = Document::empty(SELF_URL);
        let dict = document.to_dict();

        assert_eq!(dict.len(), 1);
        assert_eq!(dict[LINKS_KEY][SELF_REL], json!({"href": SELF_URL}));
        assert!(!dict.contains_key(EMBEDDED_KEY));
    }

    #[test]
    fn test_document_with_data() {
        let document = Document::new(BaseDocument::new().with_data(json!({"name": "Alice"})), SELF_URL);
        assert_eq!(
            dict_value(&document),
            json!({"name": "Alice", "_links": {"self": {"href": SELF_URL}}})
        );
    }

    #[test]
    fn test_data_entries_are_preserved() {
        let data = json!({"id": 123, "status": "shipped", "tags": ["a", "b"], "total": 9.5});
        let document = Document::new(BaseDocument::new().with_data(data.clone()), SELF_URL);
        let dict = document.to_dict();

        for (key, value) in data.as_object().unwrap() {
            assert_eq!(dict.get(key), Some(value), "missing key {key}");
        }
    }

    #[test]
    fn test_non_object_data_is_ignored() {
        for data in [json!(null), json!([1, 2, 3]), json!("text"), json!(42)] {
            let document = BaseDocument::new().with_data(data.clone());
            assert_eq!(document.data(), Some(&data));
            assert!(document.to_dict().is_empty());
        }
    }

    #[test]
    fn test_reserved_keys_override_data() {
        let document = BaseDocument::new()
            .with_data(json!({"_links": "user value", "_embedded": 1, "name": "kept"}))
            .with_link(Link::new("next", "/next"))
            .with_embedded("item", BaseDocument::new().with_data(json!({"id": 1})));

        assert_eq!(
            dict_value(&document),
            json!({
                "name": "kept",
                "_links": {"next": {"href": "/next"}},
                "_embedded": {"item": {"id": 1}}
            })
        );
    }

    #[test]
    fn test_colliding_data_keys_kept_without_links_or_embedded() {
        let document = BaseDocument::new().with_data(json!({"_links": "user value"}));
        assert_eq!(dict_value(&document), json!({"_links": "user value"}));
    }

    #[test]
    fn test_embedded_document() {
        let document = Document::new(
            BaseDocument::new().with_embedded("author", Embedded::new().with_data(json!({"name": "Bob"}))),
            SELF_URL,
        );
        let dict = document.to_dict();
        assert_eq!(dict[EMBEDDED_KEY]["author"], json!({"name": "Bob"}));
    }

    #[test]
    fn test_embedded_collection_serializes_as_array() {
        let items = vec![
            Embedded::new()
                .with_data(json!({"id": 1}))
                .with_link(Link::new(SELF_REL, "/orders/1")),
            Embedded::new()
                .with_data(json!({"id": 2}))
                .with_link(Link::new(SELF_REL, "/orders/2")),
        ];
        let document = Document::new(
            BaseDocument::new()
                .with_data(json!({"count": 2}))
                .with_embedded("orders", items),
            "/orders",
        );

        expect![[r#"
            {
              "count": 2,
              "_links": {
                "self": {
                  "href": "/orders"
                }
              },
              "_embedded": {
                "orders": [
                  {
                    "id": 1,
                    "_links": {
                      "self": {
                        "href": "/orders/1"
                      }
                    }
                  },
                  {
                    "id": 2,
                    "_links": {
                      "self": {
                        "href": "/orders/2"
                      }
                    }
                  }
                ]
              }
            }"#]]
        .assert_eq(&document.to_json_pretty().unwrap());
    }

    #[test]
    fn test_nested_embedded_documents() {
        let address = Embedded::new().with_data(json!({"city": "Berlin"}));
        let customer = Embedded::new()
            .with_data(json!({"name": "Carol"}))
            .with_embedded("address", address);
        let document = Document::new(BaseDocument::new().with_embedded("customer", customer), "/orders/9");

        assert_eq!(
            document.to_dict()[EMBEDDED_KEY]["customer"][EMBEDDED_KEY]["address"],
            json!({"city": "Berlin"})
        );
    }

    #[test]
    fn test_embedded_document_has_no_self_link() {
        let embedded = Embedded::new().with_data(json!({"name": "Bob"}));
        assert!(embedded.links().is_empty());
        assert!(!embedded.to_dict().contains_key(LINKS_KEY));
    }

    #[test]
    fn test_embedding_top_level_document_keeps_its_self_link() {
        let author = Document::new(BaseDocument::new().with_data(json!({"name": "Bob"})), "/users/bob");
        let document = Document::new(BaseDocument::new().with_embedded("author", author), "/posts/1");
        assert_eq!(
            document.to_dict()[EMBEDDED_KEY]["author"],
            json!({"name": "Bob", "_links": {"self": {"href": "/users/bob"}}})
        );
    }

    #[test]
    fn test_caller_self_link_coexists_with_synthesized() {
        let links = Collection::new()
            .with(Link::new(SELF_REL, "/caller/self"))
            .with(Link::new("up", "/orders"));
        let document = Document::new(BaseDocument::new().with_links(links), SELF_URL);

        let self_hrefs: Vec<&str> = document.links().get(SELF_REL).map(Link::href).collect();
        assert_eq!(self_hrefs, ["/caller/self", SELF_URL]);

        expect![[r#"{"_links":{"self":[{"href":"/caller/self"},{"href":"https://api.example.com/orders/123"}],"up":{"href":"/orders"}}}"#]]
            .assert_eq(&document.to_json().unwrap());
    }

    #[test]
    fn test_self_link_appended_after_caller_links() {
        let document = Document::new(
            BaseDocument::new().with_link(Link::new("next", "/2")).with_link(Link::new("prev", "/0")),
            "/1",
        );
        let rels: Vec<&str> = document.links().iter().map(Link::rel).collect();
        assert_eq!(rels, ["next", "prev", SELF_REL]);
    }

    #[test]
    fn test_links_can_be_appended_after_construction() {
        let mut document = Document::empty("/orders/1");
        document.links_mut().append(Link::new("cancel", "/orders/1/cancel"));

        let dict = document.to_dict();
        assert_eq!(dict[LINKS_KEY]["cancel"], json!({"href": "/orders/1/cancel"}));
        assert_eq!(document.links().len(), 2);
    }

    #[test]
    fn test_set_links_on_base_document() {
        let mut document = BaseDocument::new().with_link(Link::new("old", "/old"));
        document.set_links(Collection::new().with(Link::new("new", "/new")));
        assert_eq!(dict_value(&document), json!({"_links": {"new": {"href": "/new"}}}));
    }

    #[test]
    fn test_json_round_trip() {
        let document = Document::new(
            BaseDocument::new()
                .with_data(json!({"name": "Alice", "age": 30, "active": true, "nested": {"a": [1, null]}}))
                .with_link(Link::templated("search", "/users{?q}"))
                .with_embedded("friend", Embedded::new().with_data(json!({"name": "Bob"}))),
            "/users/alice",
        );

        let parsed: Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();
        assert_eq!(parsed, dict_value(&document));
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let document = Document::new(BaseDocument::new().with_data(json!({"name": "Alice"})), "/users/alice");
        assert_eq!(serde_json::to_string(&document).unwrap(), document.to_json().unwrap());
    }

    #[test]
    fn test_with_serialized_data_from_struct() {
        #[derive(Serialize)]
        struct Order {
            id: u32,
            status: &'static str,
        }

        let document = BaseDocument::new()
            .with_serialized_data(&Order { id: 7, status: "open" })
            .unwrap();
        assert_eq!(dict_value(&document), json!({"id": 7, "status": "open"}));
    }

    #[test]
    fn test_with_serialized_data_rejects_non_string_keys() {
        let mut data = HashMap::new();
        data.insert(vec![1u8, 2], "binary key");

        let error = BaseDocument::new().with_serialized_data(&data).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Encoding { .. }));
        assert_eq!(error.get_context(), ["Failed to convert document data to JSON"]);
    }

    #[derive(Debug)]
    struct Author {
        name: String,
    }

    impl HalResource for Author {
        fn to_dict(&self) -> Map<String, Value> {
            let mut dict = Map::new();
            dict.insert("name".to_string(), Value::String(self.name.clone()));
            dict
        }
    }

    #[test]
    fn test_custom_resource_can_be_embedded() {
        let document = BaseDocument::new().with_embedded(
            "author",
            EmbeddedEntry::one(Author {
                name: "Dana".to_string(),
            }),
        );
        assert_eq!(dict_value(&document), json!({"_embedded": {"author": {"name": "Dana"}}}));
    }

    #[test]
    fn test_empty_embedded_collection_still_emits_key() {
        let document = BaseDocument::new().with_embedded("orders", Vec::<Embedded>::new());
        assert!(document.embedded()["orders"].is_empty());
        assert_eq!(dict_value(&document), json!({"_embedded": {"orders": []}}));
    }

    #[test]
    fn test_into_base_keeps_self_link() {
        let base = Document::empty("/me").into_base();
        assert_eq!(base.links().get(SELF_REL).count(), 1);
    }

    #[test]
    fn test_documents_are_shareable_across_threads() {
        let document = std::sync::Arc::new(Document::empty("/shared"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let document = document.clone();
                std::thread::spawn(move || document.to_json().unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), r#"{"_links":{"self":{"href":"/shared"}}}"#);
        }
    }
}
