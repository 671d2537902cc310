/* 📖 # Why describe documents in TOML?

The manifest lets a HAL document be written down without code: rendering
options under `[render]`, the resource under `[document]`. It mirrors the
builder API one to one (data, links, embedded) so the CLI is a thin driver
over hal_document and doubles as a way to try the library out.
*/

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::de::{self, Deserializer};
use serde_json::Value;
use tracing::info;

use hal_base::{ErrorKind, HalResult, ResultExt, bail, err};
use hal_document::link::SELF_REL;
use hal_document::{BaseDocument, Document, EmbeddedEntry, HalConfig, Link};

/// Contents of a `hal.toml` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub render: HalConfig,
    pub document: ResourceSpec,
}

/// A resource: the top-level document or one of its embedded resources.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    /// Required for the top-level document. On embedded resources it adds a
    /// plain `self` link, used as given.
    #[serde(default)]
    pub self_href: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub embedded: BTreeMap<String, EmbeddedSpec>,
}

/// A single table embeds one resource, an array of tables embeds a list.
#[derive(Debug)]
pub enum EmbeddedSpec {
    One(ResourceSpec),
    Many(Vec<ResourceSpec>),
}

/* 📖 # Why deserialize EmbeddedSpec by hand?
serde's derived struct visitor also accepts sequences, so with an untagged enum
`items = []` would become an empty single resource and `items = ["x"]` a
positional struct. Dispatching on the TOML value type keeps tables and arrays of
tables apart and rejects anything else.
*/

impl<'de> Deserialize<'de> for EmbeddedSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match toml::Value::deserialize(deserializer)? {
            toml::Value::Table(table) => resource_from_table::<D::Error>(table).map(Self::One),
            toml::Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    toml::Value::Table(table) => resource_from_table::<D::Error>(table),
                    other => Err(<D::Error as de::Error>::custom(format!(
                        "embedded array element {} must be a table, found {}",
                        index,
                        other.type_str()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Many),
            other => Err(<D::Error as de::Error>::custom(format!(
                "embedded resource must be a table or an array of tables, found {}",
                other.type_str()
            ))),
        }
    }
}

fn resource_from_table<E: de::Error>(table: toml::Table) -> Result<ResourceSpec, E> {
    ResourceSpec::deserialize(toml::Value::Table(table)).map_err(E::custom)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    pub rel: String,
    pub href: String,
    #[serde(default)]
    pub templated: Option<bool>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub deprecation: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hreflang: Option<String>,
}

impl LinkSpec {
    fn to_link(&self) -> HalResult<Link> {
        if self.rel.is_empty() {
            bail!("Link to '{}' has an empty rel", self.href);
        }
        let mut link = Link::new(&self.rel, &self.href);
        if let Some(templated) = self.templated {
            link = link.with_templated(templated);
        }
        if let Some(media_type) = &self.media_type {
            link = link.with_type(media_type);
        }
        if let Some(deprecation) = &self.deprecation {
            link = link.with_deprecation(deprecation);
        }
        if let Some(name) = &self.name {
            link = link.with_name(name);
        }
        if let Some(profile) = &self.profile {
            link = link.with_profile(profile);
        }
        if let Some(title) = &self.title {
            link = link.with_title(title);
        }
        if let Some(hreflang) = &self.hreflang {
            link = link.with_hreflang(hreflang);
        }
        Ok(link)
    }
}

impl ResourceSpec {
    /// Build the document parts. `self_href` is not applied here.
    fn to_base(&self) -> HalResult<BaseDocument> {
        let mut base = BaseDocument::new();
        if let Some(data) = &self.data {
            base = base.with_data(data.clone());
        }
        for link in &self.links {
            base.links_mut().append(link.to_link()?);
        }
        for (name, spec) in &self.embedded {
            let entry = spec
                .to_entry()
                .with_context(|| format!("Failed to build embedded resource '{}'", name))?;
            base = base.with_embedded(name, entry);
        }
        Ok(base)
    }

    fn to_embedded(&self) -> HalResult<BaseDocument> {
        let mut base = self.to_base()?;
        if let Some(href) = &self.self_href {
            base.links_mut().append(Link::new(SELF_REL, href));
        }
        Ok(base)
    }
}

impl EmbeddedSpec {
    fn to_entry(&self) -> HalResult<EmbeddedEntry> {
        match self {
            Self::One(spec) => Ok(spec.to_embedded()?.into()),
            Self::Many(specs) => {
                let documents = specs
                    .iter()
                    .map(ResourceSpec::to_embedded)
                    .collect::<HalResult<Vec<_>>>()?;
                Ok(documents.into())
            }
        }
    }
}

impl Manifest {
    /// Parse a manifest from TOML text.
    pub fn parse(text: &str) -> HalResult<Self> {
        toml::from_str(text).map_err(|e| err!("Invalid manifest: {}", e))
    }

    /// Build the top-level document, resolving its self href through the
    /// render configuration.
    pub fn build(&self) -> HalResult<Document> {
        let Some(self_href) = &self.document.self_href else {
            bail!("[document] is missing 'self_href'");
        };
        let context = self.render.context(self_href)?;
        let base = self.document.to_base()?;
        Ok(Document::new(base, &context))
    }

    /// Build and render the document.
    pub fn render(&self) -> HalResult<String> {
        let document = self.build()?;
        self.render.render(&document)
    }
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> HalResult<Manifest> {
    info!(path = %path.display(), "loading manifest");
    let text = std::fs::read_to_string(path).map_err(|source| ErrorKind::FileError {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::parse(&text).with_context(|| format!("Failed to load {}", path.display()))
}
