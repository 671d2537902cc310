/* 📖 # What does hal_document provide?

A write-only builder for HAL documents: plain JSON objects with a reserved
`_links` map and an optional `_embedded` map of nested documents.

- link: `Link` and the relation-keyed `Collection`
- context: where the href of the automatic `self` link comes from
- document: `BaseDocument`, `Document` (adds `self`) and `Embedded`
- config: rendering options loaded from TOML

Serving the result over HTTP is left to the caller.
*/

pub mod config;
pub mod context;
pub mod document;
pub mod link;

pub use config::{HalConfig, load_config};
pub use context::{RequestContext, ResolvedContext};
pub use document::{BaseDocument, Document, Embedded, EmbeddedEntry, HalResource};
pub use link::{Collection, Link};
