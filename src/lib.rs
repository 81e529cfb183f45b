//! docmodel - documentation tag extraction engine
//!
//! docmodel turns an ordered stream of classified doc-comment fragments
//! (tag name + raw text, grouped into blocks by an external scanner) into a
//! hierarchical, serializable API model: namespaces containing types
//! (class/mixin/struct) containing members (method/property/event/...).
//!
//! ## Module Structure
//!
//! - `builder`: the classification engine (block state machine and cursor)
//! - `catalog`: default JSDoc-style tag vocabulary
//! - `diagnostic`: non-fatal diagnostics (unknown tags)
//! - `events`: the scanner event contract
//! - `model`: the entity graph (namespaces, types, members) and serialization
//! - `registry`: tag classifier sets, handlers, and aliases
//!
//! ## Usage
//!
//! ```
//! use docmodel::{Builder, ScanEvent, catalog};
//!
//! let mut builder = Builder::new(catalog::default_registry());
//! builder
//!     .consume(vec![
//!         ScanEvent::begin("A reusable widget. Renders things."),
//!         ScanEvent::tag("class", "ui.Widget"),
//!         ScanEvent::end("widget.js", 3),
//!     ])
//!     .unwrap();
//!
//! let tree = builder.to_serializable();
//! assert_eq!(tree["namespaces"][0]["types"][0]["name"], "Widget");
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;
pub mod events;
pub mod model;
pub mod registry;

pub use builder::{BuildError, Builder, Context, Target, TargetMut};
pub use diagnostic::Diagnostic;
pub use events::{ScanEvent, SourceInfo, Tag};
pub use model::{ApiModel, Member, MemberId, Namespace, NamespaceId, Source, Type, TypeId};
pub use registry::{RegistryError, TagHandler, TagRegistry};
