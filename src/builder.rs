//! Classification engine: turns scanner events into the entity model.
//!
//! The [`Builder`] is a small state machine: `BeginBlock` starts accumulating
//! tags, `EndBlock` classifies the accumulated block against the registry and
//! replays its remaining tags as attribute writes on the current target.
//! Cursor state (current namespace, type, member, target) survives across
//! blocks and across files, so one builder run produces the union of every
//! file the scanner walked.

use serde_json::Value;
use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::events::{ScanEvent, SourceInfo, Tag};
use crate::model::{ApiModel, Member, MemberId, Namespace, NamespaceId, Source, Type, TypeId};
use crate::registry::{RegistryError, TagRegistry};

/// Build failure. Document content never produces one of these; only
/// integrator configuration errors (broken alias bindings) do.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Which entity is currently receiving tag-handler writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    None,
    Namespace(NamespaceId),
    Type(TypeId),
    Member(MemberId),
}

/// Mutable view of the current target, handed to tag handlers.
pub enum TargetMut<'a> {
    Namespace(&'a mut Namespace),
    Type(&'a mut Type),
    Member(&'a mut Member),
}

impl TargetMut<'_> {
    pub fn data(&self) -> &serde_json::Map<String, Value> {
        match self {
            TargetMut::Namespace(ns) => &ns.data,
            TargetMut::Type(ty) => &ty.data,
            TargetMut::Member(member) => &member.data,
        }
    }

    pub fn data_mut(&mut self) -> &mut serde_json::Map<String, Value> {
        match self {
            TargetMut::Namespace(ns) => &mut ns.data,
            TargetMut::Type(ty) => &mut ty.data,
            TargetMut::Member(member) => &mut member.data,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            TargetMut::Namespace(ns) => ns.summary.as_deref(),
            TargetMut::Type(ty) => ty.summary.as_deref(),
            TargetMut::Member(member) => member.summary.as_deref(),
        }
    }

    pub fn set_summary(&mut self, summary: String) {
        match self {
            TargetMut::Namespace(ns) => ns.summary = Some(summary),
            TargetMut::Type(ty) => ty.summary = Some(summary),
            TargetMut::Member(member) => member.summary = Some(summary),
        }
    }

    /// Stamp the source location. Namespaces carry no source in the output
    /// schema, so a namespace target ignores the write.
    pub fn set_source(&mut self, source: Source) {
        match self {
            TargetMut::Namespace(_) => {}
            TargetMut::Type(ty) => ty.source = Some(source),
            TargetMut::Member(member) => member.source = Some(source),
        }
    }
}

/// Build context shared with tag handlers: the entity model plus the cursor.
pub struct Context {
    pub model: ApiModel,
    current_namespace: NamespaceId,
    current_type: Option<TypeId>,
    current_member: Option<MemberId>,
    target: Target,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        let model = ApiModel::new();
        let root = model.root();
        Self {
            model,
            current_namespace: root,
            current_type: None,
            current_member: None,
            target: Target::None,
        }
    }

    pub fn current_namespace(&self) -> NamespaceId {
        self.current_namespace
    }

    pub fn current_type(&self) -> Option<TypeId> {
        self.current_type
    }

    pub fn current_member(&self) -> Option<MemberId> {
        self.current_member
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Make `ns` the active namespace and the write target (used by the
    /// `namespace` tag so desc/summary land on the namespace itself).
    pub fn enter_namespace(&mut self, ns: NamespaceId) {
        self.current_namespace = ns;
        self.target = Target::Namespace(ns);
    }

    /// Make a freshly attached type the active type and write target. Also
    /// moves the namespace cursor to the type's owner and forgets the member
    /// cursor from any earlier type.
    pub fn enter_type(&mut self, ty: TypeId) {
        self.current_namespace = ty.0;
        self.current_type = Some(ty);
        self.current_member = None;
        self.target = Target::Type(ty);
    }

    /// Make a freshly attached member the active member and write target.
    pub fn enter_member(&mut self, member: MemberId) {
        self.current_type = Some(member.0);
        self.current_member = Some(member);
        self.target = Target::Member(member);
    }

    /// Resolve the target handle into a mutable borrow, if any.
    pub fn target_mut(&mut self) -> Option<TargetMut<'_>> {
        match self.target {
            Target::None => None,
            Target::Namespace(id) => Some(TargetMut::Namespace(self.model.namespace_mut(id))),
            Target::Type(id) => Some(TargetMut::Type(self.model.type_mut(id))),
            Target::Member(id) => Some(TargetMut::Member(self.model.member_mut(id))),
        }
    }
}

enum BlockState {
    Idle,
    Accumulating(Vec<Tag>),
}

/// One-pass classification engine over scanner events.
pub struct Builder {
    registry: TagRegistry,
    context: Context,
    state: BlockState,
    diagnostics: Vec<Diagnostic>,
}

impl Builder {
    /// Create a builder over a fully configured registry. Registration after
    /// this point is impossible by construction — the registry is consumed.
    pub fn new(registry: TagRegistry) -> Self {
        Self {
            registry,
            context: Context::new(),
            state: BlockState::Idle,
            diagnostics: Vec::new(),
        }
    }

    /// A documentation-comment region opened; the leading free text becomes an
    /// implicit `desc` tag at position 0 of the block.
    pub fn on_begin(&mut self, leading_text: &str) {
        self.state = BlockState::Accumulating(vec![Tag::new("desc", leading_text)]);
    }

    /// A tag arrived inside the current region. Tags outside a region are
    /// dropped (scanner misuse degrades by omission, never panics).
    pub fn on_tag(&mut self, name: &str, text: &str) {
        if let BlockState::Accumulating(block) = &mut self.state {
            block.push(Tag::new(name, text));
        }
    }

    /// The region closed: classify the block and apply its tags.
    pub fn on_end(&mut self, source: &SourceInfo) -> Result<(), BuildError> {
        let BlockState::Accumulating(block) = std::mem::replace(&mut self.state, BlockState::Idle)
        else {
            return Ok(());
        };

        let mut classified = false;

        // A classifying handler always enters a fresh entity, so the block
        // counts as classified only when a handler actually moved the target.
        // A handler that declines (a member tag with no current type) leaves
        // the block unclassified, and the stale target untouched.

        // Primary pass: first type-classifying tag with a handler wins.
        for tag in &block {
            if classified {
                break;
            }
            if self.registry.is_type_classifier(&tag.name)
                && let Some((name, handler)) = self.registry.resolve(&tag.name)?
            {
                let before = self.context.target();
                handler(&mut self.context, &tag.text, &name, &block);
                if self.context.target() != before {
                    classified = true;
                }
            }
        }

        // Secondary pass: member classifiers fire on unclassified blocks, and
        // `property` additionally fires inside an already classified block
        // (inline property shorthand in a type's own doc block).
        for tag in &block {
            if (!classified || tag.name == "property")
                && self.registry.is_member_classifier(&tag.name)
                && let Some((name, handler)) = self.registry.resolve(&tag.name)?
            {
                let before = self.context.target();
                handler(&mut self.context, &tag.text, &name, &block);
                if self.context.target() != before {
                    classified = true;
                }
            }
        }

        // Not API documentation (prose, license headers): discard silently.
        if !classified {
            return Ok(());
        }

        // Attribute pass: every non-classifier tag mutates the target.
        // Classifier-named tags never re-fire here, so a second `class` tag in
        // the same block cannot spawn a second type.
        for tag in &block {
            if self.registry.is_classifier(&tag.name) {
                continue;
            }
            match self.registry.resolve(&tag.name)? {
                Some((name, handler)) => handler(&mut self.context, &tag.text, &name, &block),
                None => {
                    let diagnostic = Diagnostic {
                        tag: tag.name.clone(),
                        text: tag.text.clone(),
                        source: source.clone(),
                    };
                    log::warn!("{diagnostic}");
                    self.diagnostics.push(diagnostic);
                }
            }
        }

        if let Some(mut target) = self.context.target_mut() {
            target.set_source(Source {
                file: source.file.clone(),
                line: source.line,
            });
            if target.summary().is_none() {
                let desc = target.data().get("desc").and_then(Value::as_str).unwrap_or("");
                let summary = derive_summary(desc);
                if !summary.is_empty() {
                    target.set_summary(summary);
                }
            }
        }

        Ok(())
    }

    /// Dispatch a single scanner event.
    pub fn process(&mut self, event: ScanEvent) -> Result<(), BuildError> {
        match event {
            ScanEvent::BeginBlock { leading_text } => {
                self.on_begin(&leading_text);
                Ok(())
            }
            ScanEvent::Tag { name, text } => {
                self.on_tag(&name, &text);
                Ok(())
            }
            ScanEvent::EndBlock { source } => self.on_end(&source),
        }
    }

    /// Drive the engine over an entire event stream.
    pub fn consume(&mut self, events: impl IntoIterator<Item = ScanEvent>) -> Result<(), BuildError> {
        for event in events {
            self.process(event)?;
        }
        Ok(())
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn model(&self) -> &ApiModel {
        &self.context.model
    }

    pub fn into_model(self) -> ApiModel {
        self.context.model
    }

    /// Unknown-tag diagnostics collected so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn to_serializable(&self) -> Value {
        self.context.model.to_serializable()
    }
}

/// First sentence of the description, capped at 100 characters: take up to the
/// first `.`, or 100 characters when there is none (or it sits past 100).
fn derive_summary(desc: &str) -> String {
    let pos = match desc.chars().position(|c| c == '.') {
        Some(p) if p <= 100 => p,
        _ => 100,
    };
    desc.chars().take(pos).collect()
}
