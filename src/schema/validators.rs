//! Validator chain storage.
//!
//! Entries are evaluated in insertion order. Every entry gets a stable
//! `ValidatorHandle` at insertion; callers that need to replace an entry
//! later (min / max bounds) keep the handle and remove by it.

use std::fmt;
use std::sync::Arc;

use super::candidate::Candidate;
use super::errors::FieldResult;
use super::messages::MessageTemplate;

/// Predicate over an already-cast value. `None` means the field is empty.
pub type Predicate<T> = Arc<dyn Fn(Option<&T>) -> FieldResult<bool> + Send + Sync>;

/// Boxes a closure as a chain predicate.
pub fn predicate<T, F>(f: F) -> Predicate<T>
where
    F: Fn(Option<&T>) -> FieldResult<bool> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Stable identifier of a chain entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValidatorHandle(u64);

/// Tag describing what a validator enforces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorKind {
    Min,
    Max,
    Required,
    Custom(String),
}

impl ValidatorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ValidatorKind::Min => "min",
            ValidatorKind::Max => "max",
            ValidatorKind::Required => "required",
            ValidatorKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bound argument of a min / max validator.
#[derive(Clone)]
pub enum Bound {
    /// Fixed value, cast on every evaluation
    Literal(Candidate),
    /// Current time, read on every evaluation
    Now,
    /// Caller-supplied function, invoked on every evaluation
    Computed(Arc<dyn Fn() -> Candidate + Send + Sync>),
}

impl Bound {
    pub fn literal(value: impl Into<Candidate>) -> Self {
        Bound::Literal(value.into())
    }

    pub fn computed(f: impl Fn() -> Candidate + Send + Sync + 'static) -> Self {
        Bound::Computed(Arc::new(f))
    }

    /// A falsy literal switches the bound off.
    pub fn is_unset(&self) -> bool {
        match self {
            Bound::Literal(value) => value.is_falsy(),
            Bound::Now | Bound::Computed(_) => false,
        }
    }
}

impl fmt::Debug for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Bound::Now => write!(f, "Now"),
            Bound::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// One validator in the chain.
pub struct ValidatorEntry<T> {
    handle: ValidatorHandle,
    kind: ValidatorKind,
    message: MessageTemplate,
    bound: Option<Bound>,
    predicate: Predicate<T>,
}

impl<T> ValidatorEntry<T> {
    pub fn handle(&self) -> ValidatorHandle {
        self.handle
    }

    pub fn kind(&self) -> &ValidatorKind {
        &self.kind
    }

    pub fn message(&self) -> &MessageTemplate {
        &self.message
    }

    /// Original, uncast bound for min / max entries
    pub fn bound(&self) -> Option<&Bound> {
        self.bound.as_ref()
    }

    pub fn check(&self, value: Option<&T>) -> FieldResult<bool> {
        (self.predicate)(value)
    }
}

impl<T> Clone for ValidatorEntry<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            kind: self.kind.clone(),
            message: self.message.clone(),
            bound: self.bound.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for ValidatorEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorEntry")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("bound", &self.bound)
            .finish()
    }
}

/// Ordered validator storage.
pub struct ValidatorChain<T> {
    entries: Vec<ValidatorEntry<T>>,
    next_handle: u64,
}

impl<T> ValidatorChain<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 0,
        }
    }

    /// Appends an entry and returns its handle.
    pub fn push(
        &mut self,
        kind: ValidatorKind,
        message: MessageTemplate,
        bound: Option<Bound>,
        predicate: Predicate<T>,
    ) -> ValidatorHandle {
        let handle = ValidatorHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(ValidatorEntry {
            handle,
            kind,
            message,
            bound,
            predicate,
        });
        handle
    }

    /// Removes the entry with `handle`, if still present.
    pub fn remove(&mut self, handle: ValidatorHandle) -> Option<ValidatorEntry<T>> {
        let position = self.entries.iter().position(|entry| entry.handle == handle)?;
        Some(self.entries.remove(position))
    }

    pub fn get(&self, handle: ValidatorHandle) -> Option<&ValidatorEntry<T>> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidatorEntry<T>> {
        self.entries.iter()
    }

    /// Entries whose kind matches `kind`
    pub fn count_kind(&self, kind: &ValidatorKind) -> usize {
        self.entries.iter().filter(|entry| &entry.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ValidatorChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ValidatorChain<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            next_handle: self.next_handle,
        }
    }
}

impl<T> fmt::Debug for ValidatorChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}
