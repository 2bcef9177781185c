//! Permission tree: leaves, boolean composition and failure metadata.
//!
//! A tree is built once (route registration) and never mutated; `&`, `|`
//! and `!` consume their operands and return a new node. Evaluation lives in
//! [`crate::resolve`].

use std::borrow::Cow;
use std::fmt;
use std::ops;
use std::sync::Arc;

use async_trait::async_trait;

use permkit_core::{CheckOutcome, CheckResult, Deps};

use crate::dependency::{Context, Slot};
use crate::lazy::SkipOn;

/// Message used when nothing more specific is configured.
pub const DEFAULT_MESSAGE: &str = "Permission denied";

/// Status used when nothing more specific is configured.
pub const DEFAULT_STATUS: u16 = 403;

const ALL_MESSAGE: &str = "Not all permissions were satisfied";
const ANY_MESSAGE: &str = "None of the permissions were satisfied";
const NOT_MESSAGE: &str = "The permission was satisfied, but it should not have been";

/// The check logic behind a leaf permission.
///
/// Implementors declare their dependency slots; the engine resolves them
/// (in order) before calling [`Check::check`] with the values.
///
/// Failure metadata for a denial without an explicit reason is looked up in
/// this order: instance override on the [`Permission`], [`Check::message`],
/// [`Check::default_message`], [`DEFAULT_MESSAGE`]. Status codes follow the
/// same order and end at [`DEFAULT_STATUS`].
#[async_trait]
pub trait Check<C: Context>: Send + Sync + 'static {
    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(short_type_name::<Self>())
    }

    /// Slots to resolve before `check` runs, in positional order.
    fn dependencies(&self) -> Vec<Slot<C>> {
        Vec::new()
    }

    async fn check(&self, ctx: &C, deps: &Deps) -> CheckResult;

    /// Dynamic message hook.
    fn message(&self) -> Option<String> {
        None
    }

    /// Static per-type message.
    fn default_message(&self) -> Option<&'static str> {
        None
    }

    /// Dynamic status hook.
    fn status(&self) -> Option<u16> {
        None
    }

    /// Static per-type status.
    fn default_status(&self) -> Option<u16> {
        None
    }

    /// Per-type lazy allow-list. When set, [`Permission::new`] wraps the leaf
    /// in a lazy node automatically.
    fn skip_on(&self) -> Option<SkipOn> {
        None
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Instance-level settings shared by every node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Turn a root denial into an error (default) or hand the raw outcome back.
    pub auto_raise: bool,
    pub message: Option<String>,
    pub status: Option<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_raise: true,
            message: None,
            status: None,
        }
    }
}

impl Settings {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A check plus the slots it declared when the leaf was built.
pub struct Leaf<C: Context> {
    pub(crate) check: Arc<dyn Check<C>>,
    pub(crate) slots: Vec<Slot<C>>,
}

impl<C: Context> Leaf<C> {
    pub fn name(&self) -> Cow<'static, str> {
        self.check.name()
    }

    pub fn check(&self) -> &dyn Check<C> {
        self.check.as_ref()
    }

    pub fn slots(&self) -> &[Slot<C>] {
        &self.slots
    }
}

impl<C: Context> Clone for Leaf<C> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
            slots: self.slots.clone(),
        }
    }
}

/// Node variants of a permission tree.
pub enum Node<C: Context> {
    Leaf(Leaf<C>),
    /// AND; never directly contains another default-configured `All`.
    All(Vec<Permission<C>>),
    /// OR; never directly contains another default-configured `Any`.
    Any(Vec<Permission<C>>),
    Not(Box<Permission<C>>),
    Lazy {
        inner: Box<Permission<C>>,
        skip_on: SkipOn,
    },
    Wrapper {
        name: Option<Cow<'static, str>>,
        inner: Box<Permission<C>>,
    },
}

impl<C: Context> Clone for Node<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(leaf) => Self::Leaf(leaf.clone()),
            Self::All(children) => Self::All(children.clone()),
            Self::Any(children) => Self::Any(children.clone()),
            Self::Not(inner) => Self::Not(inner.clone()),
            Self::Lazy { inner, skip_on } => Self::Lazy {
                inner: inner.clone(),
                skip_on: skip_on.clone(),
            },
            Self::Wrapper { name, inner } => Self::Wrapper {
                name: name.clone(),
                inner: inner.clone(),
            },
        }
    }
}

/// Discriminant of [`Node`], for structural assertions and logging.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Leaf,
    All,
    Any,
    Not,
    Lazy,
    Wrapper,
}

/// A (possibly composed) permission over request context `C`.
pub struct Permission<C: Context> {
    pub(crate) node: Node<C>,
    pub(crate) settings: Settings,
}

impl<C: Context> Clone for Permission<C> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<C: Context> Permission<C> {
    /// Leaf permission from a check.
    ///
    /// Checks that declare [`Check::skip_on`] come back wrapped in a lazy node.
    pub fn new(check: impl Check<C>) -> Self {
        Self::from_check(Arc::new(check))
    }

    pub fn from_check(check: Arc<dyn Check<C>>) -> Self {
        let slots = check.dependencies();
        let skip_on = check.skip_on();
        let leaf = Self::from_node(Node::Leaf(Leaf { check, slots }));

        match skip_on {
            Some(skip_on) => leaf.lazy(skip_on),
            None => leaf,
        }
    }

    pub(crate) fn from_node(node: Node<C>) -> Self {
        Self {
            node,
            settings: Settings::default(),
        }
    }

    /// AND over `perms`, flattening nested default-configured `All` nodes.
    pub fn all(perms: impl IntoIterator<Item = Self>) -> Self {
        let children = perms
            .into_iter()
            .flat_map(|p| p.flatten_for(Kind::All))
            .collect();
        Self::from_node(Node::All(children))
    }

    /// OR over `perms`, flattening nested default-configured `Any` nodes.
    pub fn any(perms: impl IntoIterator<Item = Self>) -> Self {
        let children = perms
            .into_iter()
            .flat_map(|p| p.flatten_for(Kind::Any))
            .collect();
        Self::from_node(Node::Any(children))
    }

    // Nodes carrying their own settings stay whole.
    fn flatten_for(self, kind: Kind) -> Vec<Self> {
        let Permission { node, settings } = self;
        match node {
            Node::All(children) if kind == Kind::All && settings.is_default() => children,
            Node::Any(children) if kind == Kind::Any && settings.is_default() => children,
            node => vec![Permission { node, settings }],
        }
    }

    /// Present this expression as a single node, e.g. to toggle `auto_raise`
    /// for the whole expression.
    pub fn wrap(self) -> Self {
        Self::from_node(Node::Wrapper {
            name: None,
            inner: Box::new(self),
        })
    }

    /// Like [`Permission::wrap`], under a reusable name (used in logs).
    pub fn named(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self::from_node(Node::Wrapper {
            name: Some(name.into()),
            inner: Box::new(self),
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.settings.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.settings.status = Some(status);
        self
    }

    pub fn with_auto_raise(mut self, auto_raise: bool) -> Self {
        self.settings.auto_raise = auto_raise;
        self
    }

    pub fn node(&self) -> &Node<C> {
        &self.node
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn auto_raise(&self) -> bool {
        self.settings.auto_raise
    }

    pub fn kind(&self) -> Kind {
        match &self.node {
            Node::Leaf(_) => Kind::Leaf,
            Node::All(_) => Kind::All,
            Node::Any(_) => Kind::Any,
            Node::Not(_) => Kind::Not,
            Node::Lazy { .. } => Kind::Lazy,
            Node::Wrapper { .. } => Kind::Wrapper,
        }
    }

    /// Direct children in declared order (empty for leaves).
    pub fn children(&self) -> &[Permission<C>] {
        match &self.node {
            Node::Leaf(_) => &[],
            Node::All(children) | Node::Any(children) => children.as_slice(),
            Node::Not(inner) | Node::Lazy { inner, .. } | Node::Wrapper { inner, .. } => {
                std::slice::from_ref(inner.as_ref())
            }
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf<C>> {
        match &self.node {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Message for a denial that carries no reason of its own.
    pub fn message(&self) -> String {
        if let Some(message) = &self.settings.message {
            return message.clone();
        }

        match &self.node {
            Node::Leaf(leaf) => leaf
                .check
                .message()
                .or_else(|| leaf.check.default_message().map(str::to_owned))
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_owned()),
            Node::All(_) => ALL_MESSAGE.to_owned(),
            Node::Any(_) => ANY_MESSAGE.to_owned(),
            Node::Not(_) => NOT_MESSAGE.to_owned(),
            Node::Lazy { inner, .. } | Node::Wrapper { inner, .. } => inner.message(),
        }
    }

    /// Status code reported when this node is the root of a raised denial.
    pub fn status(&self) -> u16 {
        if let Some(status) = self.settings.status {
            return status;
        }

        match &self.node {
            Node::Leaf(leaf) => leaf
                .check
                .status()
                .or_else(|| leaf.check.default_status())
                .unwrap_or(DEFAULT_STATUS),
            Node::Lazy { inner, .. } | Node::Wrapper { inner, .. } => inner.status(),
            Node::All(_) | Node::Any(_) | Node::Not(_) => DEFAULT_STATUS,
        }
    }

    /// Fill in the reason of a denial produced at this node.
    ///
    /// Leaves keep an explicit reason over their override; composites let an
    /// instance override replace whatever reason bubbled up from children.
    pub(crate) fn finish(&self, outcome: CheckOutcome) -> CheckOutcome {
        match outcome {
            CheckOutcome::Denied { reason } => {
                let reason = match reason {
                    Some(reason)
                        if matches!(self.node, Node::Leaf(_)) || self.settings.message.is_none() =>
                    {
                        reason
                    }
                    _ => self.message(),
                };
                CheckOutcome::Denied {
                    reason: Some(reason),
                }
            }
            other => other,
        }
    }

    /// Structural identity: same shape, same settings, and every leaf backed
    /// by the very same check instance.
    pub fn same_as(&self, other: &Self) -> bool {
        if self.settings != other.settings {
            return false;
        }

        match (&self.node, &other.node) {
            (Node::Leaf(a), Node::Leaf(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(&a.check), Arc::as_ptr(&b.check))
            }
            (Node::All(a), Node::All(b)) | (Node::Any(a), Node::Any(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (Node::Not(a), Node::Not(b)) => a.same_as(b),
            (
                Node::Lazy {
                    inner: a,
                    skip_on: sa,
                },
                Node::Lazy {
                    inner: b,
                    skip_on: sb,
                },
            ) => sa == sb && a.same_as(b),
            (Node::Wrapper { name: na, inner: a }, Node::Wrapper { name: nb, inner: b }) => {
                na == nb && a.same_as(b)
            }
            _ => false,
        }
    }
}

/// AND of two permissions (`lhs & rhs`).
pub fn and_of<C: Context>(lhs: Permission<C>, rhs: Permission<C>) -> Permission<C> {
    Permission::all([lhs, rhs])
}

/// OR of two permissions (`lhs | rhs`).
pub fn or_of<C: Context>(lhs: Permission<C>, rhs: Permission<C>) -> Permission<C> {
    Permission::any([lhs, rhs])
}

/// Negation (`!p`). Negating a `Not` hands back its child unchanged.
pub fn not_of<C: Context>(permission: Permission<C>) -> Permission<C> {
    match permission.node {
        Node::Not(inner) => *inner,
        node => Permission::from_node(Node::Not(Box::new(Permission {
            node,
            settings: permission.settings,
        }))),
    }
}

impl<C: Context> ops::BitAnd for Permission<C> {
    type Output = Permission<C>;

    fn bitand(self, rhs: Self) -> Self::Output {
        and_of(self, rhs)
    }
}

impl<C: Context> ops::BitOr for Permission<C> {
    type Output = Permission<C>;

    fn bitor(self, rhs: Self) -> Self::Output {
        or_of(self, rhs)
    }
}

impl<C: Context> ops::Not for Permission<C> {
    type Output = Permission<C>;

    fn not(self) -> Self::Output {
        not_of(self)
    }
}

/// Turn a check into a permission (`HasRole::new(..).into_permission()`).
pub trait IntoPermission<C: Context> {
    fn into_permission(self) -> Permission<C>;
}

impl<C: Context, T: Check<C>> IntoPermission<C> for T {
    fn into_permission(self) -> Permission<C> {
        Permission::new(self)
    }
}

fn write_joined<C: Context>(
    f: &mut fmt::Formatter<'_>,
    children: &[Permission<C>],
    op: &str,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(op)?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}

impl<C: Context> fmt::Display for Permission<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Node::Leaf(leaf) => f.write_str(&leaf.name()),
            Node::All(children) => write_joined(f, children, " & "),
            Node::Any(children) => write_joined(f, children, " | "),
            Node::Not(inner) => write!(f, "!{inner}"),
            Node::Lazy { inner, .. } => write!(f, "lazy({inner})"),
            Node::Wrapper {
                name: Some(name), ..
            } => f.write_str(name),
            Node::Wrapper { name: None, inner } => write!(f, "wrap({inner})"),
        }
    }
}

impl<C: Context> fmt::Debug for Permission<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permission")
            .field("kind", &self.kind())
            .field("expr", &format_args!("{self}"))
            .field("settings", &self.settings)
            .finish()
    }
}
