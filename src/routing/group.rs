//! Route groups: registration under a shared path prefix.

use crate::app::App;
use crate::dispatch::chain::Handler;
use crate::routing::pattern::CompileError;
use crate::routing::router::MethodFilter;

/// Join a group prefix and a child path with exactly one `/` between them.
///
/// Duplicate slashes collapse, an empty or `/` child stands for the prefix
/// itself, and an empty result is the root.
pub fn compose(prefix: &str, child: &str) -> String {
    let child = if child == "/" { "" } else { child };

    let mut joined = String::with_capacity(prefix.len() + child.len() + 2);
    for part in [prefix, child] {
        if part.is_empty() {
            continue;
        }
        if !joined.ends_with('/') {
            joined.push('/');
        }
        for c in part.chars() {
            if c == '/' && joined.ends_with('/') {
                continue;
            }
            joined.push(c);
        }
    }

    if child.is_empty() && joined.len() > 1 && joined.ends_with('/') {
        joined.pop();
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}

/// A routing namespace: every registration is prefixed before it reaches the app.
pub struct Group<'a> {
    app: &'a mut App,
    prefix: String,
}

impl<'a> Group<'a> {
    pub(crate) fn new(app: &'a mut App, prefix: String) -> Self {
        Self { app, prefix }
    }

    /// The fully composed prefix of this group.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A nested group; prefixes concatenate left to right.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let prefix = compose(&self.prefix, prefix);
        Group::new(self.app, prefix)
    }

    /// A nested group whose `handlers` run as middleware for everything under it.
    pub fn group_with(
        &mut self,
        prefix: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<Group<'_>, CompileError> {
        let prefix = compose(&self.prefix, prefix);
        self.app.register(MethodFilter::Use, &prefix, handlers)?;
        Ok(Group::new(self.app, prefix))
    }

    /// Register `handlers` for `filter` at `path` under this group's prefix.
    pub fn register(
        &mut self,
        filter: impl Into<MethodFilter>,
        path: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<&mut Self, CompileError> {
        let path = compose(&self.prefix, path);
        self.app.register(filter, &path, handlers)?;
        Ok(self)
    }
}

crate::app::method_helpers!(Group<'_>);
