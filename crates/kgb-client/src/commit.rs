//! Commit notification payload for `commit_v4`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// `extra` key carrying a web link to the commit
pub const EXTRA_WEB_LINK: &str = "web_link";
/// `extra` key asking the relay to use IRC NOTICE instead of PRIVMSG
pub const EXTRA_USE_IRC_NOTICES: &str = "use_irc_notices";
/// `extra` key asking the relay to colorize its output
pub const EXTRA_USE_COLOR: &str = "use_color";

/// A version-control event as the relay expects it.
///
/// Field names are part of the wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitNotification {
    pub commit_id: String,
    pub rev_prefix: String,
    pub author: String,
    pub branch: String,
    pub module: String,
    pub commit_log: String,
    /// Change descriptors, e.g. `(A)src/lib.rs` or `(M)Cargo.toml+`
    pub changes: Vec<String>,
    pub extra: BTreeMap<String, Value>,
}

impl CommitNotification {
    /// Create a notification with the mandatory author and log message
    pub fn new(author: &str, commit_log: &str) -> Self {
        CommitNotification {
            author: author.to_string(),
            commit_log: commit_log.to_string(),
            ..Default::default()
        }
    }

    /// Set the commit id
    pub fn with_commit_id(mut self, commit_id: &str) -> Self {
        self.commit_id = commit_id.to_string();
        self
    }

    /// Set the revision prefix shown before the commit id
    pub fn with_rev_prefix(mut self, rev_prefix: &str) -> Self {
        self.rev_prefix = rev_prefix.to_string();
        self
    }

    /// Set the branch the commit landed on
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    /// Set the module or sub-project
    pub fn with_module(mut self, module: &str) -> Self {
        self.module = module.to_string();
        self
    }

    /// Append one change descriptor
    pub fn with_change(mut self, change: impl Into<String>) -> Self {
        self.changes.push(change.into());
        self
    }

    /// Append several change descriptors, keeping their order
    pub fn with_changes<I, C>(mut self, changes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.changes.extend(changes.into_iter().map(Into::into));
        self
    }

    /// Link to the commit in a web viewer (`extra.web_link`)
    pub fn with_web_link(self, url: &str) -> Self {
        self.with_extra(EXTRA_WEB_LINK, Value::String(url.to_string()))
    }

    /// Ask the relay to use IRC NOTICE (`extra.use_irc_notices`)
    pub fn with_irc_notices(self, enabled: bool) -> Self {
        self.with_extra(EXTRA_USE_IRC_NOTICES, Value::Bool(enabled))
    }

    /// Ask the relay to colorize its output (`extra.use_color`)
    pub fn with_color(self, enabled: bool) -> Self {
        self.with_extra(EXTRA_USE_COLOR, Value::Bool(enabled))
    }

    /// Set an arbitrary `extra` entry, replacing any previous value
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

/// Kind of mutation a change descriptor describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    fn marker(self) -> &'static str {
        match self {
            ChangeKind::Added => "(A)",
            ChangeKind::Modified => "(M)",
            ChangeKind::Deleted => "(D)",
        }
    }
}

/// Typed form of a change descriptor string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// `None` when the kind is unknown; rendered without a prefix
    pub kind: Option<ChangeKind>,
    pub path: String,
    /// Only properties changed (rendered as a trailing `+`)
    pub property_change: bool,
}

impl Change {
    /// Create a change that is not property-only
    pub fn new(kind: Option<ChangeKind>, path: &str) -> Self {
        Change {
            kind,
            path: path.to_string(),
            property_change: false,
        }
    }

    /// `(A)` change for `path`
    pub fn added(path: &str) -> Self {
        Self::new(Some(ChangeKind::Added), path)
    }

    /// `(M)` change for `path`
    pub fn modified(path: &str) -> Self {
        Self::new(Some(ChangeKind::Modified), path)
    }

    /// `(D)` change for `path`
    pub fn deleted(path: &str) -> Self {
        Self::new(Some(ChangeKind::Deleted), path)
    }

    /// Mark this change as property-only
    pub fn property_only(mut self) -> Self {
        self.property_change = true;
        self
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.kind {
            f.write_str(kind.marker())?;
        }
        f.write_str(&self.path)?;
        if self.property_change {
            f.write_str("+")?;
        }
        Ok(())
    }
}

impl From<Change> for String {
    fn from(change: Change) -> Self {
        change.to_string()
    }
}

impl FromStr for Change {
    type Err = Infallible;

    /// Every string is a valid descriptor; unknown prefixes stay part of the path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = [ChangeKind::Added, ChangeKind::Modified, ChangeKind::Deleted]
            .into_iter()
            .find_map(|k| s.strip_prefix(k.marker()).map(|rest| (Some(k), rest)))
            .unwrap_or((None, s));

        let (path, property_change) = match rest.strip_suffix('+') {
            Some(path) => (path, true),
            None => (rest, false),
        };

        Ok(Change {
            kind,
            path: path.to_string(),
            property_change,
        })
    }
}
