//! Element identifiers.
//!
//! Ids are strings on the wire (`"shape_12"`, or whatever an older document
//! or share link carried) and interned `Spur`s in memory. Generated ids are
//! `<prefix>_<n>` with a process-wide counter; `fresh` skips any that a
//! loaded diagram already uses.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);
static NEXT: AtomicU64 = AtomicU64::new(1);

/// Id of a shape, arrow, drawing path or control point. Copy, 4 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    pub fn intern(s: &str) -> Self {
        ElementId(IDS.get_or_intern(s))
    }

    pub fn as_str(&self) -> &'static str {
        IDS.resolve(&self.0)
    }

    /// The next generated `<prefix>_<n>` id for which `taken` is false.
    pub fn fresh(prefix: &str, taken: impl Fn(ElementId) -> bool) -> Self {
        loop {
            let n = NEXT.fetch_add(1, Ordering::Relaxed);
            let id = Self::intern(&format!("{prefix}_{n}"));
            if !taken(id) {
                return id;
            }
            log::trace!("id {id} already in the diagram, skipping");
        }
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_string_same_id() {
        assert_eq!(ElementId::intern("k3j9x0q2a"), ElementId::intern("k3j9x0q2a"));
        assert_eq!(ElementId::intern("k3j9x0q2a").as_str(), "k3j9x0q2a");
    }

    #[test]
    fn fresh_skips_taken_ids() {
        let first = ElementId::fresh("cp", |_| false);
        let n: u64 = first.as_str()["cp_".len()..].parse().unwrap();
        // claim the next two numbers so fresh has to step past them
        let blocked = [
            ElementId::intern(&format!("cp_{}", n + 1)),
            ElementId::intern(&format!("cp_{}", n + 2)),
        ];
        let next = ElementId::fresh("cp", |id| blocked.contains(&id));
        assert!(!blocked.contains(&next));
        assert!(next.as_str().starts_with("cp_"));
        assert_ne!(next, first);
    }

    #[test]
    fn wire_form_is_the_plain_string() {
        let id = ElementId::intern("path_42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"path_42\"");
        let back: ElementId = serde_json::from_str("\"path_42\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ElementId>("42").is_err());
    }
}
