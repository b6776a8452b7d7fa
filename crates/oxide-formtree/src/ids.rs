//! Element id generation.
//!
//! Every node receives a non-empty id. Ids are derived from element names
//! (`user[email]` gives `user-email`), deduplicated with numeric suffixes, and
//! explicitly chosen ids are reserved so later generated ids never collide
//! with them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use regex::Regex;

use crate::error::{FormError, Result};

/// Base used for nodes without a name.
pub const AUTO_ID_BASE: &str = "qfauto";

/// Prefix for bases that would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "qf";

static NUMBERED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-(\d+)$").expect("static pattern"));

/// Options for [`IdAllocator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdOptions {
    /// Append `-0` even to the first id generated for a base.
    pub always_append_index: bool,
}

/// Generates and reserves element ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    options: IdOptions,
    counters: HashMap<String, u64>,
    issued: HashSet<String>,
}

impl IdAllocator {
    /// Creates an allocator with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with the given options.
    pub fn with_options(options: IdOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Returns the allocator options.
    pub fn options(&self) -> IdOptions {
        self.options
    }

    /// Generates a fresh id for an element name.
    pub fn generate(&mut self, element_name: &str) -> String {
        let base = id_base(element_name);
        let mut candidate = if self.counters.contains_key(&base) {
            self.next_numbered(&base)
        } else {
            self.counters.insert(base.clone(), 0);
            if self.options.always_append_index {
                format!("{base}-0")
            } else {
                base.clone()
            }
        };
        // A manually reserved id or a name like "x-1" may already own the
        // candidate; keep counting until it is free.
        while self.issued.contains(&candidate) {
            candidate = self.next_numbered(&base);
        }
        self.record(&candidate);
        candidate
    }

    /// Bumps the counter of `base` and returns the numbered id. Once the
    /// counter is exhausted, numbering continues below `{base}-{u64::MAX}`.
    fn next_numbered(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        match counter.checked_add(1) {
            Some(next) => {
                *counter = next;
                format!("{base}-{next}")
            }
            None => self.next_numbered(&format!("{base}-{}", u64::MAX)),
        }
    }

    /// Records an explicitly supplied id.
    ///
    /// Fails if the id is empty or contains whitespace.
    pub fn reserve(&mut self, id: &str) -> Result<()> {
        validate_id(id)?;
        self.record(id);
        Ok(())
    }

    /// Forgets all counters and issued ids.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.issued.clear();
    }

    fn record(&mut self, id: &str) {
        self.issued.insert(id.to_string());
        if let Some(caps) = NUMBERED_ID.captures(id) {
            if let Ok(n) = caps[2].parse::<u64>() {
                let counter = self.counters.entry(caps[1].to_string()).or_insert(0);
                *counter = (*counter).max(n);
            }
        }
        self.counters.entry(id.to_string()).or_insert(0);
    }
}

/// Where a form gets its ids from.
///
/// A form normally owns its allocator; several forms that must never share
/// an id can use one [`SharedIds`] handle instead.
#[derive(Debug, Clone)]
pub enum IdSource {
    /// Allocator private to one form.
    Owned(IdAllocator),
    /// Allocator shared between forms and threads.
    Shared(SharedIds),
}

impl IdSource {
    pub(crate) fn generate(&mut self, element_name: &str) -> String {
        match self {
            Self::Owned(ids) => ids.generate(element_name),
            Self::Shared(shared) => shared.generate(element_name),
        }
    }

    pub(crate) fn reserve(&mut self, id: &str) -> Result<()> {
        match self {
            Self::Owned(ids) => ids.reserve(id),
            Self::Shared(shared) => shared.reserve(id),
        }
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::Owned(IdAllocator::new())
    }
}

/// A thread-safe handle to an allocator shared between forms.
#[derive(Debug, Clone, Default)]
pub struct SharedIds(Arc<Mutex<IdAllocator>>);

impl SharedIds {
    /// Creates a shared allocator.
    pub fn new(options: IdOptions) -> Self {
        Self(Arc::new(Mutex::new(IdAllocator::with_options(options))))
    }

    /// Generates a fresh id.
    pub fn generate(&self, element_name: &str) -> String {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate(element_name)
    }

    /// Reserves an explicit id.
    pub fn reserve(&self, id: &str) -> Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reserve(id)
    }
}

/// Checks that an id is usable in markup.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.chars().any(|c| matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0c')) {
        return Err(FormError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Normalizes an element name into an id base.
///
/// Bracket tokens become hyphens and trailing hyphens are trimmed, so
/// `a[b][]` gives `a-b`.
pub fn id_base(element_name: &str) -> String {
    let replaced: String = element_name
        .chars()
        .map(|c| if c == '[' || c == ']' { '-' } else { c })
        .collect();
    let mut base = String::with_capacity(replaced.len());
    let mut previous_hyphen = false;
    for c in replaced.chars() {
        // "a[b]" becomes "a-b-", collapse the "]-[" pairs into one hyphen
        if c == '-' && previous_hyphen {
            continue;
        }
        previous_hyphen = c == '-';
        base.push(c);
    }
    let base = base.trim_end_matches('-');
    let base = if base.is_empty() { AUTO_ID_BASE } else { base };
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{DIGIT_PREFIX}{base}")
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_base() {
        assert_eq!(id_base("name"), "name");
        assert_eq!(id_base("a[b][]"), "a-b");
        assert_eq!(id_base("a[b][c]"), "a-b-c");
        assert_eq!(id_base(""), AUTO_ID_BASE);
        assert_eq!(id_base("1st"), "qf1st");
    }

    #[test]
    fn test_same_name_gets_distinct_ids() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.generate("email"), "email");
        assert_eq!(ids.generate("email"), "email-1");
        assert_eq!(ids.generate("email"), "email-2");
    }

    #[test]
    fn test_exhausted_counter_keeps_ids_unique() {
        let mut ids = IdAllocator::new();
        ids.reserve("x-18446744073709551615").unwrap();
        let first = ids.generate("x");
        let second = ids.generate("x");
        assert_eq!(first, "x-18446744073709551615-1");
        assert_eq!(second, "x-18446744073709551615-2");
    }

    #[test]
    fn test_always_append_index() {
        let mut ids = IdAllocator::with_options(IdOptions {
            always_append_index: true,
        });
        assert_eq!(ids.generate("email"), "email-0");
        assert_eq!(ids.generate("email"), "email-1");
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let mut ids = IdAllocator::new();
        ids.reserve("city-3").unwrap();
        assert_eq!(ids.generate("city"), "city-4");

        ids.reserve("zip").unwrap();
        assert_eq!(ids.generate("zip"), "zip-1");
    }

    #[test]
    fn test_name_looking_like_numbered_id() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.generate("x-1"), "x-1");
        assert_eq!(ids.generate("x"), "x-2");
        assert_eq!(ids.generate("x"), "x-3");
    }

    #[test]
    fn test_invalid_ids_rejected() {
        let mut ids = IdAllocator::new();
        assert!(matches!(ids.reserve("a b"), Err(FormError::InvalidId(_))));
        assert!(matches!(ids.reserve("a\tb"), Err(FormError::InvalidId(_))));
        assert!(matches!(ids.reserve(""), Err(FormError::InvalidId(_))));
        assert!(ids.reserve("qf:form").is_ok());
    }

    #[test]
    fn test_shared_ids_across_handles() {
        let shared = SharedIds::new(IdOptions::default());
        let other = shared.clone();
        assert_eq!(shared.generate("q"), "q");
        assert_eq!(other.generate("q"), "q-1");
    }
}
