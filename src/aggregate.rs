//! # Aggregation & Filter Engine
//!
//! Merges the raw author records from every scanned repository into the
//! final, deterministic result set. The steps are order-sensitive:
//!
//! 1. Case-insensitive pre-sort and exact-duplicate drop
//! 2. Built-in filtering against the verbatim identities
//! 3. Column projection (name and/or email stripping)
//! 4. User-literal filtering against the remaining fields
//! 5. Fork-flag clearing when annotation is disabled
//! 6. Grouped fold by normalized key
//! 7. Final stable, case-insensitive sort
//!
//! The merge is an explicit grouped fold keyed by [`GroupKey`]; key
//! normalization (lowercasing, empty-field policy) is concentrated there
//! so it can be tested exhaustively.

use std::collections::HashMap;

use crate::extract::AuthorRecord;

/// Separator between distinct display names merged under one email.
pub const NAME_SEPARATOR: &str = " / ";

/// Platform-generated no-reply address suffix.
pub const NOREPLY_SUFFIX: &str = "@users.noreply.github.com";

/// Legacy platform no-reply address.
pub const LEGACY_NOREPLY: &str = "noreply@github.com";

/// CI-bot author address.
pub const CI_BOT_ADDRESS: &str = "actions@github.com";

/// Filtering and projection options for one aggregation run.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Apply the built-in drop list: blank identities, platform no-reply
    /// addresses, CI-bot addresses.
    pub use_builtin_filters: bool,
    /// Keep display names in the output.
    pub include_name: bool,
    /// Keep emails in the output.
    pub include_email: bool,
    /// Keep the fork-origin marker on merged records.
    pub include_fork_annotation: bool,
    /// Literal substrings to exclude. Always applied, even when built-in
    /// filters are disabled: explicit user intent.
    pub user_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            use_builtin_filters: true,
            include_name: true,
            include_email: true,
            include_fork_annotation: true,
            user_patterns: Vec::new(),
        }
    }
}

/// The deduplicated, filtered, per-identity aggregate shown in the final
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    /// Normalized (lowercased) email key; empty for name-only entries.
    /// Never renamed once the group is created.
    pub email: String,
    /// Distinct display names seen under the key, in encounter order
    /// (encounter order is the pre-sorted record order, so it is
    /// deterministic run-to-run).
    pub names: Vec<String>,
    /// True if any contributing repository was a fork.
    pub from_fork: bool,
}

impl MergedRecord {
    /// All names joined by the fixed separator.
    pub fn joined_names(&self) -> String {
        self.names.join(NAME_SEPARATOR)
    }

    /// The key this record sorts by.
    fn sort_key(&self, by_email: bool) -> String {
        if by_email {
            self.email.to_lowercase()
        } else {
            self.joined_names().to_lowercase()
        }
    }
}

/// Merge key policy.
///
/// When emails are included, an empty-email record with a name is kept as
/// its own entry keyed by the name, never folded into a shared "no email"
/// bucket. When emails are excluded, every record projects down to its
/// name and groups by it. A record with neither field is meaningless and
/// is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Email(String),
    NameOnly(String),
}

impl GroupKey {
    fn of(record: &AuthorRecord, include_email: bool) -> Option<GroupKey> {
        if include_email && !record.email.is_empty() {
            return Some(GroupKey::Email(record.email.to_lowercase()));
        }
        if !record.name.is_empty() {
            return Some(GroupKey::NameOnly(record.name.to_lowercase()));
        }
        None
    }
}

/// The serialized form a record is matched against when filtering.
fn serialize(record: &AuthorRecord) -> String {
    match (record.email.is_empty(), record.name.is_empty()) {
        (false, false) => format!("{} {}", record.email, record.name),
        (false, true) => record.email.clone(),
        (true, false) => record.name.clone(),
        (true, true) => String::new(),
    }
}

fn builtin_excluded(record: &AuthorRecord) -> bool {
    if serialize(record).trim().is_empty() {
        return true;
    }
    if record.email.trim().is_empty() {
        return true;
    }
    let email = record.email.to_lowercase();
    email.ends_with(NOREPLY_SUFFIX) || email == LEGACY_NOREPLY || email == CI_BOT_ADDRESS
}

/// Aggregate all raw records into the ordered, merged result set.
///
/// Zero input records yield an explicitly empty result, not an error.
pub fn aggregate(records: Vec<AuthorRecord>, config: &FilterConfig) -> Vec<MergedRecord> {
    // Step 1: case-insensitive pre-sort, then drop exact duplicates. The
    // sort bounds later merge work and makes pattern filtering independent
    // of repository traversal order.
    let mut records = records;
    records.sort_by(|a, b| {
        (a.email.to_lowercase(), a.name.to_lowercase(), &a.email, &a.name, a.from_fork)
            .cmp(&(b.email.to_lowercase(), b.name.to_lowercase(), &b.email, &b.name, b.from_fork))
    });
    records.dedup();

    // Step 2: built-in filtering runs against the verbatim identities,
    // before any projection: an email-based drop rule must still apply
    // when the email column itself is excluded from the output.
    if config.use_builtin_filters {
        records.retain(|record| !builtin_excluded(record));
    }

    // Step 3: column projection before the merge, so later steps operate
    // on the remaining fields alone.
    if !config.include_name {
        for record in &mut records {
            record.name.clear();
        }
    }
    if !config.include_email {
        for record in &mut records {
            record.email.clear();
        }
    }

    // Step 4: user literals are explicit intent, match the serialized
    // remaining fields, and apply even when the built-in set is disabled.
    records.retain(|record| {
        let serialized = serialize(record);
        !config
            .user_patterns
            .iter()
            .any(|pattern| serialized.contains(pattern))
    });

    // Step 5: fork markers were stamped per contributing repository at
    // extraction; clearing them here keeps the merge oblivious to the
    // annotation toggle.
    if !config.include_fork_annotation {
        for record in &mut records {
            record.from_fork = false;
        }
    }

    // Step 6: grouped fold by normalized key, building the name set and
    // fork flag incrementally.
    let mut order: Vec<GroupKey> = Vec::new();
    let mut groups: HashMap<GroupKey, MergedRecord> = HashMap::new();
    for record in records {
        let Some(key) = GroupKey::of(&record, config.include_email) else {
            continue;
        };
        let entry = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            MergedRecord {
                email: if record.email.is_empty() {
                    String::new()
                } else {
                    record.email.to_lowercase()
                },
                names: Vec::new(),
                from_fork: false,
            }
        });
        if !record.name.is_empty() && !entry.names.contains(&record.name) {
            entry.names.push(record.name.clone());
        }
        entry.from_fork |= record.from_fork;
    }

    let mut merged: Vec<MergedRecord> = order
        .into_iter()
        .map(|key| groups.remove(&key).expect("group exists for ordered key"))
        .collect();

    // Step 7: final sort, case-insensitive by the primary key, stable with
    // respect to ties.
    merged.sort_by_key(|record| record.sort_key(config.include_email));
    merged
}
