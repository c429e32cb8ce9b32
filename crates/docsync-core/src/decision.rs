//! The per-file sync decision
//!
//! [`decide`] is a pure function of the two current versions and the
//! snapshot entry. Rules are evaluated in a fixed order and the first match
//! wins: presence rules (one side or neither side present) come before the
//! change rules, so that "present on both sides without an entry" is always
//! a conflict rather than an update.

use crate::snapshot::SnapshotEntry;
use docsync_fs::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the executor must do for one file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    /// Created on primary: copy primary to secondary
    NewOnPrimary,
    /// Created on secondary: copy secondary to primary
    NewOnSecondary,
    /// Deleted on secondary since last sync: delete on primary
    DeleteOnPrimary,
    /// Deleted on primary since last sync: delete on secondary
    DeleteOnSecondary,
    /// Deleted on both sides: drop the snapshot entry only
    ForgetOnly,
    /// Only primary changed: copy primary to secondary
    UpdatePrimaryToSecondary,
    /// Only secondary changed: copy secondary to primary
    UpdateSecondaryToPrimary,
    /// Both changed, or both exist without an entry: resolve
    Conflict,
    NoOp,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewOnPrimary => "new-on-primary",
            Self::NewOnSecondary => "new-on-secondary",
            Self::DeleteOnPrimary => "delete-on-primary",
            Self::DeleteOnSecondary => "delete-on-secondary",
            Self::ForgetOnly => "forget-only",
            Self::UpdatePrimaryToSecondary => "update-primary-to-secondary",
            Self::UpdateSecondaryToPrimary => "update-secondary-to-primary",
            Self::Conflict => "conflict",
            Self::NoOp => "no-op",
        }
    }

    /// True for every action except [`SyncAction::NoOp`].
    pub fn is_effectful(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide the sync action for one file.
///
/// `None` for a version means the file does not currently exist on that
/// side; `None` for the entry means the file was never synchronized.
pub fn decide(
    primary: Option<Version>,
    secondary: Option<Version>,
    entry: Option<SnapshotEntry>,
) -> SyncAction {
    match (primary, secondary, entry) {
        (Some(_), None, None) => SyncAction::NewOnPrimary,
        (None, Some(_), None) => SyncAction::NewOnSecondary,
        (Some(_), None, Some(_)) => SyncAction::DeleteOnPrimary,
        (None, Some(_), Some(_)) => SyncAction::DeleteOnSecondary,
        (None, None, Some(_)) => SyncAction::ForgetOnly,
        (Some(p), Some(s), Some(e)) if p != e.primary && s == e.secondary => {
            SyncAction::UpdatePrimaryToSecondary
        }
        (Some(p), Some(s), Some(e)) if s != e.secondary && p == e.primary => {
            SyncAction::UpdateSecondaryToPrimary
        }
        (Some(_), Some(_), None) => SyncAction::Conflict,
        (Some(p), Some(s), Some(e)) if p != e.primary && s != e.secondary => SyncAction::Conflict,
        _ => SyncAction::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const P: Option<Version> = Some(Version(100));
    const S: Option<Version> = Some(Version(200));
    const P2: Option<Version> = Some(Version(101));
    const S2: Option<Version> = Some(Version(201));

    fn synced() -> Option<SnapshotEntry> {
        Some(SnapshotEntry::new(Version(100), Version(200)))
    }

    #[rstest]
    #[case::new_on_primary(P, None, None, SyncAction::NewOnPrimary)]
    #[case::new_on_secondary(None, S, None, SyncAction::NewOnSecondary)]
    #[case::deleted_on_secondary(P, None, synced(), SyncAction::DeleteOnPrimary)]
    #[case::deleted_on_primary(None, S, synced(), SyncAction::DeleteOnSecondary)]
    #[case::deleted_on_both(None, None, synced(), SyncAction::ForgetOnly)]
    #[case::primary_changed(P2, S, synced(), SyncAction::UpdatePrimaryToSecondary)]
    #[case::secondary_changed(P, S2, synced(), SyncAction::UpdateSecondaryToPrimary)]
    #[case::both_changed(P2, S2, synced(), SyncAction::Conflict)]
    #[case::both_exist_never_synced(P, S, None, SyncAction::Conflict)]
    #[case::unchanged(P, S, synced(), SyncAction::NoOp)]
    #[case::never_existed(None, None, None, SyncAction::NoOp)]
    fn decision_table(
        #[case] primary: Option<Version>,
        #[case] secondary: Option<Version>,
        #[case] entry: Option<SnapshotEntry>,
        #[case] expected: SyncAction,
    ) {
        assert_eq!(decide(primary, secondary, entry), expected);
    }

    #[test]
    fn deleted_side_wins_over_modification_on_other_side() {
        // Edited on primary, deleted on secondary: the deletion propagates.
        assert_eq!(decide(P2, None, synced()), SyncAction::DeleteOnPrimary);
        assert_eq!(decide(None, S2, synced()), SyncAction::DeleteOnSecondary);
    }

    #[test]
    fn action_names_are_kebab_case() {
        assert_eq!(SyncAction::ForgetOnly.to_string(), "forget-only");
        assert_eq!(
            serde_json::to_string(&SyncAction::UpdatePrimaryToSecondary).unwrap(),
            "\"update-primary-to-secondary\""
        );
    }

    fn version() -> impl Strategy<Value = Option<Version>> {
        prop::option::of((0u64..4).prop_map(Version))
    }

    fn entry() -> impl Strategy<Value = Option<SnapshotEntry>> {
        prop::option::of(
            ((0u64..4), (0u64..4)).prop_map(|(p, s)| SnapshotEntry::new(Version(p), Version(s))),
        )
    }

    proptest! {
        #[test]
        fn both_present_without_entry_is_always_conflict(p in 0u64..10, s in 0u64..10) {
            prop_assert_eq!(
                decide(Some(Version(p)), Some(Version(s)), None),
                SyncAction::Conflict
            );
        }

        #[test]
        fn entry_matching_both_sides_is_noop(p in 0u64..10, s in 0u64..10) {
            let entry = SnapshotEntry::new(Version(p), Version(s));
            prop_assert_eq!(
                decide(Some(Version(p)), Some(Version(s)), Some(entry)),
                SyncAction::NoOp
            );
        }

        #[test]
        fn swapping_sides_mirrors_the_action(p in version(), s in version(), e in entry()) {
            let mirrored = e.map(|e| SnapshotEntry::new(e.secondary, e.primary));
            let expected = match decide(p, s, e) {
                SyncAction::NewOnPrimary => SyncAction::NewOnSecondary,
                SyncAction::NewOnSecondary => SyncAction::NewOnPrimary,
                SyncAction::DeleteOnPrimary => SyncAction::DeleteOnSecondary,
                SyncAction::DeleteOnSecondary => SyncAction::DeleteOnPrimary,
                SyncAction::UpdatePrimaryToSecondary => SyncAction::UpdateSecondaryToPrimary,
                SyncAction::UpdateSecondaryToPrimary => SyncAction::UpdatePrimaryToSecondary,
                other => other,
            };
            prop_assert_eq!(decide(s, p, mirrored), expected);
        }

        #[test]
        fn absent_everywhere_without_entry_is_noop(e in entry()) {
            let action = decide(None, None, e);
            if e.is_some() {
                prop_assert_eq!(action, SyncAction::ForgetOnly);
            } else {
                prop_assert_eq!(action, SyncAction::NoOp);
            }
        }
    }
}
