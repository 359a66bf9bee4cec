//! # Session — Household Members and the Acting Member
//!
//! One server instance serves one household. The [`Household`] holds its
//! members (ordered by creation) and remembers which member was last
//! selected as the acting one; [`SessionContext`] resolves that choice
//! for a single request, falling back to the first member when the
//! preference is unset or stale.
//!
//! Making the session explicit keeps every function that needs "who is
//! acting" honest about it — the acting member arrives as a parameter,
//! not as ambient global state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One household member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    /// CSS color used for the member's badge in the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color,
            created_at: Utc::now(),
        }
    }
}

/// The household: a stable instance id, its members in creation order,
/// and the last explicitly selected acting member.
#[derive(Serialize, Deserialize)]
pub struct Household {
    /// Identifies this installation; generated once and persisted.
    pub instance_id: Uuid,
    pub members: Vec<Member>,
    /// Last member the user picked. May reference a removed member, in
    /// which case resolution falls back to the first member.
    preferred_member: Option<Uuid>,
}

impl Default for Household {
    fn default() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            members: Vec::new(),
            preferred_member: None,
        }
    }
}

impl Household {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member and returns its id.
    pub fn add_member(&mut self, name: impl Into<String>, color: Option<String>) -> Uuid {
        let member = Member::new(name, color);
        let id = member.id;
        tracing::info!(member = %member.name, "household: member added");
        self.members.push(member);
        id
    }

    /// Removes a member. Clears the acting preference if it pointed at
    /// the removed member. Returns whether a member was removed.
    pub fn remove_member(&mut self, id: Uuid) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        let removed = self.members.len() != before;
        if removed && self.preferred_member == Some(id) {
            self.preferred_member = None;
        }
        removed
    }

    pub fn member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Records an explicit choice of acting member. Ignored if the id is
    /// not a current member.
    pub fn select_member(&mut self, id: Uuid) -> bool {
        if self.member(id).is_some() {
            self.preferred_member = Some(id);
            true
        } else {
            false
        }
    }

    /// Resolves the acting member: the explicit preference when it still
    /// exists, otherwise the first (oldest) member, otherwise `None`.
    pub fn active_member(&self) -> Option<&Member> {
        self.preferred_member
            .and_then(|id| self.member(id))
            .or_else(|| self.members.first())
    }
}

/// Per-request view of "who is acting now".
///
/// Built at the top of each handler from the household's resolved state;
/// everything downstream takes the member id from here.
#[derive(Clone, Copy, Debug)]
pub struct SessionContext {
    pub member_id: Option<Uuid>,
}

impl SessionContext {
    pub fn for_household(household: &Household) -> Self {
        Self {
            member_id: household.active_member().map(|m| m.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_member_defaults_to_first() {
        let mut hh = Household::new();
        let a = hh.add_member("אמא", None);
        hh.add_member("אבא", None);

        assert_eq!(hh.active_member().map(|m| m.id), Some(a));
    }

    #[test]
    fn explicit_selection_wins() {
        let mut hh = Household::new();
        hh.add_member("אמא", None);
        let b = hh.add_member("אבא", None);

        assert!(hh.select_member(b));
        assert_eq!(hh.active_member().map(|m| m.id), Some(b));
    }

    #[test]
    fn selecting_unknown_member_is_refused() {
        let mut hh = Household::new();
        hh.add_member("אמא", None);
        assert!(!hh.select_member(Uuid::new_v4()));
    }

    #[test]
    fn removing_preferred_member_falls_back_to_first() {
        let mut hh = Household::new();
        let a = hh.add_member("אמא", None);
        let b = hh.add_member("אבא", None);
        hh.select_member(b);

        assert!(hh.remove_member(b));
        assert_eq!(hh.active_member().map(|m| m.id), Some(a));
    }

    #[test]
    fn empty_household_has_no_acting_member() {
        let hh = Household::new();
        assert!(hh.active_member().is_none());
        assert!(SessionContext::for_household(&hh).member_id.is_none());
    }
}
