//! Entry points for the host CRM.
//!
//! The host adapter turns each page render or save into a `HostEvent` and
//! hands it over together with the acting user's contact.

use std::collections::BTreeMap;

use super::error::{AclError, AclResult};
use super::filter::MembershipAccessFilter;
use super::store::AclStore;
use super::sync::{MembershipRelationshipSynchronizer, SyncOutcome};
use crate::models::{ActiveMembership, ContactId, Membership, MembershipId, MembershipRow};

/// What the contact membership tab is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactTabView {
    /// List of the contact's active memberships, keyed by membership ID.
    List(Option<BTreeMap<MembershipId, ActiveMembership>>),
    /// Edit form for a single membership.
    Edit { membership_id: MembershipId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ContactTab(ContactTabView),
    EditForm { membership_id: MembershipId },
    /// Membership search results; `None` before a search has run.
    Search(Option<Vec<MembershipRow>>),
    Dashboard(Option<Vec<MembershipRow>>),
    Save(Membership),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    ActiveMemberships(Option<BTreeMap<MembershipId, ActiveMembership>>),
    Rows(Option<Vec<MembershipRow>>),
    EditAllowed { membership_id: MembershipId },
    Synced(SyncOutcome),
}

pub struct AclHooks<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: AclStore + ?Sized> AclHooks<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Contact behind a host user account. A user without a contact cannot
    /// be checked for anything.
    pub fn resolve_user(&self, uf_id: i64) -> AclResult<ContactId> {
        self.store
            .contact_id_for_user(uf_id)?
            .ok_or(AclError::UnknownUser { uf_id })
    }

    /// Like `handle`, resolving the acting user's contact first. Saves do not
    /// depend on the user and skip the lookup.
    pub fn handle_for_user(&self, event: HostEvent, uf_id: i64) -> AclResult<EventOutcome> {
        match event {
            HostEvent::Save(membership) => self.on_save(&membership),
            event => {
                let user_contact_id = self.resolve_user(uf_id)?;
                self.handle(event, user_contact_id)
            }
        }
    }

    pub fn handle(&self, event: HostEvent, user_contact_id: ContactId) -> AclResult<EventOutcome> {
        let filter = MembershipAccessFilter::new(self.store);

        match event {
            HostEvent::ContactTab(ContactTabView::List(memberships)) => filter
                .filter_active_memberships(memberships, user_contact_id)
                .map(EventOutcome::ActiveMemberships),
            HostEvent::ContactTab(ContactTabView::Edit { membership_id })
            | HostEvent::EditForm { membership_id } => {
                filter.check_edit_permission(membership_id, user_contact_id)?;
                Ok(EventOutcome::EditAllowed { membership_id })
            }
            HostEvent::Search(rows) | HostEvent::Dashboard(rows) => filter
                .filter_memberships(rows, user_contact_id)
                .map(EventOutcome::Rows),
            HostEvent::Save(membership) => self.on_save(&membership),
        }
    }

    fn on_save(&self, membership: &Membership) -> AclResult<EventOutcome> {
        MembershipRelationshipSynchronizer::new(self.store)
            .sync_membership(membership)
            .map(EventOutcome::Synced)
    }
}
