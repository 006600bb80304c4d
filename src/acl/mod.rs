//! Relationship-based membership permissions.
//!
//! Edit rights flow along relationship permission flags. A user may see and
//! edit a membership when the organization owning its type lies inside the
//! user's edit-permission closure.

pub mod error;
pub mod filter;
pub mod hooks;
pub mod ownership;
pub mod resolver;
pub mod store;
pub mod sync;

pub use error::{AclError, AclResult};
pub use filter::MembershipAccessFilter;
pub use hooks::{AclHooks, ContactTabView, EventOutcome, HostEvent};
pub use ownership::MembershipTypeOwnershipIndex;
pub use resolver::RelationshipGraphResolver;
pub use store::{AclStore, ConfigProvider, EdgeWrite, IdentityMap, MembershipStore, RelationshipStore};
pub use sync::{MembershipRelationshipSynchronizer, SyncOutcome, CONFIG_RELATIONSHIP_TYPE_NAME};
