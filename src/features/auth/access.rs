//! Object-level ownership rules.
//!
//! A category belongs to its `user_id`; a transaction belongs to whoever owns
//! its category. Admins and staff may act on any object.

use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::Category;
use crate::features::transactions::models::Transaction;

/// Something a user may or may not be allowed to touch
pub enum OwnedResource<'a> {
    Category(&'a Category),
    Transaction(&'a Transaction),
}

impl OwnedResource<'_> {
    pub fn owner_id(&self) -> Uuid {
        match self {
            OwnedResource::Category(category) => category.user_id,
            OwnedResource::Transaction(transaction) => transaction.owner_id,
        }
    }
}

pub fn can_access(actor: &AuthenticatedUser, resource: OwnedResource<'_>) -> bool {
    actor.has_admin_access() || resource.owner_id() == actor.user_id
}
