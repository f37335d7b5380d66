use uuid::Uuid;

use super::Error;
use crate::{
    domain::{CustomRecipe, Role},
    ports::{
        database::{self, DatabasePort},
        member::MemberPort,
    },
};

/// Why the guard let a member through
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
    /// The member owns the custom recipe
    Owner,
    /// The member may act on any custom recipe
    Privileged,
}

impl Grant {
    /// Ownership check performed inside operation bodies, against the freshly loaded recipe
    pub fn ensure(self, user_id: Uuid, custom: &CustomRecipe) -> Result<(), Error> {
        match self {
            Grant::Privileged => Ok(()),
            Grant::Owner if custom.is_owned_by(user_id) => Ok(()),
            Grant::Owner => Err(Error::Forbidden),
        }
    }
}

/// Authorization guard for operations that mutate an existing custom recipe
///
/// Must run before the operation touches the store. Admins are always let through, other
/// members only for recipes they own.
pub async fn authorize<D, M>(
    database: &D,
    member: &M,
    user_id: Uuid,
    custom_id: Uuid,
) -> Result<Grant, Error>
where
    D: DatabasePort + ?Sized,
    M: MemberPort + ?Sized,
{
    let acting = member.get_member(user_id).await?;
    if acting.role == Role::Admin {
        return Ok(Grant::Privileged);
    }

    let custom = database
        .find_custom_by_id(custom_id)
        .await?
        .ok_or(database::Error::CustomDoesNotExist(custom_id))?;
    if !custom.is_owned_by(acting.member_id) {
        return Err(Error::Forbidden);
    }

    Ok(Grant::Owner)
}
