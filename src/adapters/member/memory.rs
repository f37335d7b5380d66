use crate::{
    domain::Member,
    ports::member::{Error, MemberPort},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct MemoryMemberDirectory {
    members: Arc<Mutex<HashMap<Uuid, Member>>>,
}

impl MemoryMemberDirectory {
    pub fn insert(&self, member: Member) -> Result<(), Error> {
        self.members.lock()?.insert(member.member_id, member);
        Ok(())
    }
}

#[async_trait::async_trait]
impl MemberPort for MemoryMemberDirectory {
    async fn get_member(&self, member_id: Uuid) -> Result<Member, Error> {
        self.members
            .lock()?
            .get(&member_id)
            .cloned()
            .ok_or(Error::MemberDoesNotExist(member_id))
    }
}
