// Leader/follower role tracking for a single order replica. The election
// protocol itself (descending-id probing, retry budget) lives at the
// front-end (§4.3); a replica only ever reacts to being told who's leader,
// either by a broadcast or by whatever a sync peer already believes.

use bourse_wire::ReplicaId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Boot state: no leader has been announced yet.
    UnknownLeader,
    Follower(ReplicaId),
    Leader,
}

#[derive(Debug)]
pub struct ReplicaRole {
    id: ReplicaId,
    role: Role,
}

impl ReplicaRole {
    pub fn new(id: ReplicaId) -> Self {
        ReplicaRole { id, role: Role::UnknownLeader }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_leader(&self) -> bool {
        matches!(self.role, Role::Leader)
    }

    /// `POST /leader-broadcast`: unconditionally adopts the announced
    /// leader, overriding anything previously known — a fresh election
    /// always wins over a stale belief.
    pub fn on_leader_broadcast(&mut self, leader_id: ReplicaId) {
        self.role = if leader_id == self.id { Role::Leader } else { Role::Follower(leader_id) };
    }

    /// A sync peer's response names its own leader. Only adopted while
    /// this replica hasn't heard a broadcast of its own yet, so a
    /// boot-time catch-up can't undo an election already in progress.
    pub fn adopt_sync_leader(&mut self, leader_id: ReplicaId) {
        if matches!(self.role, Role::UnknownLeader) {
            self.on_leader_broadcast(leader_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn broadcast_of_self_becomes_leader() {
        let mut role = ReplicaRole::new(ReplicaId(2));
        role.on_leader_broadcast(ReplicaId(2));
        assert!(role.is_leader());
    }

    #[test]
    fn broadcast_of_other_becomes_follower() {
        let mut role = ReplicaRole::new(ReplicaId(1));
        role.on_leader_broadcast(ReplicaId(3));
        assert_eq!(role.role(), Role::Follower(ReplicaId(3)));
        assert!(!role.is_leader());
    }

    #[test]
    fn sync_leader_ignored_once_broadcast_has_set_a_role() {
        let mut role = ReplicaRole::new(ReplicaId(1));
        role.on_leader_broadcast(ReplicaId(1));
        role.adopt_sync_leader(ReplicaId(3));
        assert!(role.is_leader());
    }

    #[test]
    fn sync_leader_adopted_when_unknown() {
        let mut role = ReplicaRole::new(ReplicaId(1));
        role.adopt_sync_leader(ReplicaId(3));
        assert_eq!(role.role(), Role::Follower(ReplicaId(3)));
    }
}
