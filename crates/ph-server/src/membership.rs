use ph_core::{marker, ID};

/// Membership and ownership checks the edge needs before it will let a
/// command through. Club/membership CRUD is an external collaborator's
/// surface; this crate depends on nothing more than the two boolean
/// questions it actually asks, so any implementation — a direct query
/// against a club-membership table owned by that collaborator, or a call
/// into its API — satisfies the trait.
#[async_trait::async_trait]
pub trait MembershipGate: Send + Sync {
    async fn is_member(&self, club: ID<marker::Club>, user: ID<marker::User>) -> anyhow::Result<bool>;
    async fn is_owner(&self, club: ID<marker::Club>, user: ID<marker::User>) -> anyhow::Result<bool>;
}

/// Reads approval status from a `club_members(club_id, user_id, role)`
/// table that the membership service owns; this adapter only ever issues
/// read queries against it and never writes club/role data itself.
pub struct PgMembershipGate {
    client: std::sync::Arc<tokio_postgres::Client>,
}

impl PgMembershipGate {
    pub fn new(client: std::sync::Arc<tokio_postgres::Client>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MembershipGate for PgMembershipGate {
    async fn is_member(&self, club: ID<marker::Club>, user: ID<marker::User>) -> anyhow::Result<bool> {
        let row = self
            .client
            .query_opt(
                "SELECT 1 FROM club_members WHERE club_id = $1 AND user_id = $2 AND status = 'approved'",
                &[&club.inner(), &user.inner()],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn is_owner(&self, club: ID<marker::Club>, user: ID<marker::User>) -> anyhow::Result<bool> {
        let row = self
            .client
            .query_opt(
                "SELECT 1 FROM club_members WHERE club_id = $1 AND user_id = $2 AND role = 'owner'",
                &[&club.inner(), &user.inner()],
            )
            .await?;
        Ok(row.is_some())
    }
}

/// In-memory stand-in for tests and local tooling: every `(club, user)`
/// pair inserted is an approved member; owners are tracked separately.
#[derive(Default)]
pub struct OpenMembershipGate {
    members: std::sync::Mutex<std::collections::HashSet<(ID<marker::Club>, ID<marker::User>)>>,
    owners: std::sync::Mutex<std::collections::HashSet<(ID<marker::Club>, ID<marker::User>)>>,
}

impl OpenMembershipGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn approve(&self, club: ID<marker::Club>, user: ID<marker::User>) {
        self.members.lock().unwrap().insert((club, user));
    }

    pub fn own(&self, club: ID<marker::Club>, user: ID<marker::User>) {
        self.owners.lock().unwrap().insert((club, user));
        self.members.lock().unwrap().insert((club, user));
    }
}

#[async_trait::async_trait]
impl MembershipGate for OpenMembershipGate {
    async fn is_member(&self, club: ID<marker::Club>, user: ID<marker::User>) -> anyhow::Result<bool> {
        Ok(self.members.lock().unwrap().contains(&(club, user)))
    }

    async fn is_owner(&self, club: ID<marker::Club>, user: ID<marker::User>) -> anyhow::Result<bool> {
        Ok(self.owners.lock().unwrap().contains(&(club, user)))
    }
}
