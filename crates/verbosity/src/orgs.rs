//! Organization accessors, mirroring the chat module's two-step listing and
//! derived views.

use serde::Serialize;

use crate::{
    chats::take_top_by,
    errors::Error,
    types::{Org, OrgSyncResponse, OrgsResponse},
    users::join_ids,
    Client, Result,
};

/// Per-organization statistics derived from a single fetched record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrgStats {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub users_count: usize,
    pub admins_count: usize,
    pub groups_count: usize,
    pub guests_count: usize,
    pub is_member: bool,
    pub is_admin: bool,
    pub state: String,
    pub email_domain: String,
    pub default_chat_id: i64,
}

impl Client {
    /// Fetch all available organization ids.
    ///
    /// `GET /core/org/sync`
    pub async fn organization_ids(&self) -> Result<Vec<i64>> {
        let resp: OrgSyncResponse = self.get("/core/org/sync", &[]).await?;
        Ok(resp.ids)
    }

    /// Fetch organizations by id in a single batched request.
    ///
    /// `GET /core/org?ids=11,12,15`
    pub async fn organizations_by_ids(&self, ids: &[i64]) -> Result<Vec<Org>> {
        if ids.is_empty() {
            return Err(Error::InvalidArgument("ids must not be empty".to_string()));
        }
        let resp: OrgsResponse = self.get("/core/org", &[("ids", join_ids(ids))]).await?;
        Ok(resp.orgs)
    }

    /// Fetch a single organization by id.
    pub async fn organization_by_id(&self, id: i64) -> Result<Org> {
        let orgs = self.organizations_by_ids(&[id]).await?;
        orgs.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("organization with id {id}")))
    }

    /// Fetch every organization; an empty id sync short-circuits the detail
    /// fetch.
    pub async fn all_organizations(&self) -> Result<Vec<Org>> {
        let ids = self.organization_ids().await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.organizations_by_ids(&ids).await
    }

    /// Organizations where the calling bot is a member.
    pub async fn my_organizations(&self) -> Result<Vec<Org>> {
        let orgs = self.all_organizations().await?;
        Ok(orgs.into_iter().filter(|o| o.is_member).collect())
    }

    /// Organizations where the calling bot is an admin.
    pub async fn admin_organizations(&self) -> Result<Vec<Org>> {
        let orgs = self.all_organizations().await?;
        Ok(orgs.into_iter().filter(|o| o.is_admin).collect())
    }

    /// First organization whose title matches exactly, in server order.
    pub async fn find_organization_by_title(&self, title: &str) -> Result<Org> {
        let orgs = self.all_organizations().await?;
        orgs.into_iter()
            .find(|o| o.title == title)
            .ok_or_else(|| Error::NotFound(format!("organization with title {title:?}")))
    }

    /// First organization whose slug matches exactly, in server order.
    pub async fn find_organization_by_slug(&self, slug: &str) -> Result<Org> {
        let orgs = self.all_organizations().await?;
        orgs.into_iter()
            .find(|o| o.slug == slug)
            .ok_or_else(|| Error::NotFound(format!("organization with slug {slug:?}")))
    }

    /// Member ids of an organization, in server order.
    pub async fn organization_members(&self, org_id: i64) -> Result<Vec<i64>> {
        Ok(self.organization_by_id(org_id).await?.users)
    }

    /// Admin ids of an organization, in server order.
    pub async fn organization_admins(&self, org_id: i64) -> Result<Vec<i64>> {
        Ok(self.organization_by_id(org_id).await?.admins)
    }

    pub async fn is_organization_member(&self, org_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.organization_members(org_id).await?.contains(&user_id))
    }

    pub async fn is_organization_admin(&self, org_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.organization_admins(org_id).await?.contains(&user_id))
    }

    /// Organizations ranked by user count, descending, with the same
    /// stable-sort and limit contract as the chat rankings.
    pub async fn top_organizations_by_users(&self, limit: usize) -> Result<Vec<Org>> {
        let orgs = self.all_organizations().await?;
        Ok(take_top_by(orgs, limit, |o| o.users.len()))
    }

    /// Statistics derived from one fetched organization.
    pub async fn organization_stats(&self, org_id: i64) -> Result<OrgStats> {
        let org = self.organization_by_id(org_id).await?;
        Ok(OrgStats {
            id: org.id,
            slug: org.slug,
            title: org.title,
            users_count: org.users.len(),
            admins_count: org.admins.len(),
            groups_count: org.groups.len(),
            guests_count: org.guests.len(),
            is_member: org.is_member,
            is_admin: org.is_admin,
            state: org.state,
            email_domain: org.email_domain,
            default_chat_id: org.default_chat_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(id: i64, users: usize) -> Org {
        Org {
            id,
            users: (0..users as i64).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn top_by_users_is_stable_on_ties() {
        let orgs = vec![org(1, 2), org(2, 8), org(3, 8), org(4, 5)];
        let top = take_top_by(orgs, 3, |o| o.users.len());
        assert_eq!(top.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn org_stats_serializes_with_fixed_key_set() {
        let stats = OrgStats {
            id: 1,
            slug: "acme".to_string(),
            title: "Acme".to_string(),
            users_count: 10,
            admins_count: 2,
            groups_count: 1,
            guests_count: 0,
            is_member: true,
            is_admin: false,
            state: "active".to_string(),
            email_domain: "acme.io".to_string(),
            default_chat_id: 77,
        };
        let value = serde_json::to_value(&stats).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        let mut expected = vec![
            "id",
            "slug",
            "title",
            "users_count",
            "admins_count",
            "groups_count",
            "guests_count",
            "is_member",
            "is_admin",
            "state",
            "email_domain",
            "default_chat_id",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }
}
