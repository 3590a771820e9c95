//! User accessors: batched lookups by id or unique name.

use crate::{
    errors::Error,
    types::{User, UsersResponse},
    Client, Result,
};

pub(crate) fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl Client {
    /// Fetch users by id in a single batched request.
    ///
    /// `GET /core/user?ids=11,12,15`
    pub async fn users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Err(Error::InvalidArgument("ids must not be empty".to_string()));
        }
        let resp: UsersResponse = self
            .get("/core/user", &[("ids", join_ids(ids))])
            .await?;
        Ok(resp.users)
    }

    /// Fetch users by unique name in a single batched request.
    ///
    /// `GET /core/user?unames=user0,user1`
    pub async fn users_by_unique_names(&self, names: &[String]) -> Result<Vec<User>> {
        if names.is_empty() {
            return Err(Error::InvalidArgument(
                "unique names must not be empty".to_string(),
            ));
        }
        let resp: UsersResponse = self
            .get("/core/user", &[("unames", names.join(","))])
            .await?;
        Ok(resp.users)
    }

    /// Fetch a single user by id.
    pub async fn user_by_id(&self, id: i64) -> Result<User> {
        let users = self.users_by_ids(&[id]).await?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("user with id {id}")))
    }

    /// Fetch a single user by unique name.
    pub async fn user_by_unique_name(&self, name: &str) -> Result<User> {
        let users = self.users_by_unique_names(&[name.to_string()]).await?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("user with unique_name {name}")))
    }
}
