//! Chat accessors: listing, derived views, top-N rankings and statistics.
//!
//! Listing is two-step: `/core/chat/sync` yields the id set, `/core/chat`
//! the full records. Derived views fetch the full list and filter locally;
//! the upstream API has no server-side filtering.

use serde::Serialize;

use crate::{
    errors::Error,
    types::{Chat, ChatSyncResponse, ChatsResponse},
    users::join_ids,
    Client, Result,
};

/// Per-chat statistics derived from a single fetched record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatStats {
    pub id: i64,
    pub title: String,
    pub posts_count: i64,
    pub members_count: usize,
    pub admins_count: usize,
    pub is_private: bool,
    pub read_only: bool,
    pub is_favorite: bool,
}

/// Stable descending sort by `key`, then truncate to `limit`.
///
/// Ties keep their original relative order. `limit == 0` or
/// `limit >= items.len()` returns the full sorted collection.
pub(crate) fn take_top_by<T, K, F>(mut items: Vec<T>, limit: usize, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    if limit > 0 && limit < items.len() {
        items.truncate(limit);
    }
    items
}

impl Client {
    /// Fetch all available chat ids.
    ///
    /// `GET /core/chat/sync`
    pub async fn chat_ids(&self) -> Result<Vec<i64>> {
        let resp: ChatSyncResponse = self.get("/core/chat/sync", &[]).await?;
        Ok(resp.chats)
    }

    /// Fetch chats by id in a single batched request.
    ///
    /// `GET /core/chat?ids=11,12,15`
    pub async fn chats_by_ids(&self, ids: &[i64]) -> Result<Vec<Chat>> {
        if ids.is_empty() {
            return Err(Error::InvalidArgument("ids must not be empty".to_string()));
        }
        let resp: ChatsResponse = self.get("/core/chat", &[("ids", join_ids(ids))]).await?;
        Ok(resp.chats)
    }

    /// Fetch a single chat by id.
    pub async fn chat_by_id(&self, id: i64) -> Result<Chat> {
        let chats = self.chats_by_ids(&[id]).await?;
        chats
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("chat with id {id}")))
    }

    /// Fetch every chat: the id sync first, then one batched detail fetch.
    /// An empty id set short-circuits without the second call.
    pub async fn all_chats(&self) -> Result<Vec<Chat>> {
        let ids = self.chat_ids().await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.chats_by_ids(&ids).await
    }

    /// Get or create the private chat with a user.
    ///
    /// `POST /core/chat/pm/{user_id}`
    pub async fn get_or_create_private_chat(&self, user_id: i64) -> Result<Chat> {
        self.post_empty(&format!("/core/chat/pm/{user_id}")).await
    }

    /// All chats where `user_id` appears in the member list. With the bot's
    /// own user id this yields the bot's chats.
    pub async fn user_chats(&self, user_id: i64) -> Result<Vec<Chat>> {
        let chats = self.all_chats().await?;
        Ok(chats
            .into_iter()
            .filter(|c| c.member_ids.contains(&user_id))
            .collect())
    }

    /// Chats flagged as favorite.
    pub async fn favorite_chats(&self) -> Result<Vec<Chat>> {
        let chats = self.all_chats().await?;
        Ok(chats.into_iter().filter(|c| c.is_favorite).collect())
    }

    /// Private (person-to-person) chats.
    pub async fn private_chats(&self) -> Result<Vec<Chat>> {
        let chats = self.all_chats().await?;
        Ok(chats.into_iter().filter(|c| c.pm).collect())
    }

    /// Non-private chats.
    pub async fn public_chats(&self) -> Result<Vec<Chat>> {
        let chats = self.all_chats().await?;
        Ok(chats.into_iter().filter(|c| !c.pm).collect())
    }

    /// Chats owned by an organization.
    pub async fn organization_chats(&self, org_id: i64) -> Result<Vec<Chat>> {
        let chats = self.all_chats().await?;
        Ok(chats
            .into_iter()
            .filter(|c| c.organization_id == Some(org_id))
            .collect())
    }

    /// Chats ranked by member count, descending. Ties keep server order;
    /// `limit == 0` or `limit >= len` returns the full sorted list.
    pub async fn top_chats_by_members(&self, limit: usize) -> Result<Vec<Chat>> {
        let chats = self.all_chats().await?;
        Ok(take_top_by(chats, limit, |c| c.member_ids.len()))
    }

    /// Chats ranked by post count, descending.
    pub async fn top_chats_by_posts(&self, limit: usize) -> Result<Vec<Chat>> {
        let chats = self.all_chats().await?;
        Ok(take_top_by(chats, limit, |c| c.posts_count))
    }

    /// First chat whose title matches exactly, in server order.
    pub async fn find_chat_by_title(&self, title: &str) -> Result<Chat> {
        let chats = self.all_chats().await?;
        chats
            .into_iter()
            .find(|c| c.title == title)
            .ok_or_else(|| Error::NotFound(format!("chat with title {title:?}")))
    }

    /// Member ids of a chat, in server order.
    pub async fn chat_member_ids(&self, chat_id: i64) -> Result<Vec<i64>> {
        Ok(self.chat_by_id(chat_id).await?.member_ids)
    }

    /// Admin ids of a chat, in server order.
    pub async fn chat_admin_ids(&self, chat_id: i64) -> Result<Vec<i64>> {
        Ok(self.chat_by_id(chat_id).await?.admin_ids)
    }

    pub async fn is_chat_member(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.chat_member_ids(chat_id).await?.contains(&user_id))
    }

    pub async fn is_chat_admin(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.chat_admin_ids(chat_id).await?.contains(&user_id))
    }

    /// Statistics derived from one fetched chat.
    pub async fn chat_stats(&self, chat_id: i64) -> Result<ChatStats> {
        let chat = self.chat_by_id(chat_id).await?;
        Ok(ChatStats {
            id: chat.id,
            title: chat.title,
            posts_count: chat.posts_count,
            members_count: chat.member_ids.len(),
            admins_count: chat.admin_ids.len(),
            is_private: chat.pm,
            read_only: chat.read_only,
            is_favorite: chat.is_favorite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(id: i64, members: usize, posts: i64) -> Chat {
        Chat {
            id,
            member_ids: (0..members as i64).collect(),
            posts_count: posts,
            ..Default::default()
        }
    }

    #[test]
    fn top_by_members_is_stable_on_ties() {
        // Member counts [3, 5, 5, 1]: the two fives keep their relative order.
        let chats = vec![chat(1, 3, 0), chat(2, 5, 0), chat(3, 5, 0), chat(4, 1, 0)];
        let top = take_top_by(chats, 2, |c| c.member_ids.len());
        assert_eq!(top.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn zero_and_oversized_limits_return_full_sorted_list() {
        let chats = vec![chat(1, 3, 0), chat(2, 5, 0), chat(3, 1, 0)];
        let all = take_top_by(chats.clone(), 0, |c| c.member_ids.len());
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 1, 3]);

        let all = take_top_by(chats, 10, |c| c.member_ids.len());
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, 2);
    }

    #[test]
    fn top_by_posts_uses_post_count() {
        let chats = vec![chat(1, 0, 10), chat(2, 0, 30), chat(3, 0, 20)];
        let top = take_top_by(chats, 2, |c| c.posts_count);
        assert_eq!(top.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn chat_stats_serializes_with_fixed_key_set() {
        let stats = ChatStats {
            id: 9,
            title: "dev".to_string(),
            posts_count: 4,
            members_count: 3,
            admins_count: 1,
            is_private: false,
            read_only: false,
            is_favorite: true,
        };
        let value = serde_json::to_value(&stats).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        let mut expected = vec![
            "id",
            "title",
            "posts_count",
            "members_count",
            "admins_count",
            "is_private",
            "read_only",
            "is_favorite",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }
}
