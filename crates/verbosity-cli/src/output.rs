//! Text and JSON rendering of accessor results.

use anyhow::Result;
use serde::Serialize;
use verbosity::types::{Chat, Org, User};

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_chats(chats: &[Chat]) {
    if chats.is_empty() {
        println!("No chats found");
        return;
    }
    for (i, chat) in chats.iter().enumerate() {
        if i > 0 {
            println!("---");
        }
        println!("Chat #{}:", i + 1);
        println!("  ID: {}", chat.id);
        println!("  Title: {}", chat.title);
        if !chat.description.is_empty() {
            println!("  Description: {}", chat.description);
        }
        println!("  Members: {}", chat.member_ids.len());
        println!("  Admins: {}", chat.admin_ids.len());
        println!("  Posts: {}", chat.posts_count);
        if let Some(org_id) = chat.organization_id {
            println!("  Organization ID: {org_id}");
        }
        println!("  Private: {}", chat.pm);
    }
}

pub fn print_orgs(orgs: &[Org]) {
    if orgs.is_empty() {
        println!("No organizations found");
        return;
    }
    for (i, org) in orgs.iter().enumerate() {
        if i > 0 {
            println!("---");
        }
        println!("Organization #{}:", i + 1);
        println!("  ID: {}", org.id);
        println!("  Slug: {}", org.slug);
        println!("  Title: {}", org.title);
        if !org.description.is_empty() {
            println!("  Description: {}", org.description);
        }
        println!("  Users: {}", org.users.len());
        println!("  Admins: {}", org.admins.len());
        println!("  Groups: {}", org.groups.len());
        if !org.email_domain.is_empty() {
            println!("  Email Domain: {}", org.email_domain);
        }
        println!("  Is Member: {}", org.is_member);
        println!("  Is Admin: {}", org.is_admin);
    }
}

pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found");
        return;
    }
    for (i, user) in users.iter().enumerate() {
        if i > 0 {
            println!("---");
        }
        println!("User #{}:", i + 1);
        println!("  ID: {}", user.id);
        println!("  Name: {}", user.name);
        println!("  Unique Name: {}", user.unique_name);
        println!("  Bot: {}", user.is_bot);
        println!("  Active: {}", user.active);
        if user.deleted {
            println!("  Deleted: true");
        }
        if !user.organizations.is_empty() {
            let ids: Vec<String> = user.organizations.iter().map(|id| id.to_string()).collect();
            println!("  Organizations: {}", ids.join(", "));
        }
    }
}
