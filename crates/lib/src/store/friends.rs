//! Friend links, invite codes and shared item interest

use serde::Serialize;

use super::{Store, StoreError};
use crate::record::ItemStatus;

/// Result of linking two users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendOutcome {
    /// At least one side was missing the link and now has it.
    Added,
    /// Both sides already listed each other; nothing changed.
    AlreadyFriends,
}

impl Store {
    /// Link two existing users in both directions.
    ///
    /// A one-sided link left by an earlier [`remove_friend`](Self::remove_friend)
    /// is repaired and reported as [`FriendOutcome::Added`].
    pub fn add_friend(&mut self, key: &str, friend: &str) -> crate::Result<FriendOutcome> {
        if key == friend {
            return Err(StoreError::SelfFriend {
                key: key.to_string(),
            }
            .into());
        }
        // Validate both sides before touching either.
        self.require(key)?;
        self.require(friend)?;

        let forward = self.require(key)?.friend_keys.insert(friend.to_string());
        let backward = self.require(friend)?.friend_keys.insert(key.to_string());

        if forward || backward {
            tracing::info!(user = %key, friend = %friend, "Linked friends");
            Ok(FriendOutcome::Added)
        } else {
            Ok(FriendOutcome::AlreadyFriends)
        }
    }

    /// Drop `friend` from `key`'s list only. The other side keeps its entry.
    ///
    /// Returns `false` if the link was not there or `key` does not exist.
    pub fn remove_friend(&mut self, key: &str, friend: &str) -> bool {
        let removed = self
            .get(key)
            .map(|record| record.friend_keys.remove(friend))
            .unwrap_or(false);
        if removed {
            tracing::info!(user = %key, friend = %friend, "Removed friend");
        }
        removed
    }

    /// Whether `key` lists `friend`.
    pub fn is_friend(&self, key: &str, friend: &str) -> bool {
        self.users
            .get(key)
            .is_some_and(|record| record.lists_friend(friend))
    }

    /// Keys in `key`'s friend list, sorted. Empty for unknown users.
    pub fn friends_of(&self, key: &str) -> Vec<String> {
        self.users
            .get(key)
            .map(|record| record.friend_keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Resolve an invite code to the single user that owns it.
    ///
    /// Codes are the last characters of a user key, so two users can collide.
    /// A collision is reported as [`StoreError::AmbiguousInviteCode`] rather
    /// than silently picking one.
    pub fn find_by_invite_code(&self, code: &str) -> crate::Result<String> {
        let code = code.trim();
        let mut matches: Vec<String> = self
            .users
            .iter()
            .filter(|(_, record)| !code.is_empty() && record.invite_code() == code)
            .map(|(key, _)| key.clone())
            .collect();

        match matches.len() {
            0 => Err(StoreError::InviteCodeNotFound {
                code: code.to_string(),
            }
            .into()),
            1 => Ok(matches.remove(0)),
            n => {
                tracing::warn!(code = %code, matches = n, "Invite code collision");
                Err(StoreError::AmbiguousInviteCode {
                    code: code.to_string(),
                    candidates: matches,
                }
                .into())
            }
        }
    }

    /// Befriend whoever owns `code`. Returns the friend's key and the outcome.
    pub fn accept_invite(&mut self, key: &str, code: &str) -> crate::Result<(String, FriendOutcome)> {
        let friend = self.find_by_invite_code(code)?;
        let outcome = self.add_friend(key, &friend)?;
        Ok((friend, outcome))
    }

    /// Friends of `key` that hold a positive status on `item_id`.
    ///
    /// Only mutual friends are considered, and only when both `key` and the
    /// friend share events. Results are sorted by friend key.
    pub fn friends_interested_in(&self, key: &str, item_id: &str) -> Vec<(String, ItemStatus)> {
        let Some(me) = self.users.get(key) else {
            return Vec::new();
        };
        if !me.shares_events() {
            return Vec::new();
        }

        me.friend_keys()
            .filter_map(|friend_key| {
                let friend = self.users.get(friend_key)?;
                if !friend.shares_events() || !friend.lists_friend(key) {
                    return None;
                }
                let status = friend.item_status(item_id).filter(ItemStatus::is_positive)?;
                Some((friend_key.to_string(), status))
            })
            .collect()
    }
}
