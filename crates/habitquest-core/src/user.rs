//! User domain model: identity, progression counters, and badges.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Avatars a profile may choose from; new users get the first one.
pub const AVATARS: [&str; 8] = ["🧙", "🧑‍🎤", "🧑‍🚀", "🧑‍🌾", "🧑‍💻", "🧑‍🎨", "🧑‍🔬", "🧑‍🚒"];

/// A permanent badge earned once its predicate became true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub key: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub earned_at: DateTime<Utc>,
    pub completed: bool,
}

/// An account with progression state.
///
/// Invariants: `xp < level * XP_PER_LEVEL` (maintained by the rollover in
/// [`crate::progression`]), `level >= 1` and never decreasing,
/// `achievements` append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Salted SHA-256, `"<salt-hex>$<digest-hex>"`. Absent for accounts
    /// created through an external identity provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub xp: u32,
    pub level: u32,
    pub gems: u32,
    /// Mission ids already redeemed. Grows monotonically and is never
    /// reset, so a collected mission stays collected.
    pub collected_missions: BTreeSet<String>,
    pub achievements: Vec<Achievement>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh level-1 account.
    pub fn new(email: &str, name: &str, password: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password.map(hash_password),
            avatar: None,
            about: None,
            xp: 0,
            level: 1,
            gems: 0,
            collected_missions: BTreeSet::new(),
            achievements: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_achievement(&self, key: &str) -> bool {
        self.achievements.iter().any(|a| a.key == key)
    }
}

/// Hash a password with a random 16-byte salt.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::thread_rng().gen();
    let digest = salted_digest(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

/// Verify a password against a stored `"<salt>$<digest>"` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    hex::encode(salted_digest(&salt, password)) == digest_hex
}

fn salted_digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
