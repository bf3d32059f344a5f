//! XP, level, and gem ledger.
//!
//! XP gains roll over into levels: the cost of leaving level `n` is
//! `n * XP_PER_LEVEL`, so a single large gain can cross several levels in
//! one call. Gems are a separate spendable currency.

use crate::error::{CoreError, Result};
use crate::user::User;

/// XP granted per habit check-in.
pub const XP_PER_CHECKIN: u32 = 10;
/// XP cost multiplier: leaving level `n` costs `n * XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u32 = 100;
/// Gem cost of one purchased level.
pub const GEMS_PER_UPGRADE: u32 = 20;

/// Add `amount` XP and resolve level rollover.
///
/// Post-condition: `user.xp < user.level * XP_PER_LEVEL`.
pub fn apply_xp_gain(user: &mut User, amount: u32) {
    user.xp += amount;
    while user.xp >= user.level * XP_PER_LEVEL {
        user.xp -= user.level * XP_PER_LEVEL;
        user.level += 1;
    }
}

/// Spend gems, failing without mutation when the balance is short.
pub fn spend_gems(user: &mut User, amount: u32) -> Result<()> {
    if user.gems < amount {
        return Err(CoreError::InsufficientGems {
            have: user.gems,
            need: amount,
        });
    }
    user.gems -= amount;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user_with(xp: u32, level: u32, gems: u32) -> User {
        let mut user = User::new("a@b.c", "Ada", None);
        user.xp = xp;
        user.level = level;
        user.gems = gems;
        user
    }

    #[test]
    fn single_level_rollover() {
        let mut user = user_with(95, 1, 0);
        apply_xp_gain(&mut user, 10);
        assert_eq!((user.xp, user.level), (5, 2));
    }

    #[test]
    fn multi_level_rollover() {
        // 95 + 250 = 345; leaving level 1 costs 100 -> 245 at level 2;
        // leaving level 2 costs 200 -> 45 at level 3.
        let mut user = user_with(95, 1, 0);
        apply_xp_gain(&mut user, 250);
        assert_eq!((user.xp, user.level), (45, 3));
    }

    #[test]
    fn gain_below_threshold_keeps_level() {
        let mut user = user_with(0, 1, 0);
        apply_xp_gain(&mut user, 99);
        assert_eq!((user.xp, user.level), (99, 1));
    }

    #[test]
    fn spend_gems_fails_without_mutation() {
        let mut user = user_with(0, 1, 15);
        let err = spend_gems(&mut user, 20).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientGems { have: 15, need: 20 }
        ));
        assert_eq!(user.gems, 15);
    }

    #[test]
    fn spend_gems_decrements_on_success() {
        let mut user = user_with(0, 1, 25);
        spend_gems(&mut user, GEMS_PER_UPGRADE).unwrap();
        assert_eq!(user.gems, 5);
    }

    proptest! {
        #[test]
        fn rollover_invariant_holds(start_xp in 0u32..100, gain in 0u32..10_000) {
            let mut user = user_with(start_xp, 1, 0);
            let level_before = user.level;
            apply_xp_gain(&mut user, gain);
            prop_assert!(user.xp < user.level * XP_PER_LEVEL);
            prop_assert!(user.level >= level_before);
        }
    }
}
