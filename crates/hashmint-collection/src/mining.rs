//! Proof-of-work minting and difficulty rescaling.
//!
//! A mine is accepted when the body hash, read as a big-endian 256-bit
//! integer, is strictly below the stored threshold. A larger threshold
//! means easier mining. The threshold only moves through
//! [`rescale`], which doubles it once mining has been idle for
//! [`RESCALE_IDLE_FACTOR`] target intervals.

use hashmint_codec::{CollectionConfig, MineRequest, MiningState};
use hashmint_tree::TreeHasher;
use hashmint_types::TreeHash;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{ExecutionResult, ProtocolError};
use crate::handle::{CollectionHandle, Context};
use crate::process::{Effect, OutboundMessage, Transition};

/// Idle time before a rescale is allowed, in target intervals.
pub const RESCALE_IDLE_FACTOR: u64 = 16;

/// Key-derivation context for replacement seeds.
pub const SEED_CONTEXT: &str = "hashmint seed v1";

/// `2^exponent`.
pub fn threshold_for_exponent(exponent: u8) -> BigUint {
    BigUint::one() << u32::from(exponent)
}

/// Mean number of uniformly random bodies tried before one hashes below
/// `threshold`. `None` when no body can succeed.
pub fn expected_attempts(threshold: &BigUint) -> Option<BigUint> {
    if threshold.is_zero() {
        return None;
    }
    let space = BigUint::one() << 256u32;
    Some((space + threshold - 1u8) / threshold)
}

/// Whether `hash` satisfies `threshold`.
pub fn meets_threshold(hash: &TreeHash, threshold: &BigUint) -> bool {
    hash.is_below(threshold)
}

/// Seed that replaces `previous` after the body hashing to `body_hash` is
/// accepted.
pub fn next_seed(body_hash: &TreeHash, previous: u128) -> u128 {
    let derived = TreeHasher::derive(
        SEED_CONTEXT,
        &[body_hash.as_bytes().as_slice(), previous.to_be_bytes().as_slice()],
    );
    let mut head = [0u8; 16];
    head.copy_from_slice(&derived[..16]);
    u128::from_be_bytes(head)
}

/// Check a mine request in order: expiry, seed, then proof of work.
pub fn check_mine(
    mining: &MiningState,
    request: &MineRequest,
    body_hash: &TreeHash,
    now: u32,
) -> Result<(), ProtocolError> {
    if now > request.expire {
        return Err(ProtocolError::Expired {
            expire: request.expire,
            reference: now,
        });
    }
    if request.seed != mining.seed {
        return Err(ProtocolError::SeedMismatch {
            expected: mining.seed,
            provided: request.seed,
        });
    }
    if !meets_threshold(body_hash, &mining.threshold) {
        return Err(ProtocolError::ProofOfWorkNotSatisfied { hash: *body_hash });
    }
    Ok(())
}

/// Seconds until a rescale becomes possible; zero once it is.
pub fn cooldown_remaining(mining: &MiningState, now: u32) -> u64 {
    let required = RESCALE_IDLE_FACTOR * u64::from(mining.target_interval);
    let elapsed = u64::from(now).saturating_sub(u64::from(mining.last_success));
    required.saturating_sub(elapsed)
}

/// Check a rescale request.
///
/// A rescale whose `expire` is not after the last success was signed
/// before that success and is stale.
pub fn check_rescale(mining: &MiningState, expire: u32, now: u32) -> Result<(), ProtocolError> {
    if expire <= mining.last_success {
        return Err(ProtocolError::Expired {
            expire,
            reference: mining.last_success,
        });
    }
    let remaining = cooldown_remaining(mining, now);
    if remaining > 0 {
        return Err(ProtocolError::RescaleCooldownActive { remaining });
    }
    Ok(())
}

/// `2 × threshold`, held within `[2^min_exponent, 2^max_exponent]`. The
/// upper bound wins if the bounds are inverted.
///
/// Never below the current threshold: at the ceiling the threshold stays
/// put, and one already above the ceiling is not pulled down.
pub fn rescaled_threshold(mining: &MiningState) -> BigUint {
    let doubled = &mining.threshold << 1u32;
    let floor = threshold_for_exponent(mining.min_exponent);
    let ceiling = threshold_for_exponent(mining.max_exponent);
    doubled.max(floor).min(ceiling).max(mining.threshold.clone())
}

/// Accept a mine: deploy the item, advance the index and replace the seed.
pub(crate) fn mine(
    handle: &CollectionHandle,
    state: &CollectionConfig,
    ctx: &Context,
    request: &MineRequest,
    body_hash: &TreeHash,
) -> ExecutionResult<Transition> {
    check_mine(&state.mining, request, body_hash, ctx.now)?;

    let index = state.next_item_index;
    let next_index = index
        .checked_add(1)
        .ok_or(ProtocolError::IndexExhausted)?;
    let state_init = handle.item_state_init(&state.item_template_code, index)?;
    let item = handle.item_address_for(&state_init);

    let mut next = state.clone();
    next.next_item_index = next_index;
    next.mining.last_success = ctx.now;
    next.mining.seed = next_seed(body_hash, state.mining.seed);

    tracing::info!(
        index,
        item = %item.short_id(),
        owner = %request.mint_to.short_id(),
        hash = %body_hash.short_hex(),
        "mined item"
    );

    Ok(Transition::new(
        next,
        Effect::Minted {
            index,
            item,
            owner: request.mint_to,
        },
    )
    .with_outbound(OutboundMessage::DeployItem {
        index,
        address: item,
        owner: request.mint_to,
        state_init,
    }))
}

/// Accept a rescale: double the threshold and restart the idle window.
pub(crate) fn rescale(
    state: &CollectionConfig,
    ctx: &Context,
    expire: u32,
) -> ExecutionResult<Transition> {
    check_rescale(&state.mining, expire, ctx.now)?;

    let previous = state.mining.threshold.clone();
    let threshold = rescaled_threshold(&state.mining);

    let mut next = state.clone();
    next.mining.threshold = threshold.clone();
    next.mining.last_success = ctx.now;

    tracing::info!(
        previous_bits = previous.bits(),
        threshold_bits = threshold.bits(),
        "rescaled mining threshold"
    );

    Ok(Transition::new(
        next,
        Effect::Rescaled {
            previous,
            threshold,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashmint_types::Address;

    fn mining(threshold: BigUint) -> MiningState {
        MiningState {
            threshold,
            last_success: 1_000,
            seed: 42,
            target_interval: 60,
            min_exponent: 8,
            max_exponent: 16,
        }
    }

    fn request(expire: u32, seed: u128) -> MineRequest {
        MineRequest::new(expire, Address::std(0, [1; 32]), [2; 32], seed)
    }

    fn hash_of(value: u64) -> TreeHash {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        TreeHash::from_hash(bytes)
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(meets_threshold(&hash_of(99), &BigUint::from(100u32)));
        assert!(!meets_threshold(&hash_of(100), &BigUint::from(100u32)));
    }

    #[test]
    fn mine_checks_expiry_first() {
        let state = mining(BigUint::zero());
        let err = check_mine(&state, &request(10, 7), &hash_of(1), 11).unwrap_err();
        assert!(matches!(err, ProtocolError::Expired { .. }));
        assert_eq!(err.exit_code(), 24);
    }

    #[test]
    fn mine_accepts_at_expiry_instant() {
        let state = mining(BigUint::from(2u8));
        assert!(check_mine(&state, &request(10, 42), &hash_of(1), 10).is_ok());
    }

    #[test]
    fn mine_checks_seed_before_work() {
        let state = mining(BigUint::zero());
        let err = check_mine(&state, &request(10, 7), &hash_of(1), 5).unwrap_err();
        assert!(matches!(err, ProtocolError::SeedMismatch { .. }));
    }

    #[test]
    fn mine_rejects_hash_at_threshold() {
        let state = mining(BigUint::from(5u8));
        let err = check_mine(&state, &request(10, 42), &hash_of(5), 5).unwrap_err();
        assert!(matches!(err, ProtocolError::ProofOfWorkNotSatisfied { .. }));
    }

    #[test]
    fn next_seed_depends_on_hash_and_previous() {
        let a = next_seed(&hash_of(1), 5);
        assert_eq!(a, next_seed(&hash_of(1), 5));
        assert_ne!(a, next_seed(&hash_of(2), 5));
        assert_ne!(a, next_seed(&hash_of(1), 6));
    }

    #[test]
    fn cooldown_boundary() {
        let state = mining(threshold_for_exponent(10));
        let open_at = 1_000 + 16 * 60;
        assert_eq!(cooldown_remaining(&state, open_at), 0);
        assert_eq!(cooldown_remaining(&state, open_at - 1), 1);
        assert_eq!(
            check_rescale(&state, open_at, open_at - 1).unwrap_err(),
            ProtocolError::RescaleCooldownActive { remaining: 1 }
        );
        assert!(check_rescale(&state, open_at, open_at).is_ok());
    }

    #[test]
    fn cooldown_saturates_when_clock_is_behind() {
        let state = mining(threshold_for_exponent(10));
        assert_eq!(cooldown_remaining(&state, 0), 16 * 60);
    }

    #[test]
    fn stale_rescale_is_expired() {
        let state = mining(threshold_for_exponent(10));
        let err = check_rescale(&state, 1_000, 10_000).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Expired {
                expire: 1_000,
                reference: 1_000
            }
        );
    }

    #[test]
    fn rescale_doubles_within_bounds() {
        assert_eq!(
            rescaled_threshold(&mining(threshold_for_exponent(10))),
            threshold_for_exponent(11)
        );
        assert_eq!(
            rescaled_threshold(&mining(BigUint::from(3u8))),
            threshold_for_exponent(8)
        );
        assert_eq!(
            rescaled_threshold(&mining(threshold_for_exponent(16))),
            threshold_for_exponent(16)
        );
    }

    #[test]
    fn ceiling_rescale_keeps_threshold() {
        let at_cap = mining(threshold_for_exponent(16));
        assert_eq!(rescaled_threshold(&at_cap), threshold_for_exponent(16));

        let just_below = mining(threshold_for_exponent(16) - 1u8);
        assert_eq!(rescaled_threshold(&just_below), threshold_for_exponent(16));
    }

    #[test]
    fn threshold_above_ceiling_is_not_lowered() {
        let above = mining(threshold_for_exponent(20));
        assert_eq!(rescaled_threshold(&above), threshold_for_exponent(20));
    }

    #[test]
    fn inverted_bounds_favor_ceiling() {
        let mut state = mining(threshold_for_exponent(10));
        state.min_exponent = 20;
        state.max_exponent = 12;
        assert_eq!(rescaled_threshold(&state), threshold_for_exponent(12));
    }

    #[test]
    fn expected_attempts_scale_with_difficulty() {
        assert_eq!(expected_attempts(&BigUint::zero()), None);
        assert_eq!(
            expected_attempts(&threshold_for_exponent(255)),
            Some(BigUint::from(2u8))
        );
        assert_eq!(
            expected_attempts(&threshold_for_exponent(240)),
            Some(threshold_for_exponent(16))
        );
    }
}
