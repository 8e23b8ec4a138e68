//! Client-side proof-of-work search.

use hashmint_codec::{CodecResult, CollectionMessage, MineRequest, MiningState};
use hashmint_tree::BitTree;
use hashmint_types::{Address, TreeHash};
use rand::Rng;

use crate::mining::meets_threshold;

/// A mine body whose hash satisfies the threshold it was solved against.
#[derive(Clone, Debug)]
pub struct Solution {
    pub request: MineRequest,
    pub body: BitTree,
    pub hash: TreeHash,
    /// Bodies hashed, including the winning one.
    pub attempts: u64,
}

/// Random search over `data1` for a mine body below the threshold.
#[derive(Clone, Debug)]
pub struct Solver {
    mint_to: Address,
    expire: u32,
    query_id: u64,
    max_attempts: u64,
}

impl Solver {
    pub const DEFAULT_MAX_ATTEMPTS: u64 = 1 << 24;

    pub fn new(mint_to: Address, expire: u32) -> Self {
        Self {
            mint_to,
            expire,
            query_id: 0,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_query_id(mut self, query_id: u64) -> Self {
        self.query_id = query_id;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Search against `mining`'s current seed and threshold. `Ok(None)` when
    /// the attempt budget runs out.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        mining: &MiningState,
        rng: &mut R,
    ) -> CodecResult<Option<Solution>> {
        for attempt in 1..=self.max_attempts {
            let data1: [u8; 32] = rng.gen();
            let request = MineRequest::new(self.expire, self.mint_to, data1, mining.seed)
                .with_query_id(self.query_id);
            let body = CollectionMessage::Mine(request.clone()).encode()?;
            let hash = body.hash();
            if meets_threshold(&hash, &mining.threshold) {
                tracing::debug!(attempts = attempt, hash = %hash.short_hex(), "found solution");
                return Ok(Some(Solution {
                    request,
                    body,
                    hash,
                    attempts: attempt,
                }));
            }
        }
        tracing::debug!(attempts = self.max_attempts, "attempt budget exhausted");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::threshold_for_exponent;
    use num_bigint::BigUint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mining(threshold: BigUint) -> MiningState {
        MiningState {
            threshold,
            last_success: 0,
            seed: 0xfeed,
            target_interval: 60,
            min_exponent: 0,
            max_exponent: 255,
        }
    }

    #[test]
    fn finds_body_under_easy_threshold() {
        let mut rng = StdRng::seed_from_u64(7);
        let solver = Solver::new(Address::std(0, [3; 32]), 1_000).with_query_id(9);
        let solution = solver
            .solve(&mining(threshold_for_exponent(254)), &mut rng)
            .unwrap()
            .expect("easy threshold should be met");
        assert!(meets_threshold(&solution.hash, &threshold_for_exponent(254)));
        assert_eq!(solution.hash, solution.body.hash());
        assert_eq!(solution.request.seed, 0xfeed);
        assert_eq!(solution.request.query_id, 9);
        assert_eq!(
            CollectionMessage::decode(&solution.body).unwrap(),
            CollectionMessage::Mine(solution.request.clone())
        );
    }

    #[test]
    fn gives_up_when_budget_runs_out() {
        let mut rng = StdRng::seed_from_u64(7);
        let solver = Solver::new(Address::None, 1_000).with_max_attempts(16);
        let result = solver.solve(&mining(BigUint::from(0u8)), &mut rng).unwrap();
        assert!(result.is_none());
    }
}
