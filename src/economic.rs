//! Issuance schedule
//!
//! The subsidy halves once per `subsidy_halving_interval` blocks until
//! `tail_emission_halvings` halvings have happened, then stays flat. Issuance counts
//! from height 1 (the genesis output is unspendable) and stops exactly when the
//! running total reaches `max_money`: the block that crosses the cap is paid only
//! the remainder.

use crate::chain_params::ConsensusParams;
use crate::constants::{MAX_HALVINGS, MAX_MONEY};
use crate::types::*;
use tracing::trace;

/// GetBlockSubsidy: ℕ → ℤ
///
/// Block reward at `height` under `params`; never negative.
pub fn get_block_subsidy(height: Natural, params: &ConsensusParams) -> Amount {
    let scheduled = scheduled_subsidy(height, params);
    let remaining = params.max_money - issued_before(height, params);
    let subsidy = scheduled.min(remaining).max(0);

    trace!(height, subsidy, "block subsidy");
    debug_assert!(subsidy <= params.initial_subsidy);
    subsidy
}

/// TotalSupply: ℕ → ℤ
///
/// Coins issued by blocks `1..=height`; bounded by `max_money`.
pub fn total_supply(height: Natural, params: &ConsensusParams) -> Amount {
    capped(uncapped_issuance(height, params), params)
}

/// MoneyRange: `0 <= amount <= MAX_MONEY`
#[inline]
pub fn money_range(amount: Amount) -> bool {
    (0..=MAX_MONEY).contains(&amount)
}

/// Reward before the supply cap is applied
fn scheduled_subsidy(height: Natural, params: &ConsensusParams) -> Amount {
    // A zero interval never halves
    let halvings = height
        .checked_div(params.subsidy_halving_interval)
        .unwrap_or(0);
    if halvings >= MAX_HALVINGS {
        return 0;
    }
    params.initial_subsidy >> halvings.min(params.tail_emission_halvings)
}

/// Coins issued by blocks `1..height`
fn issued_before(height: Natural, params: &ConsensusParams) -> Amount {
    match height.checked_sub(1) {
        Some(last) => total_supply(last, params),
        None => 0,
    }
}

/// Sum of scheduled rewards over heights `1..=height`, era by era
fn uncapped_issuance(height: Natural, params: &ConsensusParams) -> u128 {
    if height == 0 {
        return 0;
    }
    let interval = params.subsidy_halving_interval;
    if interval == 0 {
        return reward(scheduled_subsidy(0, params)) * height as u128;
    }

    let mut total = 0u128;
    for era in 0..MAX_HALVINGS {
        let first = if era == 0 { 1 } else { interval.saturating_mul(era) };
        if first > height {
            break;
        }
        let last = interval
            .saturating_mul(era + 1)
            .saturating_sub(1)
            .min(height);
        if last >= first {
            let blocks = (last - first + 1) as u128;
            total += blocks * reward(scheduled_subsidy(first, params));
        }
    }
    total
}

fn reward(amount: Amount) -> u128 {
    u128::try_from(amount).unwrap_or(0)
}

fn capped(total: u128, params: &ConsensusParams) -> Amount {
    let cap = reward(params.max_money);
    total.min(cap) as Amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_params::{ChainParams, ChainType};
    use crate::constants::{COIN, INITIAL_SUBSIDY};

    fn main() -> &'static ConsensusParams {
        &ChainParams::for_chain(ChainType::Main).consensus
    }

    #[test]
    fn test_halving_steps() {
        let params = main();
        let interval = params.subsidy_halving_interval;
        assert_eq!(get_block_subsidy(1, params), INITIAL_SUBSIDY);
        assert_eq!(get_block_subsidy(interval - 1, params), INITIAL_SUBSIDY);
        assert_eq!(get_block_subsidy(interval, params), INITIAL_SUBSIDY / 2);
        assert_eq!(get_block_subsidy(3 * interval, params), INITIAL_SUBSIDY / 8);
    }

    #[test]
    fn test_tail_emission_floor() {
        let params = main();
        let interval = params.subsidy_halving_interval;
        let tail = INITIAL_SUBSIDY >> 7;
        assert_eq!(tail, 3_906_250_000);
        assert_eq!(get_block_subsidy(7 * interval, params), tail);
        assert_eq!(get_block_subsidy(10 * interval, params), tail);
    }

    #[test]
    fn test_issuance_stops_at_cap() {
        let params = main();
        // The cap is reached exactly by a full tail-emission reward
        let last = 21_953_727;
        assert!(total_supply(last - 1, params) < MAX_MONEY);
        assert_eq!(get_block_subsidy(last, params), INITIAL_SUBSIDY >> 7);
        assert_eq!(total_supply(last, params), MAX_MONEY);
        assert_eq!(get_block_subsidy(last + 1, params), 0);
        assert_eq!(get_block_subsidy(64 * params.subsidy_halving_interval, params), 0);
    }

    #[test]
    fn test_total_supply_matches_running_sum() {
        let params = &ChainParams::for_chain(ChainType::Regtest).consensus;
        let mut sum = 0;
        for height in 1..=20_000 {
            sum += get_block_subsidy(height, params);
            assert_eq!(total_supply(height, params), sum);
        }
    }

    #[test]
    fn test_zero_interval_never_halves() {
        let params = ConsensusParams {
            subsidy_halving_interval: 0,
            ..*main()
        };
        assert_eq!(total_supply(10, &params), 10 * INITIAL_SUBSIDY);
        assert_eq!(get_block_subsidy(1_000_000, &params), INITIAL_SUBSIDY);

        // Flat issuance fills the cap after max_money / initial_subsidy blocks
        let last = (MAX_MONEY / INITIAL_SUBSIDY) as Natural;
        assert_eq!(last, 2_200_000);
        assert_eq!(get_block_subsidy(last, &params), INITIAL_SUBSIDY);
        assert_eq!(total_supply(last, &params), MAX_MONEY);
        assert_eq!(get_block_subsidy(last + 1, &params), 0);
        assert_eq!(get_block_subsidy(5_000_000, &params), 0);
    }

    #[test]
    fn test_money_range() {
        assert!(money_range(0));
        assert!(money_range(MAX_MONEY));
        assert!(!money_range(MAX_MONEY + 1));
        assert!(!money_range(-COIN));
    }
}
