//! Sun ledger gating every placement cost.

use lawn_defence_core::Sun;

/// Single non-negative sun balance with all-or-nothing spending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SunLedger {
    balance: Sun,
}

impl SunLedger {
    /// Creates a ledger holding the starting balance.
    #[must_use]
    pub const fn new(starting_balance: Sun) -> Self {
        Self {
            balance: starting_balance,
        }
    }

    /// Credits the ledger, saturating at the numeric bound.
    pub fn add(&mut self, amount: Sun) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Debits `amount` when the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    #[must_use]
    pub fn try_spend(&mut self, amount: Sun) -> bool {
        match self.balance.checked_sub(amount) {
            Some(remaining) => {
                self.balance = remaining;
                true
            }
            None => false,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> Sun {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_is_all_or_nothing() {
        let mut ledger = SunLedger::new(Sun::new(200));

        assert!(ledger.try_spend(Sun::new(150)));
        assert_eq!(ledger.balance(), Sun::new(50));

        assert!(!ledger.try_spend(Sun::new(100)));
        assert_eq!(ledger.balance(), Sun::new(50));
    }

    #[test]
    fn exact_balance_can_be_spent() {
        let mut ledger = SunLedger::new(Sun::new(75));
        assert!(ledger.try_spend(Sun::new(75)));
        assert_eq!(ledger.balance(), Sun::ZERO);
        assert!(ledger.try_spend(Sun::ZERO));
    }

    #[test]
    fn balance_never_underflows_across_mixed_sequences() {
        let mut ledger = SunLedger::new(Sun::ZERO);
        let mut expected: u64 = 0;
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;

        for _ in 0..500 {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let amount = ((state >> 40) % 120) as u32;
            if state & 1 == 0 {
                ledger.add(Sun::new(amount));
                expected += u64::from(amount);
            } else if ledger.try_spend(Sun::new(amount)) {
                expected -= u64::from(amount);
            } else {
                assert!(u64::from(amount) > expected);
            }
            assert_eq!(u64::from(ledger.balance().get()), expected);
        }
    }

    #[test]
    fn credits_saturate() {
        let mut ledger = SunLedger::new(Sun::new(u32::MAX - 5));
        ledger.add(Sun::new(25));
        assert_eq!(ledger.balance(), Sun::new(u32::MAX));
    }
}
