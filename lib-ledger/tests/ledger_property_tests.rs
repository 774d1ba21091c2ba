//! Property tests: conservation and fee correctness over random operation
//! sequences.

use lib_ledger::{compute_fee, Address, Amount, LedgerEvent, TokenEngine, TokenMetadata, FEE_RATE_BPS};
use proptest::prelude::*;

const ADMIN: Address = Address::new([1u8; 32]);
const CONTRACT: Address = Address::new([2u8; 32]);
const TREASURY: Address = Address::new([3u8; 32]);

fn account(index: u8) -> Address {
    Address::new([10 + index; 32])
}

#[derive(Debug, Clone)]
enum Op {
    Mint { to: u8, amount: Amount },
    Transfer { from: u8, to: u8, amount: Amount },
    Burn { holder: u8, amount: Amount },
    TogglePause,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, 0u128..5_000_000).prop_map(|(to, amount)| Op::Mint { to, amount }),
        (0u8..4, 0u8..4, 0u128..2_000_000)
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        (0u8..4, 0u128..1_000_000).prop_map(|(holder, amount)| Op::Burn { holder, amount }),
        Just(Op::TogglePause),
    ]
}

fn deploy() -> TokenEngine {
    TokenEngine::new(
        ADMIN,
        CONTRACT,
        TokenMetadata::new("Carbon Credit", "CC", 18),
        1_000_000,
        TREASURY,
    )
    .unwrap()
}

proptest! {
    /// sum(balances) == total_supply after every operation, successful or not
    #[test]
    fn prop_supply_is_conserved(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut engine = deploy();

        for op in ops {
            let events_before = engine.events().len();
            let root_before = engine.ledger().state_root();

            let result = match op {
                Op::Mint { to, amount } => engine.mint(&ADMIN, &account(to), amount, "prop"),
                Op::Transfer { from, to, amount } => {
                    engine.transfer(&account(from), &account(to), amount).map(|_| ())
                }
                Op::Burn { holder, amount } => engine.burn(&account(holder), amount),
                Op::TogglePause => {
                    if engine.is_paused() {
                        engine.unpause(&ADMIN)
                    } else {
                        engine.pause(&ADMIN)
                    }
                }
            };

            if result.is_err() {
                prop_assert_eq!(engine.events().len(), events_before);
                prop_assert_eq!(engine.ledger().state_root(), root_before);
            }

            let sum = engine.ledger().sum_of_balances().unwrap();
            prop_assert_eq!(sum, engine.total_supply());
        }
    }

    /// Sender pays exactly `amount`; recipient gets `amount - fee`; treasury gets `fee`
    #[test]
    fn prop_transfer_fee_split(amount in 0u128..=1_000_000) {
        let mut engine = deploy();
        let recipient = account(1);

        let receipt = engine.transfer(&ADMIN, &recipient, amount).unwrap();
        let expected_fee = amount * 10 / 10_000;

        prop_assert_eq!(receipt.fee, expected_fee);
        prop_assert_eq!(receipt.fee, compute_fee(amount, FEE_RATE_BPS));
        prop_assert_eq!(engine.balance_of(&ADMIN), 1_000_000 - amount);
        prop_assert_eq!(engine.balance_of(&recipient), amount - expected_fee);
        prop_assert_eq!(engine.balance_of(&TREASURY), expected_fee);

        let fee_events = engine
            .events()
            .iter()
            .filter(|e| matches!(e, LedgerEvent::FeeCollected { .. }))
            .count();
        prop_assert_eq!(fee_events, usize::from(expected_fee > 0));
        if amount < 1_000 {
            prop_assert_eq!(receipt.fee, 0);
        }
    }

    #[test]
    fn prop_fee_never_exceeds_amount(amount in any::<u128>()) {
        let fee = compute_fee(amount, FEE_RATE_BPS);
        prop_assert!(fee <= amount);
        prop_assert_eq!(fee, amount / 1_000);
    }
}
