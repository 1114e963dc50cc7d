//! Balance conservation property
//!
//! For any sequence of committed deposits and withdrawals, the account's
//! balance equals the sum its ledger entries imply and never goes negative.
//! Rejected withdrawals must leave no trace.

use std::str::FromStr;

use proptest::prelude::*;
use rust_decimal::Decimal;
use tempfile::TempDir;

use ledgerd_core::services::{CashOperation, CreateAccount};
use ledgerd_core::{Error, LedgerContext, PageRequest, TransactionFilters};

#[derive(Debug, Clone, Copy)]
enum Op {
    Deposit(i64),
    Withdraw(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Amounts in cents, 0.01 .. 100.00
    prop_oneof![
        (1i64..10_000).prop_map(Op::Deposit),
        (1i64..10_000).prop_map(Op::Withdraw),
    ]
}

proptest! {
    // Each case runs against a real database; keep the count modest.
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_balance_matches_ledger(ops in prop::collection::vec(op_strategy(), 1..12)) {
        let temp_dir = TempDir::new().unwrap();
        let ctx = LedgerContext::new(temp_dir.path()).unwrap();
        let user = ctx.register_user("Prop Tester", "prop@example.com").unwrap();
        let account_id = ctx.account_service.create(CreateAccount {
            user_id: user.id,
            name: "Property Account".to_string(),
            owner: "Prop Tester Legal".to_string(),
            currency: "TRY".to_string(),
        }).unwrap();

        let mut expected = Decimal::ZERO;
        for op in &ops {
            let (amount_cents, is_deposit) = match op {
                Op::Deposit(cents) => (*cents, true),
                Op::Withdraw(cents) => (*cents, false),
            };
            let amount = Decimal::new(amount_cents, 2);
            let request = CashOperation {
                user_id: user.id,
                account_id,
                user_email: user.email.clone(),
                user_name: user.name.clone(),
                amount: amount.to_string(),
            };

            if is_deposit {
                ctx.balance_service.credit(request).unwrap();
                expected += amount;
            } else if expected >= amount {
                ctx.balance_service.debit(request).unwrap();
                expected -= amount;
            } else {
                let result = ctx.balance_service.debit(request);
                prop_assert!(matches!(result, Err(Error::BalanceInsufficient)));
            }

            prop_assert!(expected >= Decimal::ZERO);
        }

        // The stored balance matches the model
        let balance = ctx.store
            .unit_of_work(|uow| {
                use ledgerd_core::ports::AccountRepository;
                uow.find_account(account_id)
            })
            .unwrap()
            .unwrap()
            .balance;
        prop_assert_eq!(balance, expected);

        // And the ledger implies the same number: deposits minus withdrawals
        let statement = ctx.statement_service.list(
            user.id,
            account_id,
            &PageRequest::new(1, 100),
            &TransactionFilters::default(),
        ).unwrap();
        let implied = statement.list.iter().fold(Decimal::ZERO, |acc, entry| {
            let amount = Decimal::from_str(&entry.amount).unwrap();
            match entry.kind.as_str() {
                "deposit" => acc + amount,
                "withdrawal" => acc - amount,
                other => panic!("unexpected entry kind {other}"),
            }
        });
        prop_assert_eq!(implied, expected);
    }
}
