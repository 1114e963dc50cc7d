//! Concurrent ledger operation tests
//!
//! These tests verify that simultaneous operations against the same account
//! cannot drive a balance negative: the unit of work serializes the
//! read-check-write cycle, so the loser of a race re-reads the committed
//! balance and fails the business gate instead of double-spending.
//!
//! Run with: cargo test --test concurrent_transfer_test -- --nocapture

use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

use ledgerd_core::ports::AccountRepository;
use ledgerd_core::services::{CashOperation, CreateAccount, TransferMoney};
use ledgerd_core::{Error, LedgerContext, UserRecord};

fn create_test_context(temp_dir: &TempDir) -> Arc<LedgerContext> {
    Arc::new(LedgerContext::new(temp_dir.path()).expect("Failed to create ledger context"))
}

fn register_user(ctx: &LedgerContext, name: &str) -> UserRecord {
    ctx.register_user(name, &format!("{}@example.com", name.to_lowercase()))
        .unwrap()
}

fn open_funded_account(ctx: &LedgerContext, user: &UserRecord, name: &str, funds: &str) -> Uuid {
    let account_id = ctx
        .account_service
        .create(CreateAccount {
            user_id: user.id,
            name: name.to_string(),
            owner: format!("{} Legal", user.name),
            currency: "TRY".to_string(),
        })
        .unwrap();
    ctx.balance_service
        .credit(CashOperation {
            user_id: user.id,
            account_id,
            user_email: user.email.clone(),
            user_name: user.name.clone(),
            amount: funds.to_string(),
        })
        .unwrap();
    account_id
}

fn balance_of(ctx: &LedgerContext, account_id: Uuid) -> Decimal {
    ctx.store
        .unit_of_work(|uow| uow.find_account(account_id))
        .unwrap()
        .unwrap()
        .balance
}

/// Two simultaneous withdrawals of 60 against a balance of 100: exactly one
/// must succeed and the other must fail with BalanceInsufficient. The final
/// balance is 40, never negative.
#[test]
fn test_concurrent_withdrawals_cannot_overdraw() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let user = register_user(&ctx, "Jane");
    let account_id = open_funded_account(&ctx, &user, "Checking", "100");

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = vec![];

    for _ in 0..2 {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        let user = user.clone();

        handles.push(thread::spawn(move || {
            barrier.wait();
            ctx.balance_service.debit(CashOperation {
                user_id: user.id,
                account_id,
                user_email: user.email.clone(),
                user_name: user.name.clone(),
                amount: "60".to_string(),
            })
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let insufficient = results
        .iter()
        .filter(|r| matches!(r, Err(Error::BalanceInsufficient)))
        .count();

    assert_eq!(successes, 1, "exactly one withdrawal must win: {results:?}");
    assert_eq!(insufficient, 1, "the loser must fail the balance gate: {results:?}");
    assert_eq!(balance_of(&ctx, account_id), Decimal::new(40, 0));
}

/// Opposing transfers between one user's accounts hammered from several
/// threads: every attempt either commits fully or rolls back fully, so the
/// combined balance is conserved and neither account goes negative.
#[test]
fn test_concurrent_transfers_conserve_value() {
    const THREAD_COUNT: usize = 6;
    const ITERATIONS_PER_THREAD: usize = 5;

    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let user = register_user(&ctx, "Jane");
    let a = open_funded_account(&ctx, &user, "Checking", "100");
    let b = open_funded_account(&ctx, &user, "Savings", "100");

    let a_iban = ctx
        .store
        .unit_of_work(|uow| uow.find_account(a))
        .unwrap()
        .unwrap()
        .iban;
    let b_iban = ctx
        .store
        .unit_of_work(|uow| uow.find_account(b))
        .unwrap()
        .unwrap()
        .iban;

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mut handles = vec![];

    for thread_id in 0..THREAD_COUNT {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);
        let user = user.clone();
        // Even threads push A->B, odd threads push B->A
        let (from, to_iban) = if thread_id % 2 == 0 {
            (a, b_iban.clone())
        } else {
            (b, a_iban.clone())
        };
        let owner = format!("{} Legal", user.name);

        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut rejected = 0;
            for _ in 0..ITERATIONS_PER_THREAD {
                let result = ctx.transfer_service.transfer_money(TransferMoney {
                    user_id: user.id,
                    user_email: user.email.clone(),
                    user_name: user.name.clone(),
                    account_id: from,
                    amount: "35".to_string(),
                    to_iban: to_iban.clone(),
                    to_owner: owner.clone(),
                    description: "conservation stress".to_string(),
                });
                match result {
                    Ok(()) => {}
                    Err(Error::BalanceInsufficient) => rejected += 1,
                    Err(other) => panic!("unexpected transfer failure: {other}"),
                }
            }
            rejected
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let final_a = balance_of(&ctx, a);
    let final_b = balance_of(&ctx, b);

    // Same-user transfers are fee-free, so the pool never shrinks
    assert_eq!(final_a + final_b, Decimal::new(200, 0));
    assert!(final_a >= Decimal::ZERO, "account A went negative: {final_a}");
    assert!(final_b >= Decimal::ZERO, "account B went negative: {final_b}");
}
