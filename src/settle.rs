//! Debt settlement: turn a pile of shared expenses into the short list of
//! "who pays whom" transfers that zeroes everyone's balance.

use std::collections::HashMap;

use crate::error::AppError;
use crate::models::expense::{Debt, Expense, SplitType};

/// Balances within a cent of zero count as settled.
const EPSILON: f64 = 0.01;

/// Caller-side tolerance for a custom split that does not quite add up.
pub const SPLIT_TOLERANCE: f64 = 0.1;

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reject a custom split whose shares drift more than [`SPLIT_TOLERANCE`]
/// from the expense amount. Run this before the expense ever reaches the
/// store; `settle` itself trusts its input.
pub fn validate_custom_splits(amount: f64, splits: &HashMap<String, f64>) -> Result<(), AppError> {
    let total: f64 = splits.values().sum();
    if (total - amount).abs() > SPLIT_TOLERANCE {
        return Err(AppError::Validation(format!(
            "custom splits add up to {total:.2}, expense amount is {amount:.2}"
        )));
    }
    Ok(())
}

/// Net balance per participant: positive means over-paid, negative means
/// owing. Payers outside the roster still accrue balance; validating the
/// roster is the caller's job.
pub fn balances(expenses: &[Expense], participants: &[String]) -> HashMap<String, f64> {
    let mut balances: HashMap<String, f64> = participants
        .iter()
        .map(|p| (p.clone(), 0.0))
        .collect();

    for expense in expenses {
        *balances.entry(expense.payer.clone()).or_insert(0.0) += expense.amount;

        match expense.split_type {
            SplitType::Even => {
                if participants.is_empty() {
                    continue;
                }
                let share = expense.amount / participants.len() as f64;
                for p in participants {
                    *balances.entry(p.clone()).or_insert(0.0) -= share;
                }
            }
            SplitType::Custom => {
                for (person, owed) in &expense.custom_splits {
                    *balances.entry(person.clone()).or_insert(0.0) -= owed;
                }
            }
        }
    }

    balances
}

/// Greedy minimal-transaction matching: most-negative debtor against the
/// largest creditor until one side runs out. Deterministic given the sort;
/// at most debtors + creditors - 1 transfers.
pub fn settle(expenses: &[Expense], participants: &[String]) -> Vec<Debt> {
    let balances = balances(expenses, participants);

    let mut debtors: Vec<(String, f64)> = Vec::new();
    let mut creditors: Vec<(String, f64)> = Vec::new();
    for (name, raw) in balances {
        let value = round_cents(raw);
        if value < -EPSILON {
            debtors.push((name, value));
        } else if value > EPSILON {
            creditors.push((name, value));
        }
    }

    debtors.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut debts = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let owed = debtors[i].1.abs().min(creditors[j].1);

        debts.push(Debt {
            from: debtors[i].0.clone(),
            to: creditors[j].0.clone(),
            amount: round_cents(owed),
        });

        debtors[i].1 += owed;
        creditors[j].1 -= owed;

        if debtors[i].1.abs() < EPSILON {
            i += 1;
        }
        if creditors[j].1 < EPSILON {
            j += 1;
        }
    }

    debts
}
