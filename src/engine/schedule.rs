// ==========================================
// Realty Ledger - Payment Schedule Builder
// ==========================================
// Expands a sale's deal terms into the ordered installment list.
// Pure and deterministic: manual entry and batch import both go
// through this one function, so the two paths cannot drift.
//
// Also hosts the edit-time reconciliation: rebuilding a schedule
// diffs old vs. new by (kind, installment number) and preserves
// payment history for installments that did not change, instead of
// destroying it wholesale.
// ==========================================

use crate::domain::{
    BalloonTerms, DealTerms, DownPayment, InstallmentKind, InstallmentStatus, PaymentInstallment,
};
use chrono::{Months, NaiveDate};

/// Amounts closer than this are considered unchanged during
/// reconciliation.
const AMOUNT_TOLERANCE: f64 = 0.005;

// ==========================================
// InstallmentDraft - not yet persisted
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentDraft {
    pub kind: InstallmentKind,
    pub installment_no: Option<u32>,
    pub amount: f64,
    pub expected_date: Option<NaiveDate>,
}

/// Expand deal terms into the ordered installment list.
///
/// - signal: one entry at the sale date, when the amount is > 0
/// - lump down payment: one entry at the sale date
/// - split down payment: per group, `count` entries with contiguous
///   1-based numbering across groups, due sale date + N months
/// - balloons (confirmed only): per group, contiguous numbering,
///   due (first down-payment due date, else sale date) + N months
///
/// Zero-amount or zero-count groups are silently skipped.
pub fn build_schedule(sale_date: NaiveDate, terms: &DealTerms) -> Vec<InstallmentDraft> {
    let mut drafts = Vec::new();

    if let Some(signal) = terms.signal {
        if signal > 0.0 {
            drafts.push(InstallmentDraft {
                kind: InstallmentKind::Signal,
                installment_no: None,
                amount: signal,
                expected_date: Some(sale_date),
            });
        }
    }

    match &terms.down_payment {
        DownPayment::None => {}
        DownPayment::Lump { amount } => {
            if *amount > 0.0 {
                drafts.push(InstallmentDraft {
                    kind: InstallmentKind::DownPayment,
                    installment_no: None,
                    amount: *amount,
                    expected_date: Some(sale_date),
                });
            }
        }
        DownPayment::Installments { groups } => {
            let mut index = 0u32;
            for group in groups {
                if group.count == 0 || group.amount <= 0.0 {
                    continue;
                }
                for _ in 0..group.count {
                    index += 1;
                    drafts.push(InstallmentDraft {
                        kind: InstallmentKind::DownPaymentInstallment,
                        installment_no: Some(index),
                        amount: group.amount,
                        expected_date: Some(add_months(sale_date, index)),
                    });
                }
            }
        }
    }

    if let BalloonTerms::Confirmed { groups } = &terms.balloon {
        // Balloons anchor on the first down-payment due date; a sale
        // with no down payment anchors on the sale date itself.
        let anchor = drafts
            .iter()
            .find(|d| {
                matches!(
                    d.kind,
                    InstallmentKind::DownPayment | InstallmentKind::DownPaymentInstallment
                )
            })
            .and_then(|d| d.expected_date)
            .unwrap_or(sale_date);

        let mut index = 0u32;
        for group in groups {
            if group.count == 0 || group.amount <= 0.0 {
                continue;
            }
            for _ in 0..group.count {
                index += 1;
                drafts.push(InstallmentDraft {
                    kind: InstallmentKind::Balloon,
                    installment_no: Some(index),
                    amount: group.amount,
                    expected_date: Some(add_months(anchor, index)),
                });
            }
        }
    }

    drafts
}

/// Calendar months forward, clamping to the last day of shorter
/// months. The overflow fallback is unreachable for sale dates in
/// the accepted 1900-2100 window.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

// ==========================================
// Schedule reconciliation on edit
// ==========================================

#[derive(Debug, Clone)]
pub struct ReconciledSchedule {
    /// The new schedule, with payment history carried over where
    /// kind, index and amount are unchanged.
    pub installments: Vec<PaymentInstallment>,
    /// Previously paid installments whose slot changed or vanished
    /// in the new schedule; flagged for manual review instead of
    /// being silently dropped.
    pub needs_review: Vec<PaymentInstallment>,
}

/// Carry paid status, paid date and any manual commission override
/// from `old` onto matching entries of `new`.
pub fn reconcile_schedule(
    old: &[PaymentInstallment],
    mut new: Vec<PaymentInstallment>,
) -> ReconciledSchedule {
    let mut carried: Vec<(InstallmentKind, Option<u32>)> = Vec::new();

    for installment in &mut new {
        let matched = old.iter().find(|o| {
            o.kind == installment.kind
                && o.installment_no == installment.installment_no
                && (o.amount - installment.amount).abs() <= AMOUNT_TOLERANCE
        });
        if let Some(previous) = matched {
            if previous.status == InstallmentStatus::Paid {
                installment.status = InstallmentStatus::Paid;
                installment.paid_date = previous.paid_date;
                installment.paid_commission_override = previous.paid_commission_override;
            }
            carried.push((previous.kind, previous.installment_no));
        }
    }

    let needs_review = old
        .iter()
        .filter(|o| {
            o.status == InstallmentStatus::Paid
                && !carried
                    .iter()
                    .any(|(kind, no)| *kind == o.kind && *no == o.installment_no)
        })
        .cloned()
        .collect();

    ReconciledSchedule {
        installments: new,
        needs_review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BalloonTerms, DownPayment, InstallmentGroup};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(
        signal: Option<f64>,
        down_payment: DownPayment,
        balloon: BalloonTerms,
    ) -> DealTerms {
        DealTerms {
            signal,
            down_payment,
            balloon,
        }
    }

    #[test]
    fn test_signal_plus_installments() {
        let drafts = build_schedule(
            date(2024, 3, 15),
            &terms(
                Some(10_000.0),
                DownPayment::Installments {
                    groups: vec![InstallmentGroup {
                        count: 3,
                        amount: 1_000.0,
                    }],
                },
                BalloonTerms::None,
            ),
        );

        assert_eq!(drafts.len(), 4);
        assert_eq!(drafts[0].kind, InstallmentKind::Signal);
        assert_eq!(drafts[0].expected_date, Some(date(2024, 3, 15)));

        assert_eq!(drafts[1].installment_no, Some(1));
        assert_eq!(drafts[1].expected_date, Some(date(2024, 4, 15)));
        assert_eq!(drafts[2].expected_date, Some(date(2024, 5, 15)));
        assert_eq!(drafts[3].expected_date, Some(date(2024, 6, 15)));
    }

    #[test]
    fn test_contiguous_numbering_across_groups() {
        let drafts = build_schedule(
            date(2024, 1, 10),
            &terms(
                None,
                DownPayment::Installments {
                    groups: vec![
                        InstallmentGroup {
                            count: 2,
                            amount: 1_000.0,
                        },
                        InstallmentGroup {
                            count: 0, // skipped
                            amount: 500.0,
                        },
                        InstallmentGroup {
                            count: 2,
                            amount: 2_000.0,
                        },
                    ],
                },
                BalloonTerms::None,
            ),
        );

        let numbers: Vec<_> = drafts.iter().map(|d| d.installment_no).collect();
        assert_eq!(
            numbers,
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
        assert_eq!(drafts[2].amount, 2_000.0);
        assert_eq!(drafts[3].expected_date, Some(date(2024, 5, 10)));
    }

    #[test]
    fn test_balloon_anchors_on_first_down_payment_due_date() {
        let drafts = build_schedule(
            date(2024, 1, 10),
            &terms(
                None,
                DownPayment::Installments {
                    groups: vec![InstallmentGroup {
                        count: 2,
                        amount: 1_000.0,
                    }],
                },
                BalloonTerms::Confirmed {
                    groups: vec![InstallmentGroup {
                        count: 2,
                        amount: 20_000.0,
                    }],
                },
            ),
        );

        // Anchor is 2024-02-10 (first down-payment due date).
        let balloons: Vec<_> = drafts
            .iter()
            .filter(|d| d.kind == InstallmentKind::Balloon)
            .collect();
        assert_eq!(balloons.len(), 2);
        assert_eq!(balloons[0].expected_date, Some(date(2024, 3, 10)));
        assert_eq!(balloons[1].expected_date, Some(date(2024, 4, 10)));
    }

    #[test]
    fn test_balloon_without_down_payment_anchors_on_sale_date() {
        let drafts = build_schedule(
            date(2024, 1, 10),
            &terms(
                Some(5_000.0),
                DownPayment::None,
                BalloonTerms::Confirmed {
                    groups: vec![InstallmentGroup {
                        count: 1,
                        amount: 30_000.0,
                    }],
                },
            ),
        );

        let balloon = drafts
            .iter()
            .find(|d| d.kind == InstallmentKind::Balloon)
            .unwrap();
        assert_eq!(balloon.expected_date, Some(date(2024, 2, 10)));
    }

    #[test]
    fn test_pending_balloon_emits_nothing() {
        let drafts = build_schedule(
            date(2024, 1, 10),
            &terms(None, DownPayment::Lump { amount: 500.0 }, BalloonTerms::Pending),
        );
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, InstallmentKind::DownPayment);
    }

    #[test]
    fn test_month_end_clamping() {
        let drafts = build_schedule(
            date(2024, 1, 31),
            &terms(
                None,
                DownPayment::Installments {
                    groups: vec![InstallmentGroup {
                        count: 1,
                        amount: 1_000.0,
                    }],
                },
                BalloonTerms::None,
            ),
        );
        // 2024 is a leap year.
        assert_eq!(drafts[0].expected_date, Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_idempotence() {
        let t = terms(
            Some(10_000.0),
            DownPayment::Installments {
                groups: vec![InstallmentGroup {
                    count: 6,
                    amount: 1_500.0,
                }],
            },
            BalloonTerms::Confirmed {
                groups: vec![InstallmentGroup {
                    count: 2,
                    amount: 25_000.0,
                }],
            },
        );
        let first = build_schedule(date(2024, 3, 15), &t);
        let second = build_schedule(date(2024, 3, 15), &t);
        assert_eq!(first, second);
    }

    // ===== Reconciliation =====

    fn installment(
        kind: InstallmentKind,
        no: Option<u32>,
        amount: f64,
        status: InstallmentStatus,
    ) -> PaymentInstallment {
        PaymentInstallment {
            id: format!("{}-{:?}", kind, no),
            sale_id: "s1".to_string(),
            kind,
            installment_no: no,
            amount,
            expected_date: Some(date(2024, 4, 15)),
            commission_amount: amount * 0.04,
            status,
            paid_date: (status == InstallmentStatus::Paid).then(|| date(2024, 4, 20)),
            paid_commission_override: None,
        }
    }

    #[test]
    fn test_reconcile_preserves_unchanged_paid_installments() {
        let old = vec![
            installment(InstallmentKind::Signal, None, 10_000.0, InstallmentStatus::Paid),
            installment(
                InstallmentKind::DownPaymentInstallment,
                Some(1),
                1_000.0,
                InstallmentStatus::Pending,
            ),
        ];
        let new = vec![
            installment(InstallmentKind::Signal, None, 10_000.0, InstallmentStatus::Pending),
            installment(
                InstallmentKind::DownPaymentInstallment,
                Some(1),
                1_000.0,
                InstallmentStatus::Pending,
            ),
        ];

        let reconciled = reconcile_schedule(&old, new);
        assert_eq!(reconciled.installments[0].status, InstallmentStatus::Paid);
        assert_eq!(
            reconciled.installments[0].paid_date,
            Some(date(2024, 4, 20))
        );
        assert!(reconciled.needs_review.is_empty());
    }

    #[test]
    fn test_reconcile_flags_changed_paid_installments() {
        let old = vec![installment(
            InstallmentKind::DownPaymentInstallment,
            Some(1),
            1_000.0,
            InstallmentStatus::Paid,
        )];
        // Amount changed: the paid history cannot be carried over.
        let new = vec![installment(
            InstallmentKind::DownPaymentInstallment,
            Some(1),
            1_500.0,
            InstallmentStatus::Pending,
        )];

        let reconciled = reconcile_schedule(&old, new);
        assert_eq!(reconciled.installments[0].status, InstallmentStatus::Pending);
        assert_eq!(reconciled.needs_review.len(), 1);
        assert_eq!(reconciled.needs_review[0].amount, 1_000.0);
    }

    #[test]
    fn test_reconcile_flags_removed_paid_installments() {
        let old = vec![
            installment(InstallmentKind::Balloon, Some(1), 20_000.0, InstallmentStatus::Paid),
        ];
        let reconciled = reconcile_schedule(&old, vec![]);
        assert!(reconciled.installments.is_empty());
        assert_eq!(reconciled.needs_review.len(), 1);
    }
}
