// ===============================
// src/valuator.rs
// ===============================
//
// Batch valuation: fan-out per bond (request -> transport -> parser),
// fan-in in input order.
//
// - Concurrency dibatasi `max_concurrency` (buffer_unordered).
// - Fail-fast: error pertama menggagalkan seluruh batch; request lain
//   yang masih in-flight di-drop.
// - Satu target date untuk seluruh batch.
//
use chrono::Local;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::accrual::max_published_date;
use crate::domain::{BatchResult, Bond, BondValue, MonthYear};
use crate::error::ValuationError;
use crate::gateway::Transport;
use crate::metrics::{BATCH_BONDS, VALUATIONS};
use crate::parser;
use crate::request::build_request_body;

pub struct BatchValuator<T> {
    transport: T,
    max_concurrency: usize,
}

impl<T: Transport> BatchValuator<T> {
    pub fn new(transport: T, max_concurrency: usize) -> Self {
        Self {
            transport,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Value every bond as of `target`, or the latest published accrual date
    /// when no target is given.
    pub async fn valuate(
        &self,
        bonds: &[Bond],
        target: Option<MonthYear>,
    ) -> Result<BatchResult, ValuationError> {
        let target = target.unwrap_or_else(|| max_published_date(Local::now().date_naive()));
        self.valuate_as_of(bonds, target).await
    }

    pub async fn valuate_as_of(
        &self,
        bonds: &[Bond],
        target: MonthYear,
    ) -> Result<BatchResult, ValuationError> {
        BATCH_BONDS.set(bonds.len() as i64);

        let mut slots: Vec<Option<BondValue>> = (0..bonds.len()).map(|_| None).collect();
        let mut pending = std::pin::pin!(stream::iter(bonds.iter().enumerate())
            .map(move |(idx, bond)| async move { (idx, self.valuate_bond(bond, target).await) })
            .buffer_unordered(self.max_concurrency));

        while let Some((idx, outcome)) = pending.next().await {
            slots[idx] = Some(outcome?);
        }

        let bond_values: Vec<BondValue> = slots.into_iter().flatten().collect();
        info!(bonds = bond_values.len(), values_as_of = %target, "batch valuated");
        Ok(BatchResult {
            values_as_of: target,
            bond_values,
        })
    }

    /// Single bond pipeline.
    pub async fn valuate_bond(
        &self,
        bond: &Bond,
        target: MonthYear,
    ) -> Result<BondValue, ValuationError> {
        let body = build_request_body(bond, target);
        debug!(serial = %bond.serial_number, %target, "submitting SBCPrice");

        let outcome = match self.transport.submit(body).await {
            Ok(html) => parser::parse(&html),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(_) => VALUATIONS.with_label_values(&["ok"]).inc(),
            Err(e) => {
                let kind = e.kind().label();
                VALUATIONS.with_label_values(&[kind]).inc();
                warn!(serial = %bond.serial_number, kind, status = ?e.status(), error = %e, "bond valuation failed");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Series;
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    enum Reply {
        Value(&'static str),
        Reject(&'static str),
        Unavailable,
    }

    /// Scripted calculator: replies per serial number after a delay.
    struct Scripted {
        replies: HashMap<String, (u64, Reply)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: &[(&str, u64, Reply)]) -> Self {
            Self {
                replies: replies
                    .iter()
                    .map(|(s, ms, r)| (s.to_string(), (*ms, r.clone())))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Transport for Scripted {
        async fn submit(&self, body: String) -> Result<String, ValuationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let serial = body
                .split('&')
                .find_map(|kv| kv.strip_prefix("SerialNumber="))
                .unwrap_or_default()
                .to_string();
            let (delay, reply) = self.replies.get(&serial).cloned().expect("scripted serial");
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match reply {
                Reply::Value(value) => Ok(success_html(&serial, value)),
                Reply::Reject(msg) => Ok(format!(
                    r#"<div class="errormessage"><ul><li>{msg}</li><li>second</li></ul></div>"#
                )),
                Reply::Unavailable => Err(ValuationError::Transport {
                    status: Some(503),
                    message: "HTTP 503".into(),
                }),
            }
        }
    }

    fn success_html(serial: &str, value: &str) -> String {
        let cells = [
            serial, "EE", "$100", "01/2010", "07/2024", "01/2040", "$50.00", "$10.00", "2.70%",
            value, "", "",
        ];
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!(r#"<table class="bnddata"><tr>{tds}</tr></table>"#)
    }

    fn bond(serial: &str) -> Bond {
        Bond {
            series: Series::EE,
            denomination: 100,
            serial_number: serial.to_string(),
            issue_date: MonthYear::new(2010, 1).unwrap(),
        }
    }

    fn target() -> MonthYear {
        MonthYear::new(2024, 5).unwrap()
    }

    #[tokio::test]
    async fn results_follow_input_order_not_completion_order() {
        // C finishes first, then A, then B
        let transport = Scripted::new(&[
            ("A", 40, Reply::Value("$61.00")),
            ("B", 80, Reply::Value("$62.00")),
            ("C", 5, Reply::Value("$63.00")),
        ]);
        let valuator = BatchValuator::new(transport, 8);
        let batch = valuator
            .valuate(&[bond("A"), bond("B"), bond("C")], Some(target()))
            .await
            .unwrap();

        let serials: Vec<_> = batch.bond_values.iter().map(|b| b.serial_number.as_str()).collect();
        assert_eq!(serials, ["A", "B", "C"]);
        assert_eq!(batch.values_as_of, target());
        assert_eq!(batch.total_value(), dec!(186.00));
    }

    #[tokio::test]
    async fn one_rejection_fails_the_whole_batch() {
        let transport = Scripted::new(&[
            ("A", 5, Reply::Value("$61.00")),
            ("B", 5, Reply::Reject("Invalid serial number")),
            ("C", 5, Reply::Value("$63.00")),
        ]);
        let valuator = BatchValuator::new(transport, 8);
        let err = valuator
            .valuate(&[bond("A"), bond("B"), bond("C")], Some(target()))
            .await
            .unwrap_err();

        match err {
            ValuationError::Rejected { message } => assert_eq!(message, "Invalid serial number"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_propagates_with_its_kind() {
        let transport = Scripted::new(&[("A", 1, Reply::Unavailable)]);
        let valuator = BatchValuator::new(transport, 1);
        let err = valuator.valuate(&[bond("A")], Some(target())).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn first_failure_returns_without_waiting_for_stragglers() {
        let transport = Scripted::new(&[
            ("slow", 5_000, Reply::Value("$61.00")),
            ("bad", 5, Reply::Reject("nope")),
        ]);
        let valuator = BatchValuator::new(transport, 4);
        let started = std::time::Instant::now();
        let err = valuator
            .valuate(&[bond("slow"), bond("bad")], Some(target()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainRejection);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn in_flight_requests_never_exceed_the_cap() {
        let serials: Vec<String> = (0..10).map(|i| format!("S{i}")).collect();
        let script: Vec<(&str, u64, Reply)> =
            serials.iter().map(|s| (s.as_str(), 10, Reply::Value("$60.00"))).collect();
        let valuator = BatchValuator::new(Scripted::new(&script), 3);

        let bonds: Vec<Bond> = serials.iter().map(|s| bond(s)).collect();
        let batch = valuator.valuate(&bonds, Some(target())).await.unwrap();

        assert_eq!(batch.bond_values.len(), 10);
        assert_eq!(valuator.transport.calls.load(Ordering::SeqCst), 10);
        assert!(valuator.transport.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn missing_target_uses_latest_published_date() {
        let valuator = BatchValuator::new(Scripted::new(&[("A", 1, Reply::Value("$61.00"))]), 2);
        let batch = valuator.valuate(&[bond("A")], None).await.unwrap();
        assert_eq!(batch.values_as_of, max_published_date(Local::now().date_naive()));
    }

    #[tokio::test]
    async fn empty_batch_is_empty_result() {
        let valuator = BatchValuator::new(Scripted::new(&[]), 2);
        let batch = valuator.valuate(&[], Some(target())).await.unwrap();
        assert!(batch.bond_values.is_empty());
        assert_eq!(batch.total_value(), rust_decimal::Decimal::ZERO);
    }

    #[tokio::test]
    async fn single_bond_pipeline_parses_value() {
        let valuator = BatchValuator::new(Scripted::new(&[("A", 1, Reply::Value("$61.25"))]), 1);
        let bv = valuator.valuate_bond(&bond("A"), target()).await.unwrap();
        assert_eq!(bv.serial_number, "A");
        assert_eq!(bv.value, dec!(61.25));
    }
}
