//! In-memory provider driven by a script, for service tests.

use crate::errors::{OrderError, OrderErrorKind, ProviderError, Result};
use crate::pricing::{OperatorPrice, PriceQuote, PriceTable};
use crate::providers::traits::Provider;
use crate::transport::TransportError;
use crate::types::{
    CountryName, DialCode, FullNumber, OperatorName, Order, OrderId, OrderStatus, PlacedOrder,
    ServiceName,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// One scripted answer to a status query.
pub(crate) enum Script {
    Status(OrderStatus),
    Fail,
}

pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<Script>>,
    table: PriceTable,
    reject_purchase: bool,
    fail_cancel: bool,
    query_delay: Duration,
    queries: AtomicU32,
    cancels: AtomicU32,
    purchases: AtomicU32,
}

impl ScriptedProvider {
    pub(crate) fn new(script: Vec<Script>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            table: PriceTable::new(vec![
                (
                    OperatorName::from("beeline"),
                    OperatorPrice {
                        cost: 4.0,
                        success_rate: Some(80.0),
                    },
                ),
                (
                    OperatorName::from("tele2"),
                    OperatorPrice {
                        cost: 2.0,
                        success_rate: Some(95.0),
                    },
                ),
            ]),
            reject_purchase: false,
            fail_cancel: false,
            query_delay: Duration::ZERO,
            queries: AtomicU32::new(0),
            cancels: AtomicU32::new(0),
            purchases: AtomicU32::new(0),
        }
    }

    /// Answers `Pending` to every query.
    pub(crate) fn pending_forever() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn with_table(mut self, table: PriceTable) -> Self {
        self.table = table;
        self
    }

    pub(crate) fn rejecting_purchases(mut self) -> Self {
        self.reject_purchase = true;
        self
    }

    pub(crate) fn failing_cancel(mut self) -> Self {
        self.fail_cancel = true;
        self
    }

    pub(crate) fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub(crate) fn queries(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn cancels(&self) -> u32 {
        self.cancels.load(Ordering::SeqCst)
    }

    pub(crate) fn purchases(&self) -> u32 {
        self.purchases.load(Ordering::SeqCst)
    }

    pub(crate) fn sample_order(&self) -> Order {
        Order::from_placement(
            PlacedOrder {
                order_id: OrderId::from("1"),
                full_number: FullNumber::from("+79085895281"),
                dial_code: DialCode::new("7").ok(),
            },
            CountryName::new("russia").unwrap(),
            ServiceName::new("telegram").unwrap(),
            PriceQuote {
                operator: OperatorName::from("tele2"),
                price: 2.0,
                success_rate: Some(95.0),
            },
        )
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_price_table(
        &self,
        _country: &CountryName,
        _service: &ServiceName,
    ) -> Result<PriceTable> {
        Ok(self.table.clone())
    }

    async fn submit_order(
        &self,
        _country: &CountryName,
        _service: &ServiceName,
        operator: &OperatorName,
    ) -> Result<PlacedOrder> {
        self.purchases.fetch_add(1, Ordering::SeqCst);
        if self.reject_purchase {
            return Err(OrderError::new(
                OrderErrorKind::InsufficientBalance,
                "not enough user balance",
            )
            .into());
        }
        Ok(PlacedOrder {
            order_id: OrderId::new(format!("order-{operator}")),
            full_number: FullNumber::from("+79085895281"),
            dial_code: DialCode::new("7").ok(),
        })
    }

    async fn query_status(&self, _order_id: &OrderId) -> Result<OrderStatus> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Script::Status(status)) => Ok(status),
            Some(Script::Fail) => Err(ProviderError::Transport(TransportError::Server {
                status: 503,
                body: "unavailable".to_string(),
            })),
            None => Ok(OrderStatus::Pending),
        }
    }

    async fn cancel(&self, _order_id: &OrderId) -> Result<()> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if self.fail_cancel {
            return Err(OrderError::new(OrderErrorKind::Unknown, "order not found").into());
        }
        Ok(())
    }
}
