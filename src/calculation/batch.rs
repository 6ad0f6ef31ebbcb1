//! Batch quoting across every configured courier.
//!
//! Pricing is pure, so each courier's quotes are computed on a separate
//! blocking task against a shared catalog snapshot. Results are reassembled
//! pincode-major, then in courier order, independent of task completion
//! order.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::{CourierCatalog, CourierConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{QuoteResult, ShipmentRequest};
use crate::reference::ReferenceResolver;

use super::dispatcher::quote_courier;

/// One destination and shipment to quote with every courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// The destination pincode.
    pub pincode: String,
    /// The shipment to price.
    pub shipment: ShipmentRequest,
}

/// Quotes one request with one courier from the catalog.
pub fn quote_for_courier(
    catalog: &CourierCatalog,
    config: &CourierConfig,
    request: &QuoteRequest,
) -> EngineResult<QuoteResult> {
    let record = catalog.lookup(&config.name, &request.pincode);
    quote_courier(
        config,
        &request.pincode,
        record.as_ref(),
        &request.shipment,
        catalog.oda_matrix(),
    )
}

/// Quotes every request with every courier on the current thread.
///
/// Results are ordered by request, then by courier order.
pub fn quote_all(catalog: &CourierCatalog, requests: &[QuoteRequest]) -> EngineResult<Vec<QuoteResult>> {
    let mut results = Vec::with_capacity(requests.len() * catalog.couriers().len());
    for request in requests {
        for config in catalog.couriers() {
            results.push(quote_for_courier(catalog, config, request)?);
        }
    }
    Ok(results)
}

/// Quotes every request with every courier, one blocking task per courier.
///
/// Shipments are validated up front, so an invalid shipment fails the whole
/// batch before any task is spawned. The output order matches
/// [`quote_all`].
pub async fn quote_batch(
    catalog: Arc<CourierCatalog>,
    requests: Arc<[QuoteRequest]>,
) -> EngineResult<Vec<QuoteResult>> {
    for request in requests.iter() {
        request.shipment.validate()?;
    }

    let start_time = Instant::now();
    let courier_count = catalog.couriers().len();
    let mut tasks = JoinSet::new();

    for index in 0..courier_count {
        let catalog = Arc::clone(&catalog);
        let requests = Arc::clone(&requests);
        tasks.spawn_blocking(move || {
            let quotes = catalog
                .couriers()
                .get(index)
                .map(|config| {
                    requests
                        .iter()
                        .map(|request| quote_for_courier(&catalog, config, request))
                        .collect::<EngineResult<Vec<_>>>()
                })
                .unwrap_or_else(|| Ok(Vec::new()));
            (index, quotes)
        });
    }

    let mut per_courier: Vec<Option<Vec<QuoteResult>>> = vec![None; courier_count];
    while let Some(joined) = tasks.join_next().await {
        let (index, quotes) = joined.map_err(|e| EngineError::CalculationError {
            message: format!("quote task failed: {}", e),
        })?;
        debug!(courier_index = index, "Courier quotes completed");
        per_courier[index] = Some(quotes?);
    }

    let mut columns = per_courier
        .into_iter()
        .map(|quotes| {
            quotes.map(Vec::into_iter).ok_or_else(|| EngineError::CalculationError {
                message: "quote task produced no results".to_string(),
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let mut results = Vec::with_capacity(requests.len() * courier_count);
    for request in requests.iter() {
        for column in columns.iter_mut() {
            let quote = column.next().ok_or_else(|| EngineError::CalculationError {
                message: format!("missing quote for pincode {}", request.pincode),
            })?;
            results.push(quote);
        }
    }

    info!(
        couriers = courier_count,
        requests = requests.len(),
        quotes = results.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Batch quoted"
    );
    Ok(results)
}

/// Picks the cheapest priced quote for each request of a batch.
///
/// `results` must be ordered as [`quote_batch`] returns them, one block of
/// `courier_count` quotes per request. Rejected quotes are never picked; on a
/// tie the courier that comes first in catalog order wins. Requests with no
/// priced quote have no entry.
pub fn cheapest_quotes(results: &[QuoteResult], courier_count: usize) -> Vec<&QuoteResult> {
    if courier_count == 0 {
        return Vec::new();
    }
    results
        .chunks(courier_count)
        .filter_map(|block| {
            block
                .iter()
                .filter(|quote| quote.is_ok())
                .fold(None, |best: Option<&QuoteResult>, quote| match (best, quote.total()) {
                    (Some(current), Some(total)) if current.total().is_some_and(|t| t <= total) => {
                        Some(current)
                    }
                    _ => Some(quote),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::OdaChargeMatrix;
    use crate::config::CourierConfigInput;
    use crate::reference::{PincodeTable, ReferenceRow};
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config(yaml: &str) -> CourierConfig {
        serde_yaml::from_str::<CourierConfigInput>(yaml)
            .unwrap()
            .into_config()
            .unwrap()
    }

    fn table(rows: serde_json::Value) -> Arc<PincodeTable> {
        let rows: Vec<ReferenceRow> = serde_json::from_value(rows).unwrap();
        Arc::new(PincodeTable::from_rows(rows))
    }

    fn catalog() -> Arc<CourierCatalog> {
        let mut references = HashMap::new();
        references.insert(
            "Alpha".to_string(),
            table(serde_json::json!([
                { "pincode": "110001", "zone": "A" },
                { "pincode": "400001", "zone": "B" }
            ])),
        );
        references.insert(
            "Beta".to_string(),
            table(serde_json::json!([{ "pincode": "110001", "zone": "A" }])),
        );
        let couriers = vec![
            config("name: Alpha\nrates: '{\"A\": 10, \"B\": 12}'\ngst_pct: 0"),
            config("name: Beta\nrates: '{\"A\": 8}'\ngst_pct: 0"),
            config("name: Gamma\nrate_per_kg: 5"),
        ];
        Arc::new(CourierCatalog::new(couriers, references, OdaChargeMatrix::standard()).unwrap())
    }

    fn requests() -> Arc<[QuoteRequest]> {
        vec![
            QuoteRequest {
                pincode: "400001".to_string(),
                shipment: ShipmentRequest::new(dec("2"), Decimal::ZERO),
            },
            QuoteRequest {
                pincode: "110001".to_string(),
                shipment: ShipmentRequest::new(dec("3"), Decimal::ZERO),
            },
        ]
        .into()
    }

    #[tokio::test]
    async fn test_batch_orders_by_pincode_then_courier() {
        let results = quote_batch(catalog(), requests()).await.unwrap();
        let order: Vec<(&str, &str)> = results
            .iter()
            .map(|r| (r.pincode.as_str(), r.courier.as_str()))
            .collect();

        assert_eq!(
            order,
            vec![
                ("400001", "Alpha"),
                ("400001", "Beta"),
                ("400001", "Gamma"),
                ("110001", "Alpha"),
                ("110001", "Beta"),
                ("110001", "Gamma"),
            ]
        );
        assert_eq!(results[0].total(), Some(dec("24")));
        assert_eq!(results[1].reason, "Pincode not found");
        assert_eq!(results[4].total(), Some(dec("24")));
    }

    #[tokio::test]
    async fn test_batch_matches_sequential_quotes() {
        let catalog = catalog();
        let requests = requests();
        let sequential = quote_all(&catalog, &requests).unwrap();
        let batched = quote_batch(Arc::clone(&catalog), requests).await.unwrap();
        assert_eq!(sequential, batched);
    }

    #[tokio::test]
    async fn test_invalid_shipment_fails_whole_batch() {
        let requests: Arc<[QuoteRequest]> = vec![QuoteRequest {
            pincode: "110001".to_string(),
            shipment: ShipmentRequest::new(dec("-1"), Decimal::ZERO),
        }]
        .into();
        let result = quote_batch(catalog(), requests).await;
        assert!(matches!(result, Err(EngineError::InvalidShipment { .. })));
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_no_quotes() {
        let results = quote_batch(Arc::new(CourierCatalog::default()), requests())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_cheapest_quote_per_request() {
        let catalog = catalog();
        let results = quote_batch(Arc::clone(&catalog), requests()).await.unwrap();
        let cheapest = cheapest_quotes(&results, catalog.couriers().len());

        // 400001: only Alpha prices it. 110001: Alpha 30, Beta 24, Gamma has no table.
        assert_eq!(cheapest.len(), 2);
        assert_eq!(cheapest[0].courier, "Alpha");
        assert_eq!(cheapest[1].courier, "Beta");
    }

    #[test]
    fn test_cheapest_quote_tie_goes_to_first_courier() {
        let catalog = catalog();
        let tied = vec![QuoteRequest {
            pincode: "110001".to_string(),
            shipment: ShipmentRequest::new(dec("4"), Decimal::ZERO),
        }];
        // Alpha 10 x 4 = 40 against Beta 8 x 4 = 32: Beta wins outright.
        let results = quote_all(&catalog, &tied).unwrap();
        assert_eq!(cheapest_quotes(&results, 3)[0].courier, "Beta");

        let mut swapped = results.clone();
        swapped[0].breakdown.as_mut().unwrap().total = dec("32");
        assert_eq!(cheapest_quotes(&swapped, 3)[0].courier, "Alpha");
    }

    #[test]
    fn test_cheapest_quotes_skips_unpriced_requests() {
        let results = vec![QuoteResult::rejected(
            "Alpha",
            "999999",
            Decimal::ONE,
            None,
            crate::models::Rejection::PincodeNotFound,
            vec![],
        )];
        assert!(cheapest_quotes(&results, 1).is_empty());
        assert!(cheapest_quotes(&results, 0).is_empty());
    }
}
