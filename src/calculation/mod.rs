//! Calculation logic for the Courier Quote Engine.
//!
//! This module contains the pricing pipeline stages: rate lookup and
//! freight, insurance, the fixed and matrix ODA surcharges, fuel, and the
//! minimum charge / GST aggregation. The dispatcher chains them per courier
//! and the batch quoter fans a request set out across every courier.

mod batch;
mod dispatcher;
mod fuel_surcharge;
mod insurance;
mod oda_surcharge;
mod rate_resolver;
mod tax_totals;

pub use batch::{QuoteRequest, cheapest_quotes, quote_all, quote_batch, quote_for_courier};
pub use dispatcher::{PricingStrategy, quote_courier};
pub use fuel_surcharge::{FuelResult, calculate_fuel};
pub use insurance::{InsuranceResult, calculate_insurance};
pub use oda_surcharge::{
    DistanceBand, OdaChargeMatrix, OdaSurchargeResult, WeightBracket, calculate_fixed_oda,
    calculate_matrix_oda,
};
pub use rate_resolver::{
    FreightResult, RateLookupResult, RateSourceKind, calculate_freight, resolve_rate,
};
pub use tax_totals::{
    ChargeComponents, MONEY_DECIMAL_PLACES, PriceTotals, TotalsResult, aggregate_totals,
    round_money,
};
