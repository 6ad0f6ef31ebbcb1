//! Property tests for the pricing pipeline.
//!
//! Covers the chargeable weight rule, the total / GST identity, the
//! minimum-charge floor, determinism and the ODA matrix bounds.

use proptest::prelude::*;
use rust_decimal::Decimal;

use courier_quote_engine::calculation::{
    ChargeComponents, OdaChargeMatrix, aggregate_totals, quote_courier,
};
use courier_quote_engine::config::{CourierConfig, CourierConfigInput};
use courier_quote_engine::models::{DeliveryStatus, DestinationRecord, ShipmentRequest};

fn amount(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (0..=max_cents).prop_map(|cents| Decimal::new(cents, 2))
}

fn percentage() -> impl Strategy<Value = Decimal> {
    (0i64..=3000).prop_map(|bp| Decimal::new(bp, 2))
}

fn courier(
    fuel_pct: Decimal,
    gst_pct: Decimal,
    min_charge: Decimal,
    subtotal_basis: bool,
) -> CourierConfig {
    let yaml = format!(
        "name: Prop\nrates: '{{\"A\": 25}}'\ndocket: 40\nfuel_pct: {}\nfuel_basis: {}\ngst_pct: {}\nmin_charge: {}\ninsurance_pct: 1.5\ninsurance_flat: 30\noda_type: Special",
        fuel_pct,
        if subtotal_basis { "subtotal" } else { "freight" },
        gst_pct,
        min_charge
    );
    serde_yaml::from_str::<CourierConfigInput>(&yaml)
        .unwrap()
        .into_config()
        .unwrap()
}

fn destination(distance: Decimal) -> DestinationRecord {
    DestinationRecord {
        pincode: "788001".to_string(),
        zone: "A".to_string(),
        status: DeliveryStatus::OutOfDeliveryArea,
        state: "Assam".to_string(),
        location: "Silchar".to_string(),
        oda_distance: distance,
    }
}

proptest! {
    #[test]
    fn effective_weight_is_max_when_volumetric_present(
        actual in amount(100_000),
        volumetric in amount(100_000),
    ) {
        let mut shipment = ShipmentRequest::new(actual, Decimal::ZERO);
        shipment.volumetric_weight = Some(volumetric);

        let expected = if volumetric > Decimal::ZERO { actual.max(volumetric) } else { actual };
        prop_assert_eq!(shipment.effective_weight(), expected);
    }

    #[test]
    fn unrounded_totals_are_exact(
        freight in amount(1_000_000),
        insurance in amount(100_000),
        oda in amount(500_000),
        fuel_pct in percentage(),
        gst_pct in percentage(),
        min_charge in amount(200_000),
        subtotal_basis in any::<bool>(),
    ) {
        let config = courier(fuel_pct, gst_pct, min_charge, subtotal_basis);
        let components = ChargeComponents { freight, docket: config.docket, insurance, oda };
        let totals = aggregate_totals(&components, &config, 1).totals;

        prop_assert_eq!(totals.subtotal_for_tax, totals.subtotal_pre_fuel + totals.fuel);
        prop_assert_eq!(totals.gst, totals.subtotal_for_tax * gst_pct / Decimal::ONE_HUNDRED);
        prop_assert_eq!(totals.total, totals.subtotal_for_tax + totals.gst);
        prop_assert!(totals.subtotal_pre_fuel >= min_charge);
    }

    #[test]
    fn minimum_charge_floors_small_shipments(
        freight in amount(10_000),
        min_charge in (50_000i64..=100_000).prop_map(|c| Decimal::new(c, 2)),
    ) {
        let config = courier(Decimal::ZERO, Decimal::ZERO, min_charge, false);
        let components = ChargeComponents {
            freight,
            docket: config.docket,
            insurance: Decimal::ZERO,
            oda: Decimal::ZERO,
        };
        let totals = aggregate_totals(&components, &config, 1).totals;
        prop_assert_eq!(totals.subtotal_pre_fuel, min_charge);
    }

    #[test]
    fn rounded_breakdown_adds_up(
        weight in amount(50_000),
        declared in amount(10_000_000),
        distance in amount(50_000),
        fuel_pct in percentage(),
        gst_pct in percentage(),
    ) {
        let config = courier(fuel_pct, gst_pct, Decimal::ZERO, true);
        let record = destination(distance);
        let shipment = ShipmentRequest::new(weight, declared);

        let result = quote_courier(&config, "788001", Some(&record), &shipment, &OdaChargeMatrix::standard()).unwrap();
        let breakdown = result.breakdown.unwrap();

        prop_assert_eq!(breakdown.total, breakdown.subtotal + breakdown.gst);
        prop_assert!(breakdown.total.scale() <= 2);
        prop_assert!(breakdown.insurance >= Decimal::new(30, 0));
    }

    #[test]
    fn quotes_are_deterministic(
        weight in amount(50_000),
        declared in amount(1_000_000),
        distance in amount(50_000),
    ) {
        let config = courier(Decimal::new(12, 0), Decimal::new(18, 0), Decimal::ZERO, false);
        let record = destination(distance);
        let shipment = ShipmentRequest::new(weight, declared);
        let matrix = OdaChargeMatrix::standard();

        let first = quote_courier(&config, "788001", Some(&record), &shipment, &matrix).unwrap();
        let second = quote_courier(&config, "788001", Some(&record), &shipment, &matrix).unwrap();
        prop_assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
    }

    #[test]
    fn matrix_charge_is_positive_for_positive_distance(
        distance in (1i64..=100_000).prop_map(|d| Decimal::new(d, 2)),
        weight in amount(500_000),
    ) {
        let charge = OdaChargeMatrix::standard().get_oda_charge(distance, weight);
        prop_assert!(charge >= Decimal::new(550, 0));
        prop_assert!(charge <= Decimal::new(4125, 0));
    }
}
