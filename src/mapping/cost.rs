use crate::throttle::CostObservation;
use serde_json::Value;

/// Extracts query cost and throttle status from `extensions.cost`
///
/// Returns `None` when the response carries no cost block at all. Individual
/// fields that are missing or not numeric are left as `None` so the budget
/// tracker keeps its previous value for them.
pub fn decode_cost(body: &Value) -> Option<CostObservation> {
    let cost = body.get("extensions")?.get("cost")?;
    let throttle = cost.get("throttleStatus");

    Some(CostObservation {
        requested_cost: number_field(cost, "requestedQueryCost"),
        maximum_available: throttle.and_then(|t| number_field(t, "maximumAvailable")),
        currently_available: throttle.and_then(|t| number_field(t, "currentlyAvailable")),
        restore_rate: throttle.and_then(|t| number_field(t, "restoreRate")),
    })
}

fn number_field(object: &Value, key: &str) -> Option<f64> {
    let value = object.get(key)?;
    match value.as_f64() {
        Some(number) => Some(number),
        None => {
            tracing::warn!("Ignoring non-numeric cost field '{}': {}", key, value);
            None
        }
    }
}
