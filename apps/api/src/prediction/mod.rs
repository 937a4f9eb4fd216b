// Prediction pipeline: property records, feature preparation, inference
// and the HTTP handlers that expose them.

pub mod features;
pub mod handlers;
pub mod record;
