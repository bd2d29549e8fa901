use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Policyholder {
    pub id: String,
    pub name: String,
    pub age: u32,
    /// ISO date (YYYY-MM-DD)
    pub policy_start_date: String,
    pub policy_amount: f64,
}
