//! Session pricing: platform fee, tax and total payable.
//!
//! Each fee is computed from the mentor's base price and rounded half-up on
//! its own, so `total = price + platform_fee + tax_fee` holds exactly. This can
//! differ by one unit from rounding the sum.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Fee percentages applied on top of a mentor's session price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub platform_fee_percent: u32,
    pub tax_percent: u32,
}

impl FeeSchedule {
    pub const fn new(platform_fee_percent: u32, tax_percent: u32) -> Self {
        Self {
            platform_fee_percent,
            tax_percent,
        }
    }
}

/// A mentor's declared legal/document status, which selects their fee profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalStatus {
    /// Registered sole trader; settles their own tax.
    IndividualEntrepreneur,
    /// Private person; the platform withholds tax.
    PrivateIndividual,
}

/// Fee profile per legal status.
///
/// The defaults are the marketplace's built-in rates; a JSON file of the same
/// shape can replace them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTable {
    pub individual_entrepreneur: FeeSchedule,
    pub private_individual: FeeSchedule,
}

impl Default for FeeTable {
    fn default() -> Self {
        Self {
            individual_entrepreneur: FeeSchedule::new(15, 0),
            private_individual: FeeSchedule::new(14, 26),
        }
    }
}

impl FeeTable {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn schedule_for(&self, status: LegalStatus) -> FeeSchedule {
        match status {
            LegalStatus::IndividualEntrepreneur => self.individual_entrepreneur,
            LegalStatus::PrivateIndividual => self.private_individual,
        }
    }
}

/// Derived amounts for one session, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub session_price: u64,
    pub platform_fee: u64,
    pub tax_fee: u64,
    pub total_price: u64,
}

/// Compute fees and total for a non-negative session price.
pub fn compute(session_price: u64, schedule: &FeeSchedule) -> PriceBreakdown {
    let platform_fee = percent_of(session_price, schedule.platform_fee_percent);
    let tax_fee = percent_of(session_price, schedule.tax_percent);
    PriceBreakdown {
        session_price,
        platform_fee,
        tax_fee,
        total_price: session_price
            .saturating_add(platform_fee)
            .saturating_add(tax_fee),
    }
}

/// Price a service a mentor wants to publish.
///
/// # Errors
/// Returns `EngineError::InvalidPrice` if `session_price <= 0`; such a service
/// cannot be offered.
pub fn price_offer(
    session_price: i64,
    status: LegalStatus,
    table: &FeeTable,
) -> Result<PriceBreakdown> {
    let price = u64::try_from(session_price)
        .ok()
        .filter(|p| *p > 0)
        .ok_or(EngineError::InvalidPrice(session_price))?;
    Ok(compute(price, &table.schedule_for(status)))
}

/// `round(amount * percent / 100)` with halves rounded up, in integer math.
fn percent_of(amount: u64, percent: u32) -> u64 {
    let scaled = u128::from(amount) * u128::from(percent) + 50;
    u64::try_from(scaled / 100).unwrap_or(u64::MAX)
}
