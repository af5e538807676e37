//! Suggested resale price calculation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{FxError, FxResult};

/// Profit margin applied when the caller does not choose one.
pub const DEFAULT_PROFIT_MARGIN: Decimal = dec!(30);

/// Pure pricing arithmetic.
///
/// `suggested = round2(cost_usd * rate * (1 + margin / 100))`, rounding
/// midpoints away from zero (half-up for the positive values accepted here).
#[derive(Debug, Clone, Copy)]
pub struct PriceCalculator {
    default_margin: Decimal,
}

impl PriceCalculator {
    /// Create a calculator with the default 30% margin.
    pub fn new() -> Self {
        Self {
            default_margin: DEFAULT_PROFIT_MARGIN,
        }
    }

    /// Create a calculator with a custom default margin.
    pub fn with_default_margin(margin: Decimal) -> FxResult<Self> {
        validate_margin(margin)?;
        Ok(Self {
            default_margin: margin,
        })
    }

    /// Get the default margin in percent.
    pub fn default_margin(&self) -> Decimal {
        self.default_margin
    }

    /// Calculate the suggested price in the target currency.
    pub fn calculate(
        &self,
        base_cost_usd: Decimal,
        rate: Decimal,
        profit_margin_percent: Decimal,
    ) -> FxResult<Decimal> {
        if base_cost_usd <= Decimal::ZERO {
            return Err(FxError::InvalidInput(format!(
                "base cost must be positive, got {}",
                base_cost_usd
            )));
        }
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidInput(format!(
                "exchange rate must be positive, got {}",
                rate
            )));
        }
        validate_margin(profit_margin_percent)?;

        let markup = Decimal::ONE + profit_margin_percent / Decimal::ONE_HUNDRED;
        let price = base_cost_usd
            .checked_mul(rate)
            .and_then(|converted| converted.checked_mul(markup))
            .ok_or_else(|| FxError::InvalidInput("price overflows".to_string()))?;

        Ok(round2(price))
    }

    /// Calculate using the default margin.
    pub fn calculate_default(&self, base_cost_usd: Decimal, rate: Decimal) -> FxResult<Decimal> {
        self.calculate(base_cost_usd, rate, self.default_margin)
    }
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_margin(margin: Decimal) -> FxResult<()> {
    if margin < Decimal::ZERO || margin > Decimal::ONE_HUNDRED {
        return Err(FxError::InvalidInput(format!(
            "profit margin must be between 0 and 100, got {}",
            margin
        )));
    }
    Ok(())
}

/// Round to two decimal places, midpoint away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
