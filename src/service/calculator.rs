use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{CropYieldType, StatisticType},
};

/**
 * Scales tonnes per hectare to the unit reported by the API.
 */
const YIELD_SCALING_FACTOR: Decimal = Decimal::TEN;

/**
 * Calculates the yield per hectare of one crop.
 *
 * The quotient is rounded up at the scale of the scaled quantity.
 *
 * # Arguments
 * `crop_yield`: Quantity and surface of the crop.
 *
 * # Returns
 * The yield or an arithmetic error when the surface is zero or the value overflows.
 */
pub fn calculate_yield(crop_yield: &CropYieldType) -> Result<Decimal, ApplicationError> {
    let scaled_quantity = crop_yield
        .quantity
        .checked_mul(YIELD_SCALING_FACTOR)
        .ok_or_else(|| ApplicationError::new(ErrorType::Arithmetic, format!("Quantity {} overflows when scaled", crop_yield.quantity)))?;
    divide_round_up(scaled_quantity, crop_yield.surface)
}

/**
 * Reduces the yields of a set of crops to a single statistic.
 *
 * # Arguments
 * `crop_yields`: Quantity and surface of each matching crop.
 * `statistic_type`: The reduction to apply.
 *
 * # Returns
 * `None` if there are no crops, otherwise the statistic.
 */
pub fn calculate_statistic(crop_yields: &[CropYieldType], statistic_type: StatisticType) -> Result<Option<Decimal>, ApplicationError> {
    let yields = crop_yields.iter().map(calculate_yield).collect::<Result<Vec<Decimal>, ApplicationError>>()?;
    if yields.is_empty() {
        return Ok(None);
    }
    let value = match statistic_type {
        StatisticType::Min => yields.iter().min().copied(),
        StatisticType::Max => yields.iter().max().copied(),
        StatisticType::Average => {
            let sum = yields
                .iter()
                .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(*value))
                .ok_or_else(|| ApplicationError::new(ErrorType::Arithmetic, "Sum of yields overflows".to_string()))?;
            Some(divide_round_up(sum, Decimal::from(yields.len()))?)
        }
    };
    Ok(value)
}

/**
 * Divides and rounds away from zero at the scale of the dividend.
 */
fn divide_round_up(dividend: Decimal, divisor: Decimal) -> Result<Decimal, ApplicationError> {
    if divisor.is_zero() {
        return Err(ApplicationError::new(ErrorType::Arithmetic, "Division by zero".to_string()));
    }
    let quotient = dividend
        .checked_div(divisor)
        .ok_or_else(|| ApplicationError::new(ErrorType::Arithmetic, format!("Division of {dividend} by {divisor} overflows")))?;
    Ok(quotient.round_dp_with_strategy(dividend.scale(), RoundingStrategy::AwayFromZero))
}
