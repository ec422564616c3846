use std::borrow::Cow;

use sqlx::PgConnection;
use tracing::{Instrument, instrument};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{CropAddInputType, FarmAddInputType, PlotAddInputType},
};

/**
 * SQL query to count the farms.
 */
const COUNT_FARMS: &str = "SELECT COUNT(*) FROM farms";

/**
 * SQL query to add a new farm.
 */
const ADD_FARM: &str = "INSERT INTO farms (pacage_code, city_code, department_code, region_code) VALUES ($1, $2, $3, $4) RETURNING id";

/**
 * SQL query to add a new plot.
 */
const ADD_PLOT: &str = "INSERT INTO plots (farm_id, surface) VALUES ($1, $2) RETURNING id";

/**
 * SQL query to add a new crop.
 */
const ADD_CROP: &str = "INSERT INTO crops (plot_id, year, variety, quantity) VALUES ($1, $2, $3, $4) RETURNING id";

/**
 * DAO for creating farms, plots and crops.
 */
pub struct FarmDao {}

impl FarmDao {
    /**
     * Creates a new instance of `FarmDao`.
     *
     * # Returns
     * A new instance of `FarmDao`.
     */
    pub fn new() -> Self {
        FarmDao {}
    }

    /**
     * Counts the farms in the database.
     *
     * # Arguments
     * `connection`: The database connection.
     *
     * # Returns
     * A Result containing the number of farms or an `ApplicationError`.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn count_farms(&self, connection: &mut PgConnection) -> Result<i64, ApplicationError> {
        let span = tracing::Span::current();
        let count: (i64,) = sqlx::query_as(COUNT_FARMS)
            .fetch_one(connection)
            .instrument(span.clone())
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to count farms: {err}")))?;
        span.record("result", count.0);
        Ok(count.0)
    }

    /**
     * Adds a new farm to the database.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `farm_add_input`: The input containing details of the farm to be added.
     *
     * # Returns
     * A result containing the generated farm id.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_farm(&self, transaction: &mut PgConnection, farm_add_input: FarmAddInputType) -> Result<i64, ApplicationError> {
        let span = tracing::Span::current();
        let farm_id: (i64,) = sqlx::query_as(ADD_FARM)
            .bind(farm_add_input.pacage_code)
            .bind(farm_add_input.city_code)
            .bind(farm_add_input.department_code)
            .bind(farm_add_input.region_code)
            .fetch_one(transaction)
            .instrument(span.clone())
            .await
            .map_err(|err| Self::handle_database_error(err.as_database_error()))?;
        span.record("result", farm_id.0);
        Ok(farm_id.0)
    }

    /**
     * Adds a new plot to a farm.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `plot_add_input`: The owning farm and the surface of the plot.
     *
     * # Returns
     * A result containing the generated plot id.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_plot(&self, transaction: &mut PgConnection, plot_add_input: PlotAddInputType) -> Result<i64, ApplicationError> {
        let span = tracing::Span::current();
        let plot_id: (i64,) = sqlx::query_as(ADD_PLOT)
            .bind(plot_add_input.farm_id)
            .bind(plot_add_input.surface)
            .fetch_one(transaction)
            .instrument(span.clone())
            .await
            .map_err(|err| Self::handle_database_error(err.as_database_error()))?;
        span.record("result", plot_id.0);
        Ok(plot_id.0)
    }

    /**
     * Adds a new crop to a plot.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `crop_add_input`: The owning plot, year, variety and harvested quantity.
     *
     * # Returns
     * A result containing the generated crop id.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_crop(&self, transaction: &mut PgConnection, crop_add_input: CropAddInputType) -> Result<i64, ApplicationError> {
        let span = tracing::Span::current();
        let crop_id: (i64,) = sqlx::query_as(ADD_CROP)
            .bind(crop_add_input.plot_id)
            .bind(crop_add_input.year)
            .bind(crop_add_input.variety)
            .bind(crop_add_input.quantity)
            .fetch_one(transaction)
            .instrument(span.clone())
            .await
            .map_err(|err| Self::handle_database_error(err.as_database_error()))?;
        span.record("result", crop_id.0);
        Ok(crop_id.0)
    }

    /**
     * Handles database errors and maps them to application errors.
     *
     * # Arguments
     * `error`: The database error to handle.
     *
     * # Returns
     * An `ApplicationError` corresponding to the database error.
     */
    fn handle_database_error(error: Option<&dyn sqlx::error::DatabaseError>) -> ApplicationError {
        if let Some(db_error) = error {
            tracing::debug!("Insert error {:?}: {}", db_error.code(), db_error);
            if db_error.code() == Some(Cow::Borrowed("23505")) {
                // Unique violation
                return ApplicationError::new(ErrorType::ConstraintViolation, "Already exists".to_string());
            } else if db_error.code() == Some(Cow::Borrowed("23503")) {
                // Foreign key violation
                return ApplicationError::new(ErrorType::ConstraintViolation, "Missing parent value".to_string());
            } else if db_error.code() == Some(Cow::Borrowed("22001")) {
                // Value too long
                return ApplicationError::new(ErrorType::Validation, "Value too long".to_string());
            }
            tracing::error!("Unhandled database error: {}", db_error);
            return ApplicationError::new(ErrorType::DatabaseError, "Unhandled database error".to_string());
        }
        ApplicationError::new(ErrorType::DatabaseError, "Failed to execute database operation".to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handle_database_error_without_database_error() {
        let error = FarmDao::handle_database_error(None);
        assert_eq!(error.error_type, ErrorType::DatabaseError);
        assert_eq!(error.message, "Failed to execute database operation");
    }
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./sqlx-postgresql-migration/migrations")]
    async fn test_add_farm_plot_and_crop(pool: PgPool) {
        let mut transaction = pool.begin().await.unwrap();
        let farm_dao = FarmDao::new();
        assert_eq!(farm_dao.count_farms(&mut transaction).await.unwrap(), 0);
        let farm_id = farm_dao
            .add_farm(&mut transaction, FarmAddInputType { pacage_code: "53-85456-98".to_string(), city_code: "53800".to_string(), department_code: "53".to_string(), region_code: "52".to_string() })
            .await
            .unwrap();
        let plot_id = farm_dao.add_plot(&mut transaction, PlotAddInputType { farm_id, surface: Decimal::from(6) }).await.unwrap();
        let crop_add_result = farm_dao.add_crop(&mut transaction, CropAddInputType { plot_id, year: 2017, variety: "MAORI".to_string(), quantity: Decimal::from(42) }).await;
        assert!(crop_add_result.is_ok());
        assert_eq!(farm_dao.count_farms(&mut transaction).await.unwrap(), 1);
        transaction.rollback().await.unwrap();
    }

    #[sqlx::test(migrations = "./sqlx-postgresql-migration/migrations")]
    async fn test_add_plot_missing_farm(pool: PgPool) {
        let mut transaction = pool.begin().await.unwrap();
        let farm_dao = FarmDao::new();
        let error = farm_dao.add_plot(&mut transaction, PlotAddInputType { farm_id: 999, surface: Decimal::from(6) }).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::ConstraintViolation);
        transaction.rollback().await.unwrap();
    }
}
