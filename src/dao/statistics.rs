use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{Instrument, instrument};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{CropYieldType, LocationSelection, LocationType},
};

/**
 * Database response type for querying crop yields. Quantity and surface.
 */
pub type QueryCropYieldDbResp = (Decimal, Decimal);

/**
 * SQL query to retrieve quantity and surface of crops for a variety, a list of cities and a year.
 */
const QUERY_CROP_YIELDS_BY_CITIES: &str = "SELECT c.quantity, p.surface FROM crops c
                                 INNER JOIN plots p ON c.plot_id = p.id
                                 INNER JOIN farms f ON p.farm_id = f.id
                                 WHERE c.variety = $1 AND f.city_code = ANY($2) AND c.year = $3";

/**
 * SQL query to retrieve quantity and surface of crops for a variety, a list of departments and a year.
 */
const QUERY_CROP_YIELDS_BY_DEPARTMENTS: &str = "SELECT c.quantity, p.surface FROM crops c
                                 INNER JOIN plots p ON c.plot_id = p.id
                                 INNER JOIN farms f ON p.farm_id = f.id
                                 WHERE c.variety = $1 AND f.department_code = ANY($2) AND c.year = $3";

/**
 * SQL query to retrieve quantity and surface of crops for a variety, a list of regions and a year.
 */
const QUERY_CROP_YIELDS_BY_REGIONS: &str = "SELECT c.quantity, p.surface FROM crops c
                                 INNER JOIN plots p ON c.plot_id = p.id
                                 INNER JOIN farms f ON p.farm_id = f.id
                                 WHERE c.variety = $1 AND f.region_code = ANY($2) AND c.year = $3";

impl From<QueryCropYieldDbResp> for CropYieldType {
    fn from(row: QueryCropYieldDbResp) -> Self {
        CropYieldType::new(row.0, row.1)
    }
}

/**
 * DAO for the crop yield lookups behind the statistics.
 */
pub struct StatisticsDao {}

impl StatisticsDao {
    /**
     * Creates a new instance of `StatisticsDao`.
     *
     * # Returns
     * A new instance of `StatisticsDao`.
     */
    pub fn new() -> Self {
        StatisticsDao {}
    }

    /**
     * Retrieves quantity and surface of every crop of a variety and a year grown on a farm in one of the locations.
     *
     * # Arguments
     * `connection`: The database connection.
     * `variety`: The crop variety.
     * `location`: The granularity and the location codes to match.
     * `year`: The crop year.
     *
     * # Returns
     * A Result containing the matching crop yields, in no particular order, or an `ApplicationError`.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn find_crop_yields(&self, connection: &mut PgConnection, variety: &str, location: &LocationSelection, year: i32) -> Result<Vec<CropYieldType>, ApplicationError> {
        let span = tracing::Span::current();
        let results: Vec<QueryCropYieldDbResp> = sqlx::query_as(Self::crop_yields_query(location.location_type))
            .bind(variety)
            .bind(&location.codes)
            .bind(year)
            .fetch_all(connection)
            .instrument(span.clone())
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to get crop yields: {err}")))?;
        span.record("result", results.len());
        Ok(results.into_iter().map(CropYieldType::from).collect())
    }

    /**
     * Selects the crop yield query filtering on the farm column of the granularity.
     */
    fn crop_yields_query(location_type: LocationType) -> &'static str {
        match location_type {
            LocationType::City => QUERY_CROP_YIELDS_BY_CITIES,
            LocationType::Department => QUERY_CROP_YIELDS_BY_DEPARTMENTS,
            LocationType::Region => QUERY_CROP_YIELDS_BY_REGIONS,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_crop_yields_query_per_location_type() {
        assert!(StatisticsDao::crop_yields_query(LocationType::City).contains("f.city_code = ANY($2)"));
        assert!(StatisticsDao::crop_yields_query(LocationType::Department).contains("f.department_code = ANY($2)"));
        assert!(StatisticsDao::crop_yields_query(LocationType::Region).contains("f.region_code = ANY($2)"));
    }

    #[test]
    fn test_crop_yield_from_row() {
        let crop_yield = CropYieldType::from((Decimal::from(34), Decimal::from(5)));
        assert_eq!(crop_yield.quantity, Decimal::from(34));
        assert_eq!(crop_yield.surface, Decimal::from(5));
    }
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use crate::{dao::farms::FarmDao, model::models::{CropAddInputType, FarmAddInputType, PlotAddInputType}};
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./sqlx-postgresql-migration/migrations")]
    async fn test_find_crop_yields_per_location_type(pool: PgPool) {
        let mut transaction = pool.begin().await.unwrap();
        let farm_dao = FarmDao::new();
        let farm_id = farm_dao
            .add_farm(&mut transaction, FarmAddInputType { pacage_code: "49-85456-98".to_string(), city_code: "49420".to_string(), department_code: "49".to_string(), region_code: "52".to_string() })
            .await
            .unwrap();
        let plot_id = farm_dao.add_plot(&mut transaction, PlotAddInputType { farm_id, surface: Decimal::from(5) }).await.unwrap();
        farm_dao.add_crop(&mut transaction, CropAddInputType { plot_id, year: 2017, variety: "ALIXAN".to_string(), quantity: Decimal::from(34) }).await.unwrap();
        farm_dao.add_crop(&mut transaction, CropAddInputType { plot_id, year: 2018, variety: "ALIXAN".to_string(), quantity: Decimal::from(30) }).await.unwrap();

        let statistics_dao = StatisticsDao::new();
        for (location_type, code) in [(LocationType::City, "49420"), (LocationType::Department, "49"), (LocationType::Region, "52")] {
            let location = LocationSelection { location_type, codes: vec!["00000".to_string(), code.to_string()] };
            let crop_yields = statistics_dao.find_crop_yields(&mut transaction, "ALIXAN", &location, 2017).await.unwrap();
            assert_eq!(crop_yields, vec![CropYieldType::new(Decimal::from(34), Decimal::from(5))]);
        }
        let location = LocationSelection { location_type: LocationType::City, codes: vec!["53800".to_string()] };
        let crop_yields = statistics_dao.find_crop_yields(&mut transaction, "ALIXAN", &location, 2017).await.unwrap();
        assert!(crop_yields.is_empty());
        transaction.rollback().await.unwrap();
    }
}
