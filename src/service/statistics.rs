use sqlx::{Pool, Postgres};
use tracing::{Instrument, instrument};

use crate::{
    dao::statistics::StatisticsDao,
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{StatisticResultType, StatisticsQueryType},
    },
    service::calculator::calculate_statistic,
};

/**
 * Represents the service computing crop yield statistics.
 */
pub struct StatisticsService {
    /**
     * The DAO for crop yield lookups.
     */
    statistics_dao: StatisticsDao,
    /**
     * Optional connection pool for database operations. Optional for test purposes until we have a better way to mock the database.
     */
    connection_pool: Option<Pool<Postgres>>,
}

impl StatisticsService {
    /**
     * Creates a new instance of `StatisticsService`.
     *
     * # Arguments
     * `statistics_dao`: The DAO for crop yield lookups.
     * `connection_pool`: Optional connection pool for database operations.
     *
     * # Returns
     * A new instance of `StatisticsService`.
     */
    pub fn new(statistics_dao: StatisticsDao, connection_pool: Option<Pool<Postgres>>) -> Self {
        StatisticsService { statistics_dao, connection_pool }
    }

    /**
     * Computes the requested statistic for each variety.
     *
     * # Arguments
     * `statistics_query`: Varieties, year, reduction and location selection.
     *
     * # Returns
     * A Result containing one result per variety, in the order the varieties were requested, or the first `ApplicationError`.
     */
    #[instrument(skip(self), fields(result))]
    pub async fn get_statistics(&self, statistics_query: StatisticsQueryType) -> Result<Vec<StatisticResultType>, ApplicationError> {
        let span = tracing::Span::current();
        let Some(connection_pool) = &self.connection_pool else {
            return Err(ApplicationError::new(ErrorType::DatabaseError, "No database connection available".to_string()));
        };
        let mut connection = connection_pool
            .acquire()
            .instrument(span.clone())
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to acquire connection: {err}")))?;
        let mut results = Vec::with_capacity(statistics_query.varieties.len());
        for variety in &statistics_query.varieties {
            let crop_yields = self.statistics_dao.find_crop_yields(&mut connection, variety, &statistics_query.location, statistics_query.year).instrument(span.clone()).await?;
            let value = calculate_statistic(&crop_yields, statistics_query.statistic_type)?;
            results.push(StatisticResultType::new(
                statistics_query.statistic_type,
                variety.clone(),
                statistics_query.location.location_type,
                statistics_query.location.codes.clone(),
                statistics_query.year,
                value,
            ));
        }
        span.record("result", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::models::{LocationSelection, LocationType, StatisticType};

    #[actix_web::test]
    async fn test_get_statistics_without_database() {
        let statistics_service = StatisticsService::new(StatisticsDao::new(), None);
        let statistics_query = StatisticsQueryType {
            varieties: vec!["ALIXAN".to_string()],
            year: 2017,
            statistic_type: StatisticType::Max,
            location: LocationSelection { location_type: LocationType::City, codes: vec!["49420".to_string()] },
        };
        let error = statistics_service.get_statistics(statistics_query).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::DatabaseError);
    }
}
