use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres};
use tracing::{Instrument, instrument};

use crate::{
    dao::farms::FarmDao,
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{CropAddInputType, FarmAddInputType, PlotAddInputType},
    },
};

struct SeedFarm {
    pacage_code: &'static str,
    city_code: &'static str,
    department_code: &'static str,
    region_code: &'static str,
    plots: &'static [SeedPlot],
}

struct SeedPlot {
    /**
     * Hectares.
     */
    surface: i64,
    /**
     * Year, variety and quantity in tonnes.
     */
    crops: &'static [(i32, &'static str, i64)],
}

/**
 * Sample farms inserted into an empty database.
 */
const SEED_FARMS: &[SeedFarm] = &[
    SeedFarm {
        pacage_code: "49-85456-98",
        city_code: "49420",
        department_code: "49",
        region_code: "52",
        plots: &[SeedPlot { surface: 5, crops: &[(2017, "ALIXAN", 34), (2018, "ADVISOR", 32), (2019, "HENDRIX", 35)] }],
    },
    SeedFarm {
        pacage_code: "49-85266-32",
        city_code: "49480",
        department_code: "49",
        region_code: "52",
        plots: &[
            SeedPlot { surface: 4, crops: &[(2017, "HENDRIX", 20), (2018, "MAORI", 28), (2019, "ILLICO", 24)] },
            SeedPlot { surface: 17, crops: &[(2017, "ADVISOR", 90), (2018, "HENDRIX", 115), (2019, "MAORI", 102)] },
        ],
    },
    SeedFarm {
        pacage_code: "53-85456-98",
        city_code: "53800",
        department_code: "53",
        region_code: "52",
        plots: &[SeedPlot { surface: 6, crops: &[(2017, "MAORI", 42), (2018, "ILLICO", 32), (2019, "ALIXAN", 47)] }],
    },
];

/**
 * Populates the database with sample data at startup.
 */
pub struct DataInitializer {
    farm_dao: FarmDao,
    connection_pool: Pool<Postgres>,
}

impl DataInitializer {
    pub fn new(farm_dao: FarmDao, connection_pool: Pool<Postgres>) -> Self {
        DataInitializer { farm_dao, connection_pool }
    }

    /**
     * Inserts the sample farms, plots and crops unless a farm already exists.
     *
     * Not safe against concurrent runs. Must complete before requests are served.
     *
     * # Returns
     * `true` if the sample data was inserted, `false` if the database already contained farms.
     */
    #[instrument(skip(self), fields(result))]
    pub async fn run(&self) -> Result<bool, ApplicationError> {
        let span = tracing::Span::current();
        let mut transaction = self.connection_pool.begin().instrument(span.clone()).await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to begin transaction: {err}")))?;
        if self.farm_dao.count_farms(&mut transaction).await? > 0 {
            tracing::info!("Farms already exist, skipping sample data");
            transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))?;
            span.record("result", false);
            return Ok(false);
        }
        match self.insert_seed_farms(&mut transaction).instrument(span.clone()).await {
            Ok(()) => transaction.commit().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to commit transaction: {err}")))?,
            Err(err) => {
                transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))?;
                return Err(err);
            }
        }
        tracing::info!("Inserted {} sample farms", SEED_FARMS.len());
        span.record("result", true);
        Ok(true)
    }

    async fn insert_seed_farms(&self, transaction: &mut PgConnection) -> Result<(), ApplicationError> {
        for seed_farm in SEED_FARMS {
            let farm_add_input = FarmAddInputType {
                pacage_code: seed_farm.pacage_code.to_string(),
                city_code: seed_farm.city_code.to_string(),
                department_code: seed_farm.department_code.to_string(),
                region_code: seed_farm.region_code.to_string(),
            };
            let farm_id = self.farm_dao.add_farm(&mut *transaction, farm_add_input).await?;
            for seed_plot in seed_farm.plots {
                let plot_id = self.farm_dao.add_plot(&mut *transaction, PlotAddInputType { farm_id, surface: Decimal::from(seed_plot.surface) }).await?;
                for (year, variety, quantity) in seed_plot.crops {
                    let crop_add_input = CropAddInputType { plot_id, year: *year, variety: (*variety).to_string(), quantity: Decimal::from(*quantity) };
                    self.farm_dao.add_crop(&mut *transaction, crop_add_input).await?;
                }
            }
        }
        Ok(())
    }
}


#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./sqlx-postgresql-migration/migrations")]
    async fn test_run_is_idempotent(pool: PgPool) {
        let data_initializer = DataInitializer::new(FarmDao::new(), pool.clone());
        assert!(data_initializer.run().await.unwrap());
        assert!(!data_initializer.run().await.unwrap());
        let mut connection = pool.acquire().await.unwrap();
        assert_eq!(FarmDao::new().count_farms(&mut connection).await.unwrap(), 3);
        let crops: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM crops").fetch_one(&mut *connection).await.unwrap();
        assert_eq!(crops.0, 12);
    }
}
