use crate::service::statistics::StatisticsService;

/**
* Represents the application state shared across the Actix web application.
*/
pub struct AppState {
    /**
     * The statistics service computing crop yield statistics.
     */
    pub statistics_service: StatisticsService,
}

/**
 * Creates a new instance of `AppState`.
 *
 * # Arguments
 * `statistics_service`: The statistics service computing crop yield statistics.
 */
impl AppState {
    pub fn new(statistics_service: StatisticsService) -> Self {
        AppState { statistics_service }
    }
}
