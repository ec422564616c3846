use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::apperror::{ApplicationError, ErrorType};

/**
 * The reduction applied to the yields of one variety.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatisticType {
    Min,
    Max,
    Average,
}

/**
 * The geographic level at which location codes are interpreted.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocationType {
    City,
    Department,
    Region,
}

/**
 * A granularity together with the location codes requested at that granularity.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSelection {
    pub location_type: LocationType,
    pub codes: Vec<String>,
}

impl LocationSelection {
    /**
     * Determines which one of the location collections is populated.
     *
     * A collection that is absent counts as empty. Exactly one collection must contain codes.
     *
     * # Arguments
     * `city_codes`: Requested city codes.
     * `department_codes`: Requested department codes.
     * `region_codes`: Requested region codes.
     *
     * # Returns
     * The populated granularity and its codes, or a validation error if none or several are populated.
     */
    pub fn resolve(city_codes: Option<Vec<String>>, department_codes: Option<Vec<String>>, region_codes: Option<Vec<String>>) -> Result<Self, ApplicationError> {
        let populated = |codes: Option<Vec<String>>| codes.filter(|codes| !codes.is_empty());
        match (populated(city_codes), populated(department_codes), populated(region_codes)) {
            (Some(codes), None, None) => Ok(LocationSelection { location_type: LocationType::City, codes }),
            (None, Some(codes), None) => Ok(LocationSelection { location_type: LocationType::Department, codes }),
            (None, None, Some(codes)) => Ok(LocationSelection { location_type: LocationType::Region, codes }),
            (None, None, None) => Err(ApplicationError::new(ErrorType::Validation, "All location collections are empty".to_string())),
            _ => Err(ApplicationError::new(ErrorType::Validation, "More than one location collection is populated".to_string())),
        }
    }
}

/**
 * Statistics request parameters as received.
 */
#[derive(Debug, Clone)]
pub struct StatisticsInputType {
    pub varieties: Vec<String>,
    pub year: i32,
    pub statistic_type: StatisticType,
    pub city_codes: Option<Vec<String>>,
    pub department_codes: Option<Vec<String>>,
    pub region_codes: Option<Vec<String>>,
}

impl StatisticsInputType {
    /**
     * Resolves the location granularity of the request.
     *
     * # Returns
     * A `StatisticsQueryType` ready to be executed or a validation error.
     */
    pub fn resolve(self) -> Result<StatisticsQueryType, ApplicationError> {
        let location = LocationSelection::resolve(self.city_codes, self.department_codes, self.region_codes)?;
        Ok(StatisticsQueryType { varieties: self.varieties, year: self.year, statistic_type: self.statistic_type, location })
    }
}

/**
 * Statistics request with a resolved location selection.
 */
#[derive(Debug, Clone)]
pub struct StatisticsQueryType {
    pub varieties: Vec<String>,
    pub year: i32,
    pub statistic_type: StatisticType,
    pub location: LocationSelection,
}

/**
 * Harvested quantity (tonnes) and plot surface (hectares) of one crop record.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropYieldType {
    pub quantity: Decimal,
    pub surface: Decimal,
}

impl CropYieldType {
    pub fn new(quantity: Decimal, surface: Decimal) -> Self {
        CropYieldType { quantity, surface }
    }
}

/**
 * Statistic computed for one variety.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticResultType {
    pub statistic_type: StatisticType,
    pub variety: String,
    pub location_type: LocationType,
    pub locations: Vec<String>,
    pub year: i32,
    /**
     * Absent when no crop matched the filters.
     */
    pub value: Option<Decimal>,
}

impl StatisticResultType {
    pub fn new(statistic_type: StatisticType, variety: String, location_type: LocationType, locations: Vec<String>, year: i32, value: Option<Decimal>) -> Self {
        StatisticResultType { statistic_type, variety, location_type, locations, year, value }
    }
}

/**
 * Input type for adding a farm.
 */
#[derive(Debug, Clone)]
pub struct FarmAddInputType {
    pub pacage_code: String,
    pub city_code: String,
    pub department_code: String,
    pub region_code: String,
}

/**
 * Input type for adding a plot to a farm.
 */
#[derive(Debug, Clone)]
pub struct PlotAddInputType {
    pub farm_id: i64,
    pub surface: Decimal,
}

/**
 * Input type for adding a yearly crop to a plot.
 */
#[derive(Debug, Clone)]
pub struct CropAddInputType {
    pub plot_id: i64,
    pub year: i32,
    pub variety: String,
    pub quantity: Decimal,
}
