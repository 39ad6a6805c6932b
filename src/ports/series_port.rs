//! Historical series access port trait.

use crate::domain::error::EstateSimError;
use crate::domain::series::{EconomyData, HousePriceRecord, PopulationRecord};

pub trait SeriesPort {
    /// Raw median house price observations, possibly several per year.
    fn load_house_prices(&self) -> Result<Vec<HousePriceRecord>, EstateSimError>;

    fn load_population(&self) -> Result<Vec<PopulationRecord>, EstateSimError>;

    /// Loads both series into the tables the growth estimator is built from.
    fn load_economy_data(&self) -> Result<EconomyData, EstateSimError> {
        let prices = self.load_house_prices()?;
        let population = self.load_population()?;
        Ok(EconomyData::from_records(&prices, &population))
    }
}
