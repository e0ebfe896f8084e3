use api_types::fuel::{Car, CarModify, FuelType, Refuel};
use dashboard::FuelData;

use crate::{
    connector::Connector,
    drafts::{RefuelDraft, path_name},
    error::Result,
};

const CARS: &str = "fuel/cars";
const TYPES: &str = "fuel/types";
const REFUELS: &str = "fuel/refuels";

#[derive(Debug, Clone)]
pub struct FuelService {
    connector: Connector,
}

impl FuelService {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub async fn cars(&self) -> Result<Vec<Car>> {
        self.connector.get(CARS).await
    }

    pub async fn add_car(&self, car: &CarModify) -> Result<Car> {
        self.connector.add(CARS, car).await
    }

    /// Cars are addressed by name.
    pub async fn update_car(&self, name: &str, car: &CarModify) -> Result<Car> {
        let name = path_name(name, "car")?;
        self.connector.update(&format!("{CARS}/{name}"), car).await
    }

    pub async fn delete_car(&self, name: &str) -> Result<()> {
        let name = path_name(name, "car")?;
        self.connector.delete(&format!("{CARS}/{name}")).await
    }

    pub async fn fuel_types(&self) -> Result<Vec<FuelType>> {
        self.connector.get(TYPES).await
    }

    pub async fn refuels(&self) -> Result<Vec<Refuel>> {
        self.connector.get(REFUELS).await
    }

    pub async fn save_refuel(&self, draft: &RefuelDraft) -> Result<Refuel> {
        match draft.id {
            None => self.connector.add(REFUELS, &draft.for_create()?).await,
            Some(_) => {
                let (id, payload) = draft.for_update()?;
                self.connector
                    .update(&format!("{REFUELS}/{id}"), &payload)
                    .await
            }
        }
    }

    pub async fn delete_refuel(&self, id: i64) -> Result<()> {
        self.connector.delete(&format!("{REFUELS}/{id}")).await
    }

    pub async fn load_dashboard(&self) -> Result<FuelData> {
        let (fuel_types, cars, refuels) =
            tokio::try_join!(self.fuel_types(), self.cars(), self.refuels())?;
        Ok(FuelData {
            fuel_types,
            cars,
            refuels,
        })
    }
}
