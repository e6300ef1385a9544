//! # Car Service
//!
//! The record operations behind the REST API: list, get, create, update,
//! delete. Handlers stay thin and call straight into this type.

use crate::db::{GarageStore, SqlValue};
use crate::error::{GarageError, GarageResult};
use crate::model::{Car, CAR_COLUMNS};
use crate::payload::{CarPayload, CarRow};
use crate::query::CarFilter;
use std::sync::Arc;
use tracing::info;

pub const CAR_NOT_FOUND: &str = "Car not found";

#[derive(Clone)]
pub struct CarService {
    store: Arc<GarageStore>,
}

impl CarService {
    pub fn new(store: Arc<GarageStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &GarageStore {
        &self.store
    }

    /// All records matching `filter`, in the requested order
    pub async fn list(&self, filter: &CarFilter) -> GarageResult<Vec<Car>> {
        let query = filter.build();
        self.store
            .fetch_all(query.sql, query.params, Car::from_row)
            .await
    }

    async fn find(&self, id: i64) -> GarageResult<Option<Car>> {
        self.store
            .fetch_one(
                format!("SELECT {} FROM cars WHERE id = ?", CAR_COLUMNS),
                vec![SqlValue::Integer(id)],
                Car::from_row,
            )
            .await
    }

    pub async fn get(&self, id: i64) -> GarageResult<Car> {
        self.find(id)
            .await?
            .ok_or_else(|| GarageError::NotFound(CAR_NOT_FOUND.to_string()))
    }

    /// Validates and inserts a new record, returning it as stored
    pub async fn create(&self, payload: CarPayload) -> GarageResult<Car> {
        let row = payload.into_new()?;

        let outcome = self
            .store
            .execute(
                "INSERT INTO cars (make, model, year, price, mileage, fuel_type, transmission, status)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
                    .to_string(),
                row_params(row),
            )
            .await?;

        let car = self.get(outcome.last_insert_id).await?;
        info!("Created car #{} ({} {})", car.id, car.make, car.model);
        Ok(car)
    }

    /// Applies a partial update. Fields without a usable value keep their
    /// stored value.
    pub async fn update(&self, id: i64, payload: CarPayload) -> GarageResult<Car> {
        let existing = self.get(id).await?;
        let row = payload.merge_into(&existing);

        let mut params = row_params(row);
        params.push(SqlValue::Integer(id));

        self.store
            .execute(
                "UPDATE cars
                 SET make = ?, model = ?, year = ?, price = ?, mileage = ?,
                     fuel_type = ?, transmission = ?, status = ?
                 WHERE id = ?"
                    .to_string(),
                params,
            )
            .await?;

        info!("Updated car #{}", id);
        self.get(id).await
    }

    /// Removes a record permanently
    pub async fn delete(&self, id: i64) -> GarageResult<()> {
        let outcome = self
            .store
            .execute(
                "DELETE FROM cars WHERE id = ?".to_string(),
                vec![SqlValue::Integer(id)],
            )
            .await?;

        if outcome.rows_affected == 0 {
            return Err(GarageError::NotFound(CAR_NOT_FOUND.to_string()));
        }

        info!("Deleted car #{}", id);
        Ok(())
    }
}

fn row_params(row: CarRow) -> Vec<SqlValue> {
    vec![
        row.make.into(),
        row.model.into(),
        row.year.into(),
        row.price.into(),
        row.mileage.into(),
        row.fuel_type.into(),
        row.transmission.into(),
        row.status.as_str().into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CarStatus;
    use crate::query::{ListParams, SortColumn, SortDirection};
    use crate::schema;
    use serde_json::json;

    async fn service(seed: bool) -> CarService {
        let store = Arc::new(GarageStore::in_memory().await.unwrap());
        schema::initialize(&store, seed).await.unwrap();
        CarService::new(store)
    }

    fn payload(body: serde_json::Value) -> CarPayload {
        CarPayload::from_json(&body)
    }

    fn filter(q: Option<&str>, status: Option<&str>, by: &str, dir: &str) -> CarFilter {
        CarFilter::from(ListParams {
            q: q.map(str::to_string),
            status: status.map(str::to_string),
            sort_by: Some(by.to_string()),
            sort_dir: Some(dir.to_string()),
        })
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_ids() {
        let svc = service(false).await;

        let a = svc
            .create(payload(json!({"make": "Audi", "model": "A4", "year": 2020, "price": 20000})))
            .await
            .unwrap();
        let b = svc
            .create(payload(json!({
                "make": "Škoda", "model": "Octavia", "year": 2018, "price": 12999.99,
                "mileage": 120000, "fuel_type": "diesel", "transmission": "manual", "status": "reserved"
            })))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.status, CarStatus::Available);
        assert_eq!(a.mileage, None);
        assert_eq!(b.make, "Škoda");
        assert_eq!(b.price, 12999.99);
        assert_eq!(b.mileage, Some(120000));
        assert_eq!(b.fuel_type.as_deref(), Some("diesel"));
        assert_eq!(b.status, CarStatus::Reserved);

        assert_eq!(svc.get(a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn test_create_invalid_writes_nothing() {
        let svc = service(false).await;
        let err = svc
            .create(payload(json!({"make": "Audi", "year": 2020, "price": 20000})))
            .await
            .unwrap_err();
        assert!(matches!(err, GarageError::Validation(_)));
        assert!(svc.list(&CarFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_created_at_and_id() {
        let svc = service(true).await;
        let before = svc.get(2).await.unwrap();

        let after = svc
            .update(2, payload(json!({"price": 0, "status": "sold", "mileage": 0})))
            .await
            .unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.price, before.price);
        assert_eq!(after.status, CarStatus::Sold);
        assert_eq!(after.mileage, Some(0));
    }

    #[tokio::test]
    async fn test_unknown_stored_status_reads_as_available() {
        let svc = service(true).await;
        svc.store()
            .execute(
                "UPDATE cars SET status = 'scrapped' WHERE id = 3".to_string(),
                vec![],
            )
            .await
            .unwrap();

        let car = svc.get(3).await.unwrap();
        assert_eq!(car.status, CarStatus::Available);
        assert_eq!(car.make, "BMW");

        let listed = svc.list(&CarFilter::default()).await.unwrap();
        let car = listed.iter().find(|c| c.id == 3).unwrap();
        assert_eq!(car.status, CarStatus::Available);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let svc = service(false).await;
        let err = svc.update(42, payload(json!({"make": "Fiat"}))).await.unwrap_err();
        assert!(matches!(err, GarageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let svc = service(true).await;

        let err = svc.delete(999).await.unwrap_err();
        assert!(matches!(err, GarageError::NotFound(_)));
        assert_eq!(svc.list(&CarFilter::default()).await.unwrap().len(), 5);

        svc.delete(3).await.unwrap();
        let remaining = svc.list(&CarFilter::default()).await.unwrap();
        assert_eq!(remaining.len(), 4);
        assert!(remaining.iter().all(|c| c.id != 3));
        assert!(matches!(svc.get(3).await, Err(GarageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sorting_is_monotonic() {
        let svc = service(true).await;

        for by in ["price", "year", "mileage", "created_at"] {
            for dir in ["ASC", "desc"] {
                let f = filter(None, None, by, dir);
                let cars = svc.list(&f).await.unwrap();
                assert_eq!(cars.len(), 5);

                let ordered = cars.windows(2).all(|w| {
                    let ord = match f.sort_by {
                        SortColumn::Price => w[0].price.partial_cmp(&w[1].price).unwrap(),
                        SortColumn::Year => w[0].year.cmp(&w[1].year),
                        SortColumn::Mileage => w[0].mileage.cmp(&w[1].mileage),
                        SortColumn::CreatedAt => w[0].created_at.cmp(&w[1].created_at),
                    };
                    match f.sort_dir {
                        SortDirection::Asc => ord.is_le(),
                        SortDirection::Desc => ord.is_ge(),
                    }
                });
                assert!(ordered, "{} {}", by, dir);
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_sort_falls_back_to_newest_first() {
        let svc = service(true).await;
        let newest = svc
            .create(payload(json!({"make": "Kia", "model": "Ceed", "year": 2021, "price": 17000})))
            .await
            .unwrap();

        let cars = svc.list(&filter(None, None, "make", "sideways")).await.unwrap();
        assert_eq!(cars[0].id, newest.id);
    }

    #[tokio::test]
    async fn test_search_matches_make_or_model() {
        let svc = service(true).await;

        let cars = svc.list(&filter(Some("golf"), None, "price", "ASC")).await.unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].make, "Volkswagen");

        let cars = svc.list(&filter(Some("o"), None, "price", "ASC")).await.unwrap();
        for car in &cars {
            let hay = format!("{} {}", car.make, car.model).to_lowercase();
            assert!(hay.contains('o'));
        }
        // Opel, Volkswagen, Toyota, Hyundai Ioniq; BMW 320d has no 'o'
        assert_eq!(cars.len(), 4);

        assert!(svc.list(&filter(Some("%"), None, "price", "ASC")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_filter_with_sort() {
        let svc = service(true).await;
        svc.create(payload(json!({
            "make": "Audi", "model": "A4", "year": 2020, "price": 9000, "status": "sold"
        })))
        .await
        .unwrap();

        let cars = svc.list(&filter(None, Some("sold"), "price", "ASC")).await.unwrap();
        assert_eq!(cars.len(), 2);
        assert!(cars.iter().all(|c| c.status == CarStatus::Sold));
        assert!(cars[0].price <= cars[1].price);
    }
}
