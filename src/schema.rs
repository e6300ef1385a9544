//! Table definition and sample inventory.

use crate::db::GarageStore;
use crate::error::GarageResult;
use tracing::{debug, info};

const CREATE_CARS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cars (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    year INTEGER NOT NULL,
    price REAL NOT NULL,
    mileage INTEGER,
    fuel_type TEXT,
    transmission TEXT,
    status TEXT DEFAULT 'available',
    created_at TEXT DEFAULT (datetime('now'))
);
"#;

const SEED_CARS: &str = r#"
INSERT INTO cars (make, model, year, price, mileage, fuel_type, transmission, status) VALUES
    ('Opel', 'Astra J Sports Tourer', 2013, 7500.00, 214000, 'diesel', 'manual', 'available'),
    ('Volkswagen', 'Golf 7', 2016, 11500.00, 160000, 'diesel', 'manual', 'reserved'),
    ('BMW', '320d', 2015, 14500.00, 190000, 'diesel', 'automatic', 'sold'),
    ('Toyota', 'Corolla', 2019, 15500.00, 90000, 'petrol', 'automatic', 'available'),
    ('Hyundai', 'Ioniq 5', 2022, 43000.00, 25000, 'electric', 'automatic', 'available');
"#;

/// Number of rows inserted by [`seed_if_empty`]
pub const SEED_COUNT: u64 = 5;

/// Creates the `cars` table if it does not exist yet
pub async fn create_tables(store: &GarageStore) -> GarageResult<()> {
    store.execute_batch(CREATE_CARS_TABLE.to_string()).await?;
    debug!("cars table ready");
    Ok(())
}

/// Inserts the sample inventory when the table has no rows.
///
/// Returns whether anything was inserted.
pub async fn seed_if_empty(store: &GarageStore) -> GarageResult<bool> {
    let count = store
        .fetch_one("SELECT COUNT(*) FROM cars".to_string(), vec![], |row| {
            row.get::<_, i64>(0)
        })
        .await?
        .unwrap_or(0);

    if count > 0 {
        debug!("cars table holds {} rows, skipping seed", count);
        return Ok(false);
    }

    info!("Seeding {} sample cars", SEED_COUNT);
    store.execute_batch(SEED_CARS.to_string()).await?;
    Ok(true)
}

/// Creates the schema and, when `seed` is set, the sample rows
pub async fn initialize(store: &GarageStore, seed: bool) -> GarageResult<()> {
    create_tables(store).await?;
    if seed {
        seed_if_empty(store).await?;
    }
    Ok(())
}
