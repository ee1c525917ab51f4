//! Sample exhibits inserted into an empty database.

use sqlx::SqlitePool;

use crate::models::exhibit::CreateExhibit;
use crate::repositories::ExhibitRepo;

/// (name, description, location, t_min, t_max, h_min, h_max, v_max)
type SampleExhibit = (&'static str, &'static str, &'static str, f64, f64, f64, f64, f64);

const SAMPLE_EXHIBITS: [SampleExhibit; 4] = [
    (
        "ESP32 Real Sensors",
        "Live data from ESP32 device",
        "Gallery A",
        20.0,
        30.0,
        40.0,
        65.0,
        100.0,
    ),
    (
        "Ancient Egyptian Artifacts",
        "Collection of ancient Egyptian pottery and tools",
        "Gallery B",
        18.0,
        22.0,
        45.0,
        55.0,
        0.3,
    ),
    (
        "Modern Art Collection",
        "Contemporary paintings and sculptures",
        "Gallery C",
        19.0,
        23.0,
        40.0,
        60.0,
        0.4,
    ),
    (
        "Natural History Display",
        "Fossils and geological specimens",
        "Gallery D",
        18.0,
        24.0,
        42.0,
        58.0,
        0.5,
    ),
];

/// Insert the sample exhibits if the table is empty.
///
/// Returns the number of exhibits inserted (0 when data already exists).
/// The first sample is the one wired to the real ESP32 device by default.
/// All four go in one transaction, so a failed seed leaves the table empty
/// and is retried on the next start.
pub async fn seed_sample_exhibits(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    if ExhibitRepo::count(pool).await? > 0 {
        tracing::debug!("Exhibits already present, skipping sample seed");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for input in sample_exhibits() {
        ExhibitRepo::create(&mut *tx, &input).await?;
        inserted += 1;
    }
    tx.commit().await?;

    tracing::info!(count = inserted, "Sample exhibits added to database");
    Ok(inserted)
}

/// Create DTOs for the sample exhibits, in seed order.
pub fn sample_exhibits() -> impl Iterator<Item = CreateExhibit> {
    SAMPLE_EXHIBITS.iter().map(
        |&(name, description, location, t_min, t_max, h_min, h_max, v_max)| CreateExhibit {
            name: name.to_string(),
            description: Some(description.to_string()),
            location: Some(location.to_string()),
            temperature_min: Some(t_min),
            temperature_max: Some(t_max),
            humidity_min: Some(h_min),
            humidity_max: Some(h_max),
            vibration_max: Some(v_max),
        },
    )
}
