//! Measurement database operations

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::Measurement;
use ppm_common::{Error, Result};

/// Insert a measurement and return it with its assigned identity.
///
/// The store owns identity: a fresh UUID is assigned here regardless of any
/// id already present on the value.
pub async fn insert_measurement(pool: &SqlitePool, measurement: &Measurement) -> Result<Measurement> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO measurements (
            id, b, fit_frequency, fft_frequency, fft_amplitude, t0, a,
            x0_error, f_error, t0_error, a_error, y0_error,
            taken_at, sample_rate, number_of_samples
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(measurement.b)
    .bind(measurement.fit_frequency)
    .bind(measurement.fft_frequency)
    .bind(measurement.fft_amplitude)
    .bind(measurement.t0)
    .bind(measurement.a)
    .bind(measurement.x0_error)
    .bind(measurement.f_error)
    .bind(measurement.t0_error)
    .bind(measurement.a_error)
    .bind(measurement.y0_error)
    .bind(measurement.taken_at)
    .bind(measurement.sample_rate)
    .bind(measurement.number_of_samples)
    .execute(pool)
    .await?;

    Ok(Measurement {
        id: Some(id),
        ..measurement.clone()
    })
}

/// Load one measurement by its identity
pub async fn get_measurement(pool: &SqlitePool, id: Uuid) -> Result<Option<Measurement>> {
    let row = sqlx::query(
        r#"
        SELECT id, b, fit_frequency, fft_frequency, fft_amplitude, t0, a,
               x0_error, f_error, t0_error, a_error, y0_error,
               taken_at, sample_rate, number_of_samples
        FROM measurements
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(measurement_from_row).transpose()
}

/// List all measurements, newest first
pub async fn list_measurements(pool: &SqlitePool) -> Result<Vec<Measurement>> {
    let rows = sqlx::query(
        r#"
        SELECT id, b, fit_frequency, fft_frequency, fft_amplitude, t0, a,
               x0_error, f_error, t0_error, a_error, y0_error,
               taken_at, sample_rate, number_of_samples
        FROM measurements
        ORDER BY taken_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(measurement_from_row).collect()
}

fn measurement_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Measurement> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Invalid measurement id {:?}: {}", id, e)))?;

    Ok(Measurement {
        id: Some(id),
        b: row.get("b"),
        fit_frequency: row.get("fit_frequency"),
        fft_frequency: row.get("fft_frequency"),
        fft_amplitude: row.get("fft_amplitude"),
        t0: row.get("t0"),
        a: row.get("a"),
        x0_error: row.get("x0_error"),
        f_error: row.get("f_error"),
        t0_error: row.get("t0_error"),
        a_error: row.get("a_error"),
        y0_error: row.get("y0_error"),
        taken_at: row.get("taken_at"),
        sample_rate: row.get("sample_rate"),
        number_of_samples: row.get("number_of_samples"),
    })
}
