//! MySQL sink
//!
//! The sqlx driver is async; the sink owns a current-thread tokio runtime and
//! blocks on it for every call so the rest of the run stays synchronous.

use super::{RecordSink, SinkError};
use crate::records::Record;
use crate::types::{DatabaseSettings, TimestampFormat};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, instrument, warn};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sensor_readings (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    pgmid VARCHAR(32),
    vehicle_count INT UNSIGNED,
    peakspeed DOUBLE,
    timestamp VARCHAR(64),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
) ENGINE=InnoDB
"#;

const INSERT_SQL: &str = r#"
INSERT INTO sensor_readings (pgmid, vehicle_count, peakspeed, timestamp)
VALUES (?, ?, ?, ?)
"#;

/// Inserts each record into `sensor_readings`, one transaction per record
#[derive(Debug)]
pub struct DatabaseSink {
    runtime: Runtime,
    connection: MySqlConnection,
    format: TimestampFormat,
    rows_inserted: u64,
}

impl DatabaseSink {
    /// Name used in logs and statistics
    pub const NAME: &'static str = "database";

    /// Connect and make sure the table exists
    #[instrument(skip(settings), fields(host = ?settings.host, database = %settings.name))]
    pub fn connect(settings: &DatabaseSettings, format: TimestampFormat) -> Result<Self, SinkError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SinkError::Runtime)?;

        let options = connect_options(settings);
        let mut connection = runtime.block_on(MySqlConnection::connect_with(&options))?;
        runtime.block_on(sqlx::query(CREATE_TABLE_SQL).execute(&mut connection))?;

        info!(
            "Connected to MySQL at {}:{} (database {})",
            settings.host.as_deref().unwrap_or("localhost"),
            settings.port,
            settings.name
        );

        Ok(Self {
            runtime,
            connection,
            format,
            rows_inserted: 0,
        })
    }

    /// Rows committed by this sink
    pub fn rows_inserted(&self) -> u64 {
        self.rows_inserted
    }
}

/// Connection options for the configured server
pub fn connect_options(settings: &DatabaseSettings) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(settings.host.as_deref().unwrap_or("localhost"))
        .port(settings.port)
        .database(&settings.name);

    if let Some(user) = &settings.user {
        options = options.username(user);
    }
    if let Some(password) = &settings.password {
        options = options.password(password);
    }

    options
}

impl RecordSink for DatabaseSink {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        let row = record.to_row(self.format);
        let connection = &mut self.connection;

        self.runtime.block_on(async move {
            let mut tx = connection.begin().await?;
            let inserted = sqlx::query(INSERT_SQL)
                .bind(&row.pgmid)
                .bind(row.vehicle_count)
                .bind(row.peakspeed)
                .bind(&row.timestamp)
                .execute(&mut *tx)
                .await;

            match inserted {
                Ok(_) => tx.commit().await,
                Err(error) => {
                    if let Err(rollback_error) = tx.rollback().await {
                        warn!("Rollback after failed insert also failed: {}", rollback_error);
                    }
                    Err(error)
                }
            }
        })?;

        self.rows_inserted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_use_settings() {
        let settings = DatabaseSettings {
            write: true,
            host: Some("db.internal".to_string()),
            port: 3307,
            user: Some("sim".to_string()),
            password: Some("secret".to_string()),
            name: "traffic".to_string(),
        };

        let options = connect_options(&settings);
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_username(), "sim");
        assert_eq!(options.get_database(), Some("traffic"));
    }

    #[test]
    fn test_sql_targets_sensor_readings() {
        assert!(CREATE_TABLE_SQL.contains("CREATE TABLE IF NOT EXISTS sensor_readings"));
        for column in crate::records::RecordRow::field_names() {
            assert!(INSERT_SQL.contains(column), "insert is missing {}", column);
        }
    }
}
