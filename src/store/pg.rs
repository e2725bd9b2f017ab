//! Postgres-backed store.
//!
//! Thin translation between the [`RiskStore`] contract and SQL; no pipeline
//! logic lives here. The cycle transaction boundary maps directly onto
//! BEGIN/COMMIT/ROLLBACK on the single connection, so every write issued
//! during a recalculation cycle commits together or not at all.

use postgres::{Client, NoTls};

use crate::model::{Alert, AlertLevel, StoreError, WaterSource};
use crate::store::{NotificationRecord, Recipient, RiskStore};

pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connect to the database named by `url` (e.g. the `DATABASE_URL` env
    /// var loaded from `.env`).
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::connect(url, NoTls)?;
        Ok(PgStore { client })
    }

    fn alert_from_row(row: &postgres::Row) -> Result<Alert, StoreError> {
        let level_str: String = row.get(3);
        let level = AlertLevel::parse(&level_str)
            .ok_or_else(|| StoreError::Database(format!("unknown alert level: {}", level_str)))?;
        Ok(Alert {
            id: row.get(0),
            water_source_id: row.get(1),
            organization_id: row.get(2),
            level,
            message: row.get(4),
            acknowledged: row.get(5),
            created_at: row.get(6),
        })
    }
}

impl RiskStore for PgStore {
    fn get_all_sources(&mut self) -> Result<Vec<WaterSource>, StoreError> {
        let rows = self.client.query(
            "SELECT id, name, latitude, longitude, rainfall, water_level, risk_score,
                    organization_id
             FROM water_sources
             ORDER BY id",
            &[],
        )?;

        Ok(rows
            .iter()
            .map(|row| WaterSource {
                id: row.get(0),
                name: row.get(1),
                latitude: row.get(2),
                longitude: row.get(3),
                rainfall: row.get(4),
                water_level: row.get(5),
                risk_score: row.get(6),
                organization_id: row.get(7),
            })
            .collect())
    }

    fn update_readings(
        &mut self,
        source_id: i32,
        rainfall: f64,
        water_level: f64,
    ) -> Result<(), StoreError> {
        let updated = self.client.execute(
            "UPDATE water_sources SET rainfall = $2, water_level = $3 WHERE id = $1",
            &[&source_id, &rainfall, &water_level],
        )?;
        if updated == 0 {
            return Err(StoreError::SourceNotFound(source_id));
        }
        Ok(())
    }

    fn update_risk_score(&mut self, source_id: i32, score: f64) -> Result<(), StoreError> {
        let updated = self.client.execute(
            "UPDATE water_sources SET risk_score = $2 WHERE id = $1",
            &[&source_id, &score],
        )?;
        if updated == 0 {
            return Err(StoreError::SourceNotFound(source_id));
        }
        Ok(())
    }

    fn append_history(
        &mut self,
        source_id: i32,
        organization_id: i32,
        score: i32,
    ) -> Result<(), StoreError> {
        self.client.execute(
            "INSERT INTO risk_history (water_source_id, organization_id, risk_score, recorded_at)
             VALUES ($1, $2, $3, now())",
            &[&source_id, &organization_id, &score],
        )?;
        Ok(())
    }

    fn recent_scores(&mut self, source_id: i32, limit: usize) -> Result<Vec<f64>, StoreError> {
        let rows = self.client.query(
            "SELECT risk_score
             FROM risk_history
             WHERE water_source_id = $1
             ORDER BY recorded_at DESC, id DESC
             LIMIT $2",
            &[&source_id, &(limit as i64)],
        )?;

        // Query is newest-first for the LIMIT; flip to most-recent-last for
        // the trend analyzer.
        let mut scores: Vec<f64> = rows.iter().map(|r| r.get::<_, i32>(0) as f64).collect();
        scores.reverse();
        Ok(scores)
    }

    fn full_history(&mut self, source_id: i32) -> Result<Vec<f64>, StoreError> {
        let rows = self.client.query(
            "SELECT risk_score
             FROM risk_history
             WHERE water_source_id = $1
             ORDER BY recorded_at ASC, id ASC",
            &[&source_id],
        )?;
        Ok(rows.iter().map(|r| r.get::<_, i32>(0) as f64).collect())
    }

    fn open_alert(&mut self, source_id: i32) -> Result<Option<Alert>, StoreError> {
        let row = self.client.query_opt(
            "SELECT id, water_source_id, organization_id, level, message, acknowledged,
                    created_at
             FROM alerts
             WHERE water_source_id = $1 AND acknowledged = FALSE
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
            &[&source_id],
        )?;

        row.as_ref().map(Self::alert_from_row).transpose()
    }

    fn create_alert(
        &mut self,
        source_id: i32,
        organization_id: i32,
        level: AlertLevel,
        message: &str,
    ) -> Result<Alert, StoreError> {
        let row = self.client.query_one(
            "INSERT INTO alerts (water_source_id, organization_id, level, message, acknowledged,
                                 created_at)
             VALUES ($1, $2, $3, $4, FALSE, now())
             RETURNING id, water_source_id, organization_id, level, message, acknowledged,
                       created_at",
            &[&source_id, &organization_id, &level.as_str(), &message],
        )?;

        Self::alert_from_row(&row)
    }

    fn notification_recipients(&mut self, organization_id: i32) -> Result<Vec<Recipient>, StoreError> {
        let rows = self.client.query(
            "SELECT id, expo_push_token
             FROM users
             WHERE organization_id = $1
               AND expo_push_token IS NOT NULL
               AND push_notifications_enabled = TRUE",
            &[&organization_id],
        )?;

        Ok(rows
            .iter()
            .map(|row| Recipient {
                user_id: row.get(0),
                expo_push_token: row.get(1),
            })
            .collect())
    }

    fn record_notification(&mut self, record: &NotificationRecord) -> Result<(), StoreError> {
        self.client.execute(
            "INSERT INTO push_notifications
                 (user_id, alert_id, title, body, data, status, expo_ticket_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, now())",
            &[
                &record.user_id,
                &record.alert_id,
                &record.title,
                &record.body,
                &record.data,
                &record.status.as_str(),
                &record.ticket_id,
            ],
        )?;
        Ok(())
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.client.batch_execute("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.client.batch_execute("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.client.batch_execute("ROLLBACK")?;
        Ok(())
    }
}
