use crate::domain::entities::{NewSpecialist, Service, Specialist, SpecialistProfile, UserRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::directory_repository::DirectoryRepository;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

const PROFILE_QUERY: &str = "SELECT sp.id, u.name, sp.specialization, u.telegram_identity
     FROM specialists sp
     JOIN users u ON u.id = sp.user_id";

fn profile_from_row(row: &AnyRow) -> DomainResult<SpecialistProfile> {
    Ok(SpecialistProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        specialization: row.try_get("specialization")?,
        telegram_identity: row.try_get("telegram_identity")?,
    })
}

fn service_from_row(row: &AnyRow) -> DomainResult<Service> {
    Ok(Service {
        id: row.try_get("id")?,
        specialist_id: row.try_get("specialist_id")?,
        name: row.try_get("name")?,
    })
}

#[async_trait]
impl DirectoryRepository for Database {
    async fn onboard_specialist(&self, new: &NewSpecialist) -> DomainResult<Specialist> {
        let mut tx = self.pool.begin().await?;

        let user = self
            .assign_role_internal(
                &mut *tx,
                new.telegram_identity,
                &new.name,
                UserRole::Specialist,
            )
            .await?;

        let specialist_id: i64 = sqlx::query(
            "INSERT INTO specialists (user_id, specialization, description)
             VALUES (?, ?, ?)
             RETURNING id",
        )
        .bind(user.id)
        .bind(&new.specialization)
        .bind(&new.description)
        .fetch_one(&mut *tx)
        .await?
        .try_get("id")?;

        sqlx::query("INSERT INTO services (specialist_id, name) VALUES (?, ?)")
            .bind(specialist_id)
            .bind(&new.first_service)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO slots (specialist_id, date, time, is_booked) VALUES (?, ?, ?, 0)")
            .bind(specialist_id)
            .bind(new.first_slot.date_key())
            .bind(new.first_slot.time_key())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Specialist {
            id: specialist_id,
            user_id: user.id,
            specialization: new.specialization.clone(),
            description: new.description.clone(),
        })
    }

    async fn get_specialist(&self, id: i64) -> DomainResult<Option<SpecialistProfile>> {
        let row = sqlx::query(&format!("{} WHERE sp.id = ?", PROFILE_QUERY))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn find_specialist_by_user(&self, user_id: i64) -> DomainResult<Option<Specialist>> {
        let row = sqlx::query(
            "SELECT id, user_id, specialization, description FROM specialists WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Specialist {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                specialization: row.try_get("specialization")?,
                description: row.try_get("description")?,
            })),
            None => Ok(None),
        }
    }

    async fn list_specialists(&self) -> DomainResult<Vec<SpecialistProfile>> {
        let rows = sqlx::query(&format!("{} ORDER BY u.name, sp.id", PROFILE_QUERY))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn create_service(&self, specialist_id: i64, name: &str) -> DomainResult<Service> {
        let row = sqlx::query(
            "INSERT INTO services (specialist_id, name) VALUES (?, ?)
             RETURNING id, specialist_id, name",
        )
        .bind(specialist_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        service_from_row(&row)
    }

    async fn rename_service(&self, service_id: i64, name: &str) -> DomainResult<()> {
        let result = sqlx::query("UPDATE services SET name = ? WHERE id = ?")
            .bind(name)
            .bind(service_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("service #{}", service_id)));
        }
        Ok(())
    }

    async fn get_service(&self, id: i64) -> DomainResult<Option<Service>> {
        let row = sqlx::query("SELECT id, specialist_id, name FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(service_from_row).transpose()
    }

    async fn list_services(&self, specialist_id: i64) -> DomainResult<Vec<Service>> {
        let rows = sqlx::query(
            "SELECT id, specialist_id, name FROM services WHERE specialist_id = ? ORDER BY id",
        )
        .bind(specialist_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(service_from_row).collect()
    }
}
