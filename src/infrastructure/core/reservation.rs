use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::domain::core::{
    Reservation, ReservationDraft, ReservationId, ReservationRepository, Slot,
};
use crate::domain::{DataAccessError, Entity};

const SELECT_RESERVATIONS: &str = "SELECT id, professor, shift, room, date FROM reservations";

#[derive(Clone)]
pub struct SqliteReservationRepository {
    pool: SqlitePool,
}

impl SqliteReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepository {
    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>, DataAccessError> {
        sqlx::query_as::<_, ReservationRow>(&format!("{SELECT_RESERVATIONS} WHERE id = ?"))
            .bind(*id)
            .fetch_optional(&self.pool)
            .await?
            .map(Reservation::try_from)
            .transpose()
    }

    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Reservation>, DataAccessError> {
        sqlx::query_as::<_, ReservationRow>(&format!(
            "{SELECT_RESERVATIONS} WHERE date = ? AND shift = ? AND room = ? LIMIT 1"
        ))
        .bind(slot.date.to_string())
        .bind(slot.shift.as_str())
        .bind(*slot.room)
        .fetch_optional(&self.pool)
        .await?
        .map(Reservation::try_from)
        .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Reservation>, DataAccessError> {
        sqlx::query_as::<_, ReservationRow>(&format!(
            "{SELECT_RESERVATIONS} ORDER BY date DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Reservation::try_from)
        .collect()
    }

    async fn insert(&self, draft: &ReservationDraft) -> Result<Reservation, DataAccessError> {
        let slot = draft.slot();
        let result = sqlx::query(
            "INSERT INTO reservations (professor, shift, room, date) VALUES (?, ?, ?, ?)",
        )
        .bind(draft.professor())
        .bind(slot.shift.as_str())
        .bind(*slot.room)
        .bind(slot.date.to_string())
        .execute(&self.pool)
        .await?;
        Ok(Reservation::create(
            ReservationId::from(result.last_insert_rowid()),
            draft.clone(),
        ))
    }

    async fn update(&self, entity: &Reservation) -> Result<bool, DataAccessError> {
        let result = sqlx::query(
            "UPDATE reservations SET professor = ?, shift = ?, room = ?, date = ? WHERE id = ?",
        )
        .bind(entity.professor())
        .bind(entity.shift().as_str())
        .bind(*entity.room())
        .bind(entity.date().to_string())
        .bind(*entity.id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ReservationId) -> Result<bool, DataAccessError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(*id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct ReservationRow {
    id: i64,
    professor: String,
    shift: String,
    room: i64,
    date: String,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DataAccessError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let draft = ReservationDraft::parse(&row.professor, &row.shift, row.room, &row.date)
            .map_err(|e| DataAccessError::ReadError(Box::new(e)))?;
        Ok(Reservation::create(ReservationId::from(row.id), draft))
    }
}
