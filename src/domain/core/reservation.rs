use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::domain::{DataAccessError, Entity, Id};

use super::{BookingDate, RoomNumber, ShiftCode, Slot, SHIFT_MAX_LEN};

/// 教員名の最大長
pub const PROFESSOR_MAX_LEN: usize = 100;

/// 予約リポジトリ
#[async_trait::async_trait]
pub trait ReservationRepository: Send + Sync {
    /// IDで予約を検索する
    async fn find_by_id(&self, id: ReservationId) -> Result<Option<Reservation>, DataAccessError>;
    /// 予約枠で予約を検索する
    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Reservation>, DataAccessError>;
    /// 全予約を日付の降順で取得する
    async fn find_all(&self) -> Result<Vec<Reservation>, DataAccessError>;
    /// 新しい予約を登録する
    async fn insert(&self, draft: &ReservationDraft) -> Result<Reservation, DataAccessError>;
    /// 予約を更新する
    async fn update(&self, entity: &Reservation) -> Result<bool, DataAccessError>;
    /// 予約を削除する
    async fn delete(&self, id: ReservationId) -> Result<bool, DataAccessError>;
}

/// 予約ID
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct ReservationId(i64);

impl Id for ReservationId {
    type Inner = i64;
}

/// 検証済みの予約内容
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservationDraft {
    professor: String,
    slot: Slot,
}

impl ReservationDraft {
    /// Validates raw form input and normalises it.
    pub fn parse(
        professor: &str,
        shift: &str,
        room: i64,
        date: &str,
    ) -> Result<Self, ReservationError> {
        let professor = Self::validate_professor(professor)?;
        let shift = ShiftCode::parse(shift)?;
        let date = date.parse::<BookingDate>()?;
        Ok(Self {
            professor,
            slot: Slot {
                date,
                shift,
                room: RoomNumber::from(room),
            },
        })
    }

    pub fn professor(&self) -> &str {
        &self.professor
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    fn validate_professor(professor: &str) -> Result<String, ReservationError> {
        let professor = professor.trim();
        if professor.is_empty() {
            return Err(ReservationError::ProfessorRequired);
        }
        if professor.chars().count() > PROFESSOR_MAX_LEN {
            return Err(ReservationError::ProfessorTooLong);
        }
        Ok(professor.to_owned())
    }
}

/// 予約エンティティ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    professor: String,
    shift: ShiftCode,
    room: RoomNumber,
    date: BookingDate,
}

impl Reservation {
    pub fn create(id: ReservationId, draft: ReservationDraft) -> Self {
        let ReservationDraft { professor, slot } = draft;
        Self {
            id,
            professor,
            shift: slot.shift,
            room: slot.room,
            date: slot.date,
        }
    }

    /// Overwrites all four business fields.
    pub fn revise(&mut self, draft: ReservationDraft) {
        let ReservationDraft { professor, slot } = draft;
        self.professor = professor;
        self.shift = slot.shift;
        self.room = slot.room;
        self.date = slot.date;
    }

    pub fn professor(&self) -> &str {
        &self.professor
    }

    pub fn shift(&self) -> &ShiftCode {
        &self.shift
    }

    pub fn room(&self) -> RoomNumber {
        self.room
    }

    pub fn date(&self) -> BookingDate {
        self.date
    }

    pub fn slot(&self) -> Slot {
        Slot {
            date: self.date,
            shift: self.shift.clone(),
            room: self.room,
        }
    }
}

impl Entity for Reservation {
    type Id = ReservationId;

    const ENTITY_NAME: &'static str = "reservation";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// 予約エラー
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// 教員名が指定されていません
    #[display(fmt = "Professor name is required")]
    ProfessorRequired,
    /// 教員名が長すぎます
    #[display(fmt = "Professor name is longer than {} characters", PROFESSOR_MAX_LEN)]
    ProfessorTooLong,
    /// シフトが指定されていません
    #[display(fmt = "Shift is required")]
    ShiftRequired,
    /// シフトが長すぎます
    #[display(fmt = "Shift is longer than {} characters", SHIFT_MAX_LEN)]
    ShiftTooLong,
    /// 日付の形式が不正です
    #[display(fmt = "Invalid date {:?}, expected YYYY-MM-DD", _0)]
    InvalidDate(#[error(not(source))] String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(professor: &str, shift: &str, room: i64, date: &str) -> ReservationDraft {
        ReservationDraft::parse(professor, shift, room, date).unwrap()
    }

    #[test]
    fn test_draft_parse_normalises_input() {
        let draft = draft("  Ana ", " morning", 101, " 2099-01-01 ");
        assert_eq!(draft.professor(), "Ana");
        assert_eq!(draft.slot().shift.as_str(), "morning");
        assert_eq!(*draft.slot().room, 101);
        assert_eq!(draft.slot().date.to_string(), "2099-01-01");
    }

    #[test]
    fn test_draft_parse_errors() {
        assert_eq!(
            ReservationDraft::parse("", "morning", 1, "2099-01-01"),
            Err(ReservationError::ProfessorRequired)
        );
        assert_eq!(
            ReservationDraft::parse(&"a".repeat(PROFESSOR_MAX_LEN + 1), "morning", 1, "2099-01-01"),
            Err(ReservationError::ProfessorTooLong)
        );
        assert_eq!(
            ReservationDraft::parse("Ana", "", 1, "2099-01-01"),
            Err(ReservationError::ShiftRequired)
        );
        assert_eq!(
            ReservationDraft::parse("Ana", "morning", 1, "2099/01/01"),
            Err(ReservationError::InvalidDate("2099/01/01".to_owned()))
        );
    }

    #[test]
    fn test_reservation_create_and_revise() {
        let mut reservation = Reservation::create(
            ReservationId::from(5),
            draft("Ana", "morning", 101, "2099-01-01"),
        );
        assert_eq!(reservation.id(), ReservationId::from(5));
        assert_eq!(reservation.professor(), "Ana");

        reservation.revise(draft("Bia", "afternoon", 102, "2099-02-01"));
        assert_eq!(reservation.id(), ReservationId::from(5));
        assert_eq!(reservation.professor(), "Bia");
        assert_eq!(reservation.shift().as_str(), "afternoon");
        assert_eq!(*reservation.room(), 102);
        assert_eq!(reservation.date().to_string(), "2099-02-01");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ReservationError::InvalidDate("tomorrow".to_owned()).to_string(),
            "Invalid date \"tomorrow\", expected YYYY-MM-DD"
        );
        assert_eq!(
            ReservationError::ShiftTooLong.to_string(),
            "Shift is longer than 20 characters"
        );
    }
}
