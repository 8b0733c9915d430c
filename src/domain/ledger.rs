//! 予約台帳
//!
//! Enforces the two booking rules on every write: no bookings for past dates,
//! and at most one reservation per slot (date, shift, room).

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::core::{
    BookingDate, Reservation, ReservationDraft, ReservationError, ReservationId,
    ReservationRepository, Slot,
};
use crate::domain::{DataAccessError, Entity};

/// 今日の日付を返す時計
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// ローカルタイムゾーンの暦日
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// 固定日付の時計
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LedgerOptions {
    /// Apply the past-date rule to edits as well as new bookings.
    #[serde(default)]
    pub reject_past_dates_on_update: bool,
}

/// 台帳エラー
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("cannot book a past date: {date}")]
    PastDate { date: BookingDate },
    #[error(
        "room {} is already booked for shift {} on {}",
        .slot.room,
        .slot.shift,
        .slot.date
    )]
    Conflict { slot: Slot },
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: ReservationId,
    },
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ReservationError),
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl LedgerError {
    fn not_found(id: ReservationId) -> Self {
        Self::NotFound {
            entity: Reservation::ENTITY_NAME,
            id,
        }
    }
}

pub struct BookingLedger<R, C = SystemClock> {
    repository: R,
    clock: C,
    options: LedgerOptions,
}

impl<R: ReservationRepository> BookingLedger<R> {
    pub fn new(repository: R, options: LedgerOptions) -> Self {
        Self::with_clock(repository, SystemClock, options)
    }
}

impl<R: ReservationRepository, C: Clock> BookingLedger<R, C> {
    pub fn with_clock(repository: R, clock: C, options: LedgerOptions) -> Self {
        Self {
            repository,
            clock,
            options,
        }
    }

    /// 予約を作成する
    pub async fn create(&self, draft: ReservationDraft) -> Result<Reservation, LedgerError> {
        let slot = draft.slot().clone();
        self.ensure_not_past(slot.date)?;
        if let Some(existing) = self.repository.find_by_slot(&slot).await? {
            warn!("予約枠が埋まっています: {} (予約 {})", slot, existing.id());
            return Err(LedgerError::Conflict { slot });
        }
        match self.repository.insert(&draft).await {
            Ok(reservation) => {
                info!("予約を作成しました: {} ({})", reservation.id(), slot);
                Ok(reservation)
            }
            Err(e) if e.is_unique_violation() => {
                warn!("同時予約により予約枠が埋まりました: {}", slot);
                Err(LedgerError::Conflict { slot })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 全予約を日付の降順で取得する
    pub async fn list(&self) -> Result<Vec<Reservation>, LedgerError> {
        Ok(self.repository.find_all().await?)
    }

    /// IDで予約を取得する
    pub async fn get(&self, id: ReservationId) -> Result<Reservation, LedgerError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(id))
    }

    /// 予約を更新する
    pub async fn update(
        &self,
        id: ReservationId,
        draft: ReservationDraft,
    ) -> Result<Reservation, LedgerError> {
        let mut reservation = self.get(id).await?;
        let slot = draft.slot().clone();
        if self.options.reject_past_dates_on_update {
            self.ensure_not_past(slot.date)?;
        }
        if let Some(other) = self.repository.find_by_slot(&slot).await? {
            if other.id() != id {
                warn!("予約枠が埋まっています: {} (予約 {})", slot, other.id());
                return Err(LedgerError::Conflict { slot });
            }
        }
        reservation.revise(draft);
        match self.repository.update(&reservation).await {
            Ok(true) => {
                info!("予約を更新しました: {} ({})", id, slot);
                Ok(reservation)
            }
            Ok(false) => Err(LedgerError::not_found(id)),
            Err(e) if e.is_unique_violation() => {
                warn!("同時予約により予約枠が埋まりました: {}", slot);
                Err(LedgerError::Conflict { slot })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 予約を削除する
    pub async fn delete(&self, id: ReservationId) -> Result<(), LedgerError> {
        if self.repository.delete(id).await? {
            info!("予約を取り消しました: {}", id);
            Ok(())
        } else {
            Err(LedgerError::not_found(id))
        }
    }

    fn ensure_not_past(&self, date: BookingDate) -> Result<(), LedgerError> {
        if date.is_before(self.clock.today()) {
            warn!("過去の日付は予約できません: {}", date);
            return Err(LedgerError::PastDate { date });
        }
        Ok(())
    }
}
