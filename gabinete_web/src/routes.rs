use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gabinete::domain::{
    core::{Reservation, ReservationDraft, ReservationId, ReservationRepository},
    ledger::{BookingLedger, Clock, LedgerError},
    Entity,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

type SharedLedger<R, C> = Arc<BookingLedger<R, C>>;

pub fn router<R, C>(ledger: BookingLedger<R, C>) -> Router
where
    R: ReservationRepository + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/reservations", get(list::<R, C>).post(create::<R, C>))
        .route(
            "/reservations/:id",
            get(show::<R, C>)
                .put(update::<R, C>)
                .delete(delete::<R, C>),
        )
        .with_state(Arc::new(ledger))
}

/// 予約フォーム
#[derive(Debug, Deserialize)]
pub struct BookingForm {
    professor: String,
    shift: String,
    room: i64,
    date: String,
}

impl TryFrom<BookingForm> for ReservationDraft {
    type Error = LedgerError;

    fn try_from(form: BookingForm) -> Result<Self, Self::Error> {
        Ok(ReservationDraft::parse(
            &form.professor,
            &form.shift,
            form.room,
            &form.date,
        )?)
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationView {
    id: i64,
    professor: String,
    shift: String,
    room: i64,
    date: String,
    date_display: String,
}

impl From<&Reservation> for ReservationView {
    fn from(value: &Reservation) -> Self {
        Self {
            id: *value.id(),
            professor: value.professor().to_owned(),
            shift: value.shift().to_string(),
            room: *value.room(),
            date: value.date().to_string(),
            date_display: value.date().to_display_string(),
        }
    }
}

async fn list<R, C>(
    State(ledger): State<SharedLedger<R, C>>,
) -> Result<Json<Vec<ReservationView>>, AppError>
where
    R: ReservationRepository,
    C: Clock,
{
    let reservations = ledger.list().await?;
    Ok(Json(reservations.iter().map(ReservationView::from).collect()))
}

async fn show<R, C>(
    State(ledger): State<SharedLedger<R, C>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ReservationView>, AppError>
where
    R: ReservationRepository,
    C: Clock,
{
    let Path(id) = path?;
    let reservation = ledger.get(ReservationId::from(id)).await?;
    Ok(Json(ReservationView::from(&reservation)))
}

async fn create<R, C>(
    State(ledger): State<SharedLedger<R, C>>,
    payload: Result<Json<BookingForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ReservationView>), AppError>
where
    R: ReservationRepository,
    C: Clock,
{
    let Json(form) = payload?;
    let reservation = ledger.create(form.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(ReservationView::from(&reservation))))
}

async fn update<R, C>(
    State(ledger): State<SharedLedger<R, C>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookingForm>, JsonRejection>,
) -> Result<Json<ReservationView>, AppError>
where
    R: ReservationRepository,
    C: Clock,
{
    let Path(id) = path?;
    let Json(form) = payload?;
    let reservation = ledger
        .update(ReservationId::from(id), form.try_into()?)
        .await?;
    Ok(Json(ReservationView::from(&reservation)))
}

async fn delete<R, C>(
    State(ledger): State<SharedLedger<R, C>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError>
where
    R: ReservationRepository,
    C: Clock,
{
    let Path(id) = path?;
    ledger.delete(ReservationId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
