pub mod auth;
pub mod comments;
pub mod identity;
pub mod ideas;

use axum::http::StatusCode;

use pulse_db::StoreError;

pub(crate) fn store_status(e: StoreError) -> StatusCode {
    match e {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
