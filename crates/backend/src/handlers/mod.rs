pub mod d400_seller_performance;
pub mod d401_rfv_overview;
pub mod d402_client_heatmap;

use chrono::NaiveDate;

/// Reference date for period windows
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
