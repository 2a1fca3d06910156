pub mod d400_seller_performance;
pub mod d401_rfv_overview;
pub mod d402_client_heatmap;
