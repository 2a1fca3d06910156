pub mod a001_sales_record;
pub mod a002_rfv_entry;
pub mod a003_seller;
pub mod a004_client_geoloc;
