pub mod transport_mode;
pub mod trip_record;
pub mod trip_status;
