pub mod kyiv_date_time;
pub mod time_frame;
