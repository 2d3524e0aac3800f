pub mod configuration;
pub mod repository;
mod schedules;
mod subscriber_settings;
