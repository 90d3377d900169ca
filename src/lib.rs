pub mod booking;
pub mod calendar;
pub mod cleanup;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod model;
pub mod query;
pub mod repository;
pub mod schedule;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod util;
