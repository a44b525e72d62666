//! Topics server library

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod form;
pub mod paths;
pub mod supervisor;
pub mod topic;
pub mod validation;

pub mod test_helpers;
