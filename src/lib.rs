//! LaserCalc - Manufacturing cost calculators with a blog admin backend
//!
//! This library provides the core functionality for the LaserCalc backend:
//! the calculator engine, content and subscriber management, and the HTTP API.

pub mod api;
pub mod calculators;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
