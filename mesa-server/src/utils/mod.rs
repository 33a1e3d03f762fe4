//! Small helpers shared by handlers and services

pub mod validation;
