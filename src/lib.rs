//! TTB Label Verification System
//!
//! Checks whether claimed alcohol-label attributes (brand name, product
//! type, alcohol content, net contents, government warning) actually appear,
//! in some recognizable form, in text recovered from a photograph of the
//! label. The matching engine in [`services::verification`] tolerates
//! common OCR noise while reporting *why* a field failed, not just that it
//! did.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
