//! Market-crash-risk classification pipeline.
//!
//! Turns a time-ordered close-price series into a binary crash-risk
//! classifier and serves point-in-time risk scores. The pipeline is a
//! single-threaded batch of pure transforms: prices are cleaned and
//! engineered into a fixed five-feature table, labeled from next-day
//! returns, split chronologically, fed to a random-forest classifier, and
//! the trained artifact — tagged with the exact feature order it was
//! trained on — is persisted for the predictor. Feature definitions at
//! training time and at inference time are the same code path, so they
//! cannot drift apart.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
