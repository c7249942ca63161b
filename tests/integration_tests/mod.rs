//! Integration tests module
//!
//! This module provides end-to-end tests for the lyricseek pipeline,
//! including:
//! - Complete search → rank → resolve → video lookup runs
//! - Strategy fallback and shared sessions
//! - Error handling and sentinel scenarios

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
