//! ddscalc - DDS cycle time calculator and receiver stability analyzer
//!
//! Computes audio frame geometry and the 48 kHz-family cycle time for a
//! network MTU, generates the DDS host settings file, and grades clock
//! stability from receiver logs (network jitter and buffer corrections).

pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod log_parser;
pub mod log_source;
pub mod mtu;
pub mod quality;
pub mod reference;
pub mod report;
pub mod settings;
pub mod stats;
