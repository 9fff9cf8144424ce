//! ESP32-S3 firmware-specific modules for aqua-rs
//!
//! Hardware adapters for the ports defined in `aqua-core`: the ADC1 probe
//! inputs, the Wi-Fi link and the TCP transport used for uploads. None of
//! this compiles on desktop targets.

#![no_std]

extern crate alloc;

pub mod adc;
pub mod net;
pub mod wifi;
pub mod wifi_secrets;
