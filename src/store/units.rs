//! Well-known unit id assignments
//!
//! Ids below [`UNIT_USER_BASE`] are reserved for configuration the firmware
//! itself consumes. Anything at or above it is free for caller-defined use.
//! Id 0 is never a key (it marks tombstoned records) and ids with a nonzero
//! top byte are rejected by the engine.

use super::record::UnitId;

/// Network SSID
pub const UNIT_NET_SSID: UnitId = 10;

/// Network password
pub const UNIT_NET_PASS: UnitId = 11;

/// MQTT broker host
pub const UNIT_MQTT_HOST: UnitId = 20;

/// MQTT broker port
pub const UNIT_MQTT_PORT: UnitId = 21;

/// MQTT user name
pub const UNIT_MQTT_USER: UnitId = 22;

/// MQTT password
pub const UNIT_MQTT_PASS: UnitId = 23;

/// First id free for caller-defined units
pub const UNIT_USER_BASE: UnitId = 256;
