//! Notifications published to consumers

use crate::processing::DecodedFrame;
use serde::Serialize;

/// One processed packet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameEvent {
    pub sensor_id: u8,
    pub frame: DecodedFrame,
}

/// Acceleration variance above threshold on one slip poll
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlipEvent {
    pub sensor_id: u8,
    /// Window variance that triggered the event
    pub variance: f64,
}
