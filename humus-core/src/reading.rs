//! Sensor readings and uplink encoding

/// One smoothed sample cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Raw capacitance
    pub capacitance: u16,
    /// Temperature (°C × 10)
    pub temperature_x10: i16,
    /// Moisture, always within 0..=100
    pub moisture_pct: u8,
    /// False when no reading could be taken this cycle
    pub valid: bool,
}

/// Size of the uplink payload
pub const PAYLOAD_LEN: usize = 4;

impl Reading {
    /// Create a valid reading, clamping moisture to 100 %
    pub fn new(capacitance: u16, temperature_x10: i16, moisture_pct: u8) -> Self {
        Self {
            capacitance,
            temperature_x10,
            moisture_pct: moisture_pct.min(100),
            valid: true,
        }
    }

    /// Placeholder for a cycle where the sensor could not be read
    pub const fn invalid() -> Self {
        Self {
            capacitance: 0,
            temperature_x10: 0,
            moisture_pct: 0,
            valid: false,
        }
    }

    /// Temperature in whole degrees Celsius
    pub fn temperature_celsius(&self) -> i16 {
        self.temperature_x10 / 10
    }

    /// Encode for the uplink
    ///
    /// Layout:
    /// ```text
    /// ┌──────────────────┬──────────────┬───────┐
    /// │ TEMP (°C × 100)  │ MOIST (% × 2)│ VALID │
    /// │ i16 big-endian   │ u8           │ u8    │
    /// └──────────────────┴──────────────┴───────┘
    /// ```
    /// An invalid reading encodes as `FF FF FF 00`.
    pub fn payload(&self) -> [u8; PAYLOAD_LEN] {
        if !self.valid {
            return [0xFF, 0xFF, 0xFF, 0x00];
        }

        let temp_x100 = (self.temperature_x10 as i32 * 10).clamp(i16::MIN as i32, i16::MAX as i32);
        let [temp_hi, temp_lo] = (temp_x100 as i16).to_be_bytes();
        [temp_hi, temp_lo, self.moisture_pct.min(100) * 2, 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_moisture() {
        let reading = Reading::new(600, 215, 133);
        assert_eq!(reading.moisture_pct, 100);
        assert!(reading.valid);
    }

    #[test]
    fn test_payload_layout() {
        // 21.5°C, 33 %
        let reading = Reading::new(300, 215, 33);
        assert_eq!(reading.payload(), [0x08, 0x66, 66, 1]);
    }

    #[test]
    fn test_payload_negative_temperature() {
        let reading = Reading::new(300, -55, 0);
        let payload = reading.payload();
        assert_eq!(i16::from_be_bytes([payload[0], payload[1]]), -550);
    }

    #[test]
    fn test_payload_saturates_temperature() {
        let reading = Reading::new(300, 4000, 50);
        let payload = reading.payload();
        assert_eq!(i16::from_be_bytes([payload[0], payload[1]]), i16::MAX);
    }

    #[test]
    fn test_invalid_payload() {
        assert_eq!(Reading::invalid().payload(), [0xFF, 0xFF, 0xFF, 0x00]);
    }

    #[test]
    fn test_whole_degrees() {
        assert_eq!(Reading::new(0, 215, 0).temperature_celsius(), 21);
    }
}
