//! Thermal bridges at junctions between building elements.

use ds_core::Real;
use serde::{Deserialize, Serialize};

/// A linear (psi * length) or point (chi) thermal bridge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ThermalBridge {
    Linear {
        /// Linear thermal transmittance, W/(m K).
        linear_thermal_transmittance: Real,
        /// Length of the junction, m.
        length: Real,
    },
    Point {
        /// Heat transfer coefficient of the bridge, W/K.
        heat_transfer_coefficient: Real,
    },
}

impl ThermalBridge {
    /// Heat transfer coefficient of the bridge, W/K.
    pub fn heat_transfer_coefficient(&self) -> Real {
        match *self {
            ThermalBridge::Linear {
                linear_thermal_transmittance,
                length,
            } => linear_thermal_transmittance * length,
            ThermalBridge::Point {
                heat_transfer_coefficient,
            } => heat_transfer_coefficient,
        }
    }
}
