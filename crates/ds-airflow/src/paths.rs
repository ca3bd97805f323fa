//! Pressure-driven airflow paths through the envelope.
//!
//! Every path obeys an orifice-type power law: flow is proportional to
//! `sign(dp) * |dp|^n` with a path-specific coefficient. The pressure
//! difference at a path combines the wind pressure on its facade, the
//! stack term from its height, and the trial internal reference pressure.

use ds_core::air::{G, RHO_A_REF, T_E_REF};
use ds_core::{Real, SimulationTimeIteration};
use ds_controls::OnOffTimeControl;
use serde::{Deserialize, Serialize};

use crate::error::{AirflowError, AirflowResult};
use crate::wind::FacadeDirection;

/// Flow exponent for window openings (B.3.2.2).
pub const N_WINDOW: Real = 0.5;
/// Discharge coefficient for window openings.
pub const C_D_WINDOW: Real = 0.67;
/// Flow exponent for vents (B.3.2.2).
pub const N_VENT: Real = 0.5;
/// Discharge coefficient for vents (B.3.2.1).
pub const C_D_VENT: Real = 0.6;
/// Flow exponent through leaks (B.3.3.14).
pub const N_LEAK: Real = 0.667;

/// Pressure difference between outside and inside at a flow path,
/// eqns 4-6 of BS EN 16798-7.
///
/// * `h_path` - height of the path above the zone floor, m
/// * `c_p_path` - wind pressure coefficient at the path
/// * `u_site` - wind speed at zone level, m/s
/// * `t_e`, `t_z` - external / zone air temperature, K
/// * `p_z_ref` - trial internal reference pressure, Pa
pub fn pressure_difference_at_path(
    h_path: Real,
    c_p_path: Real,
    u_site: Real,
    t_e: Real,
    t_z: Real,
    p_z_ref: Real,
) -> Real {
    let p_e_path = RHO_A_REF * T_E_REF / t_e * (0.5 * c_p_path * u_site.powi(2) - h_path * G);
    let p_z_path = p_z_ref - RHO_A_REF * h_path * G * T_E_REF / t_z;
    p_e_path - p_z_path
}

/// One horizontal slice of an openable window. Tall openings are divided
/// into parts so the stack gradient over the opening is resolved.
#[derive(Clone, Debug)]
pub struct WindowPart {
    /// Height used for the pressure difference of this part, m.
    h_div_path: Real,
}

impl WindowPart {
    fn new(h_w_path: Real, h_w_fa: Real, n_w_div: Real, part_number: usize) -> Self {
        // eqn 55
        let h_div_path = h_w_path - h_w_fa / 2.0
            + h_w_fa / (2.0 * (n_w_div + 1.0))
            + (h_w_fa / (n_w_div + 1.0)) * (part_number - 1) as Real;
        Self { h_div_path }
    }

    pub fn h_div_path(&self) -> Real {
        self.h_div_path
    }
}

/// An openable window (or door used for airing).
#[derive(Clone, Debug)]
pub struct Window {
    /// Mid height of the opening above the zone floor, m.
    h_w_path: Real,
    /// Fully-open free area, m^2.
    a_w_max: Real,
    orientation: Real,
    pitch: Real,
    /// Number of divisions between parts.
    n_w_div: Real,
    parts: Vec<WindowPart>,
    /// Windows are shut whenever the control is absent or off.
    control: Option<OnOffTimeControl>,
}

impl Window {
    pub fn new(
        h_w_fa: Real,
        h_w_path: Real,
        a_w_max: Real,
        n_parts: usize,
        orientation: Real,
        pitch: Real,
        control: Option<OnOffTimeControl>,
    ) -> AirflowResult<Self> {
        if n_parts == 0 {
            return Err(AirflowError::InvalidConfig {
                what: "window needs at least one part",
            });
        }
        if !(a_w_max > 0.0) {
            return Err(AirflowError::InvalidConfig {
                what: "window free area must be positive",
            });
        }

        let n_w_div = (n_parts - 1) as Real;
        let parts = (1..=n_parts)
            .map(|part_number| WindowPart::new(h_w_path, h_w_fa, n_w_div, part_number))
            .collect();

        Ok(Self {
            h_w_path,
            a_w_max,
            orientation,
            pitch,
            n_w_div,
            parts,
            control,
        })
    }

    pub fn orientation(&self) -> Real {
        self.orientation
    }

    pub fn pitch(&self) -> Real {
        self.pitch
    }

    /// Mid height of the whole opening, m (used for table-band checks).
    pub fn h_path(&self) -> Real {
        self.h_w_path
    }

    pub fn parts(&self) -> &[WindowPart] {
        &self.parts
    }

    pub fn divisions(&self) -> Real {
        self.n_w_div
    }

    /// Opening free area for an opening ratio, eqn 40. Zero when shut.
    pub fn opening_free_area(&self, r_w_arg: Real, it: &SimulationTimeIteration) -> Real {
        match &self.control {
            Some(control) if control.is_on(it) => r_w_arg * self.a_w_max,
            _ => 0.0,
        }
    }

    /// Flow coefficient C_w for the current opening, eqn 54. m^3/h at 1 Pa.
    pub fn flow_coefficient(&self, r_w_arg: Real, it: &SimulationTimeIteration) -> Real {
        let a_w = self.opening_free_area(r_w_arg, it);
        3600.0 * C_D_WINDOW * a_w * (2.0 / RHO_A_REF).powf(N_WINDOW)
    }
}

/// A trickle vent or other fixed opening with a declared equivalent area.
#[derive(Clone, Debug)]
pub struct Vent {
    /// Mid height of the vent above the zone floor, m.
    h_path: Real,
    /// Equivalent area per EN 13141-1/-2, cm^2.
    a_vent: Real,
    /// Reference pressure difference the equivalent area was measured at, Pa.
    delta_p_vent_ref: Real,
    orientation: Real,
    pitch: Real,
}

impl Vent {
    pub fn new(
        h_path: Real,
        a_vent: Real,
        delta_p_vent_ref: Real,
        orientation: Real,
        pitch: Real,
    ) -> AirflowResult<Self> {
        if !(a_vent > 0.0) {
            return Err(AirflowError::InvalidConfig {
                what: "vent equivalent area must be positive",
            });
        }
        if !(delta_p_vent_ref > 0.0) {
            return Err(AirflowError::InvalidConfig {
                what: "vent reference pressure difference must be positive",
            });
        }
        Ok(Self {
            h_path,
            a_vent,
            delta_p_vent_ref,
            orientation,
            pitch,
        })
    }

    pub fn h_path(&self) -> Real {
        self.h_path
    }

    pub fn orientation(&self) -> Real {
        self.orientation
    }

    pub fn pitch(&self) -> Real {
        self.pitch
    }

    /// Flow coefficient C_vent from the equivalent area, eqn 59
    /// (EN 13141-1/-2 measurement basis).
    pub fn flow_coefficient(&self) -> Real {
        (3600.0 / 10_000.0)
            * C_D_VENT
            * self.a_vent
            * (2.0 / RHO_A_REF).powf(0.5)
            * (1.0 / self.delta_p_vent_ref).powf(N_VENT - 0.5)
    }
}

/// Envelope leakage lumped onto one facade or the roof.
#[derive(Clone, Debug)]
pub struct Leak {
    /// Mid height of the leak path above the zone floor, m.
    h_path: Real,
    /// Pressure-test reference difference, Pa (50 for a blower door).
    delta_p_leak_ref: Real,
    /// Measured air change at the reference difference, m^3/(h m^2).
    qv_delta_p_leak_ref: Real,
    facade_direction: FacadeDirection,
    /// Envelope reference area of the airtightness index, m^2.
    a_leak: Real,
    /// Facade and roof areas for apportioning the leakage, m^2.
    a_facades: Real,
    a_roof: Real,
}

impl Leak {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        h_path: Real,
        delta_p_leak_ref: Real,
        qv_delta_p_leak_ref: Real,
        facade_direction: FacadeDirection,
        a_leak: Real,
        a_facades: Real,
        a_roof: Real,
    ) -> AirflowResult<Self> {
        if !(delta_p_leak_ref > 0.0) {
            return Err(AirflowError::InvalidConfig {
                what: "leak reference pressure difference must be positive",
            });
        }
        if !(a_facades + a_roof > 0.0) {
            return Err(AirflowError::InvalidConfig {
                what: "leak apportioning needs a positive facade or roof area",
            });
        }
        Ok(Self {
            h_path,
            delta_p_leak_ref,
            qv_delta_p_leak_ref,
            facade_direction,
            a_leak,
            a_facades,
            a_roof,
        })
    }

    pub fn h_path(&self) -> Real {
        self.h_path
    }

    pub fn facade_direction(&self) -> FacadeDirection {
        self.facade_direction
    }

    /// Leakage flow coefficient for this path. The zone coefficient is
    /// apportioned between roof and facades by area, and facade leakage is
    /// further split per facade (Table B.12).
    pub fn flow_coefficient(&self) -> Real {
        let c_leak = self.qv_delta_p_leak_ref * self.a_leak / self.delta_p_leak_ref.powf(N_LEAK);

        match self.facade_direction {
            FacadeDirection::Windward | FacadeDirection::Leeward => {
                let c_leak_facades = c_leak * self.a_facades / (self.a_facades + self.a_roof);
                0.25 * c_leak_facades
            }
            _ => c_leak * self.a_roof / (self.a_facades + self.a_roof),
        }
    }
}

/// Mechanical ventilation duty type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VentilationDuty {
    IntermittentExtract,
    CentralisedContinuousExtract,
    DecentralisedContinuousExtract,
    /// Balanced supply and extract with heat recovery.
    Mvhr,
}

/// A mechanical ventilation unit contributing fixed flows to the balance.
#[derive(Clone, Debug)]
pub struct MechanicalVentilation {
    duty: VentilationDuty,
    /// Design volume flow rate, m^3/h.
    design_flow_rate: Real,
    /// Heat recovery efficiency for MVHR units, 0-1.
    efficiency_hr: Real,
    control: Option<OnOffTimeControl>,
}

impl MechanicalVentilation {
    pub fn new(
        duty: VentilationDuty,
        design_flow_rate: Real,
        efficiency_hr: Real,
        control: Option<OnOffTimeControl>,
    ) -> AirflowResult<Self> {
        if !(design_flow_rate > 0.0) {
            return Err(AirflowError::InvalidConfig {
                what: "mechanical ventilation design flow rate must be positive",
            });
        }
        if !(0.0..=1.0).contains(&efficiency_hr) {
            return Err(AirflowError::InvalidConfig {
                what: "heat recovery efficiency must lie in [0, 1]",
            });
        }
        Ok(Self {
            duty,
            design_flow_rate,
            efficiency_hr,
            control,
        })
    }

    pub fn duty(&self) -> VentilationDuty {
        self.duty
    }

    pub fn efficiency_hr(&self) -> Real {
        self.efficiency_hr
    }

    fn running(&self, it: &SimulationTimeIteration) -> bool {
        match &self.control {
            Some(control) => control.is_on(it),
            // continuous systems default to always running
            None => self.duty != VentilationDuty::IntermittentExtract,
        }
    }

    /// Supply and extract volume flows, m^3/h (extract negative).
    pub fn qv_supply_extract(&self, it: &SimulationTimeIteration) -> (Real, Real) {
        if !self.running(it) {
            return (0.0, 0.0);
        }
        match self.duty {
            VentilationDuty::Mvhr => (self.design_flow_rate, -self.design_flow_rate),
            _ => (0.0, -self.design_flow_rate),
        }
    }
}

/// Where a combustion appliance draws its air from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombustionAirSupply {
    RoomAir,
    Outside,
}

/// Where the flue gas goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlueGasExhaust {
    IntoRoom,
    IntoSeparateDuct,
    IntoMechVent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombustionFuel {
    Wood,
    Gas,
    Oil,
    Coal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombustionApplianceKind {
    OpenFireplace,
    ClosedWithFan,
    OpenGasFlueBalancer,
    OpenGasKitchenStove,
    OpenGasFire,
    ClosedFire,
}

/// Fuel flow factor, Table B.3. Only the published combinations exist.
fn fuel_flow_factor(
    fuel: CombustionFuel,
    kind: CombustionApplianceKind,
) -> AirflowResult<Real> {
    match (fuel, kind) {
        (CombustionFuel::Wood, CombustionApplianceKind::OpenFireplace) => Ok(2.8),
        (CombustionFuel::Gas, CombustionApplianceKind::ClosedWithFan) => Ok(0.38),
        (CombustionFuel::Gas, CombustionApplianceKind::OpenGasFlueBalancer) => Ok(0.78),
        (CombustionFuel::Gas, CombustionApplianceKind::OpenGasKitchenStove) => Ok(3.35),
        (CombustionFuel::Gas, CombustionApplianceKind::OpenGasFire) => Ok(3.35),
        (CombustionFuel::Oil, CombustionApplianceKind::ClosedFire) => Ok(0.32),
        (CombustionFuel::Coal, CombustionApplianceKind::ClosedFire) => Ok(0.52),
        _ => Err(AirflowError::CombustionTable {
            what: "fuel/appliance combination",
        }),
    }
}

/// Appliance system factor, Table B.2.
fn appliance_system_factor(
    supply: CombustionAirSupply,
    exhaust: FlueGasExhaust,
) -> AirflowResult<Real> {
    match (supply, exhaust) {
        (CombustionAirSupply::Outside, _) => Ok(0.0),
        (CombustionAirSupply::RoomAir, FlueGasExhaust::IntoRoom) => Ok(0.0),
        (CombustionAirSupply::RoomAir, FlueGasExhaust::IntoSeparateDuct) => Ok(1.0),
        (CombustionAirSupply::RoomAir, FlueGasExhaust::IntoMechVent) => {
            Err(AirflowError::CombustionTable {
                what: "room-air supply exhausting into mechanical ventilation",
            })
        }
    }
}

/// A combustion appliance whose flue draws air out of the zone while firing.
#[derive(Clone, Debug)]
pub struct CombustionAppliance {
    /// Combined flow factor per kW of appliance heat input, m^3/(h kW).
    flow_factor: Real,
    /// Rated heat input, kW.
    heat_input: Real,
    control: Option<OnOffTimeControl>,
}

impl CombustionAppliance {
    pub fn new(
        supply: CombustionAirSupply,
        exhaust: FlueGasExhaust,
        fuel: CombustionFuel,
        kind: CombustionApplianceKind,
        heat_input: Real,
        control: Option<OnOffTimeControl>,
    ) -> AirflowResult<Self> {
        if heat_input < 0.0 {
            return Err(AirflowError::InvalidConfig {
                what: "combustion appliance heat input must be non-negative",
            });
        }
        let flow_factor = fuel_flow_factor(fuel, kind)? * appliance_system_factor(supply, exhaust)?;
        Ok(Self {
            flow_factor,
            heat_input,
            control,
        })
    }

    /// Extract volume flow while firing, m^3/h (negative, air leaves the
    /// zone through the flue).
    pub fn qv_extract(&self, it: &SimulationTimeIteration) -> Real {
        let firing = match &self.control {
            Some(control) => control.is_on(it),
            None => false,
        };
        if firing {
            -(self.flow_factor * self.heat_input)
        } else {
            0.0
        }
    }
}
