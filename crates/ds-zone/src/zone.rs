//! Zone heat balance per BS EN ISO 52016-1:2017, section 6.5.
//!
//! Unknown temperatures (every node of every building element plus the zone
//! air) are solved simultaneously from a linear system A.X = B assembled out
//! of the node heat-balance equations. Node temperature state lives in an
//! arena owned by the zone and is committed exactly once per timestep by
//! `update_temperatures`.

use ds_climate::ExternalConditions;
use ds_controls::SetpointTimeControl;
use ds_core::air::{C_A, RHO_A_REF};
use ds_core::units::convert::watts_to_kwh;
use ds_core::{Real, SimulationTimeIteration};
use ds_fabric::{BuildingElement, ThermalBridge};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ZoneError, ZoneResult};

// Convective fractions for internal and solar gains
// (default values from BS EN ISO 52016-1:2017, Table B.11)
const F_INT_C: Real = 0.4;
const F_SOL_C: Real = 0.1;

// Areal thermal capacity of air and furniture
// (default value from BS EN ISO 52016-1:2017, Table B.17)
const K_M_INT: Real = 10_000.0; // J/(m2 K)

const SECONDS_PER_HOUR: Real = 3600.0;

// Initial node temperatures settle under a year-long steady-state step
const INIT_DELTA_T_H: Real = 8760.0;
const INIT_FRAC_CONVECTIVE: Real = 0.4;
const INIT_MAX_ITERATIONS: usize = 10_000;

/// Probe load per floor area bracketing the demand interpolation, W/m^2.
const HEAT_COOL_LOAD_PROBE: Real = 10.0;

/// Stands in for "no ventilation cooling setpoint configured".
const TEMP_SETPNT_COOL_VENT_NONE: Real = 1.0e32;

/// Ventilation heat transfer coefficient from air changes per hour, W/K.
pub fn vent_heat_transfer_coeff(volume: Real, air_changes_per_hour: Real) -> Real {
    let q_ve = air_changes_per_hour * volume / SECONDS_PER_HOUR;
    RHO_A_REF * C_A * q_ve
}

/// Thermal bridging of a zone: either a pre-aggregated coefficient or the
/// individual bridges to sum.
#[derive(Clone, Debug)]
pub enum ThermalBridging {
    Coefficient(Real),
    Bridges(Vec<ThermalBridge>),
}

impl ThermalBridging {
    fn heat_transfer_coefficient(&self) -> Real {
        match self {
            ThermalBridging::Coefficient(coeff) => *coeff,
            ThermalBridging::Bridges(bridges) => bridges
                .iter()
                .map(ThermalBridge::heat_transfer_coefficient)
                .sum(),
        }
    }
}

/// Which temperature the setpoint applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetpointBasis {
    Air,
    Operative,
}

/// Air-change-rate context for the demand calculation.
#[derive(Clone, Copy, Debug)]
pub enum AirChangesPerHour {
    /// The rate required for cooling is already known.
    Cooling { ach_cooling: Real },
    /// The ventilation-requirement rate plus the rate achievable with all
    /// windows open, letting the zone weigh extra ventilation against
    /// active cooling.
    TargetAndWindowsOpen {
        ach_target: Real,
        ach_windows_open: Real,
    },
}

impl AirChangesPerHour {
    fn base_rate(&self) -> Real {
        match self {
            AirChangesPerHour::Cooling { ach_cooling } => *ach_cooling,
            AirChangesPerHour::TargetAndWindowsOpen { ach_target, .. } => *ach_target,
        }
    }
}

/// Heating/cooling need for one timestep, kWh (cooling negative).
#[derive(Clone, Copy, Debug, Default)]
pub struct SpaceHeatCoolDemand {
    pub space_heat_demand: Real,
    pub space_cool_demand: Real,
    /// Air change rate the demand was evaluated at.
    pub ach_cooling: Real,
    /// Rate below which extra ventilation would trigger heating, if the
    /// windows-open headroom was considered.
    pub ach_to_trigger_heating: Option<Real>,
}

pub struct Zone {
    useful_area: Real,
    volume: Real,
    elements: Vec<BuildingElement>,
    tb_heat_trans_coeff: Real,
    /// Total surface area of all elements, m^2.
    area_el_total: Real,
    /// Internal (air + furniture) thermal capacity, J/K.
    c_int: Real,
    /// (external-node row, internal-node row) per element; rows in between
    /// belong to the element's inside nodes.
    element_positions: Vec<(usize, usize)>,
    /// Row of the zone air heat balance.
    zone_idx: usize,
    no_of_temps: usize,
    /// Node temperature arena, committed once per timestep.
    temp_prev: Vec<Real>,
    setpnt_basis: SetpointBasis,
    /// Setpoint above which extra ventilation is used for cooling.
    vent_cool_control: Option<SetpointTimeControl>,
}

impl Zone {
    /// * `area` - useful floor area, m^2
    /// * `volume` - zone air volume, m^3
    /// * `temp_ext_air_init`, `temp_setpnt_init` - conditions the initial
    ///   node temperatures settle under, degC
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        area: Real,
        volume: Real,
        elements: Vec<BuildingElement>,
        thermal_bridging: ThermalBridging,
        temp_ext_air_init: Real,
        temp_setpnt_init: Real,
        setpnt_basis: SetpointBasis,
        vent_cool_control: Option<SetpointTimeControl>,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> ZoneResult<Self> {
        if !(area > 0.0) {
            return Err(ZoneError::InvalidConfig {
                what: "zone floor area must be positive",
            });
        }
        if !(volume > 0.0) {
            return Err(ZoneError::InvalidConfig {
                what: "zone volume must be positive",
            });
        }
        if elements.is_empty() {
            return Err(ZoneError::InvalidConfig {
                what: "zone needs at least one building element",
            });
        }

        let tb_heat_trans_coeff = thermal_bridging.heat_transfer_coefficient();
        let area_el_total = elements.iter().map(BuildingElement::area).sum::<Real>();
        let c_int = K_M_INT * area;

        let mut element_positions = Vec::with_capacity(elements.len());
        let mut n = 0;
        for element in &elements {
            let start_idx = n;
            n += element.number_of_nodes();
            element_positions.push((start_idx, n - 1));
        }
        let zone_idx = n;
        let no_of_temps = n + 1;

        let mut zone = Zone {
            useful_area: area,
            volume,
            elements,
            tb_heat_trans_coeff,
            area_el_total,
            c_int,
            element_positions,
            zone_idx,
            no_of_temps,
            temp_prev: Vec::new(),
            setpnt_basis,
            vent_cool_control,
        };
        zone.init_node_temps(temp_ext_air_init, temp_setpnt_init, conditions, it)?;
        Ok(zone)
    }

    /// Settle node temperatures under steady conditions: meet all demand at
    /// the setpoint and iterate annual-length steps until the node vector
    /// stops moving.
    ///
    /// The uniform starting point halfway between external air and setpoint
    /// puts external-surface nodes and internal-surface nodes each roughly
    /// where they will end up, so the iteration stabilises quickly.
    fn init_node_temps(
        &mut self,
        temp_ext_air_init: Real,
        temp_setpnt_init: Real,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> ZoneResult<()> {
        let temp_start = (temp_ext_air_init + temp_setpnt_init) / 2.0;
        self.temp_prev = vec![temp_start; self.no_of_temps];

        for _ in 0..INIT_MAX_ITERATIONS {
            let demand = self.space_heat_cool_demand(
                INIT_DELTA_T_H,
                temp_ext_air_init,
                0.0,
                0.0,
                INIT_FRAC_CONVECTIVE,
                INIT_FRAC_CONVECTIVE,
                temp_setpnt_init,
                temp_setpnt_init,
                temp_ext_air_init,
                AirChangesPerHour::Cooling { ach_cooling: 0.0 },
                conditions,
                it,
            )?;

            // only one of the two demands is non-zero; cooling is negative
            let gains_heat_cool = (demand.space_heat_demand + demand.space_cool_demand) * 1000.0
                / INIT_DELTA_T_H;

            let temps_updated = self.calc_temperatures(
                INIT_DELTA_T_H * SECONDS_PER_HOUR,
                &self.temp_prev,
                temp_ext_air_init,
                0.0,
                0.0,
                gains_heat_cool,
                INIT_FRAC_CONVECTIVE,
                0.0,
                temp_ext_air_init,
                conditions,
                it,
            )?;

            let settled = vectors_close(&temps_updated, &self.temp_prev, 1e-8);
            self.temp_prev = temps_updated;
            if settled {
                return Ok(());
            }
        }
        Err(ZoneError::InitNotSettled {
            iterations: INIT_MAX_ITERATIONS,
        })
    }

    pub fn area(&self) -> Real {
        self.useful_area
    }

    pub fn volume(&self) -> Real {
        self.volume
    }

    /// Solar gains summed over all elements, W. Only transparent elements
    /// contribute.
    pub fn gains_solar(
        &self,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> ZoneResult<Real> {
        let mut total = 0.0;
        for element in &self.elements {
            total += element.solar_gains(conditions, it)?;
        }
        Ok(total)
    }

    /// Assemble and solve the node heat balances for one step.
    ///
    /// One row per node plus one for the zone air. Surface rows follow
    /// eqns 38-41 of the standard: the external surface balances conduction
    /// against external convection/radiation, absorbed solar and sky
    /// radiation; inside nodes balance conduction and their share of the
    /// thermal mass; the internal surface couples to every other internal
    /// surface radiatively and to the zone air convectively; the air row
    /// carries ventilation, thermal bridging and the convective gain shares.
    #[allow(clippy::too_many_arguments)]
    fn calc_temperatures(
        &self,
        delta_t: Real,
        temp_prev: &[Real],
        temp_ext_air: Real,
        gains_internal: Real,
        gains_solar: Real,
        gains_heat_cool: Real,
        f_hc_c: Real,
        ach: Real,
        avg_supply_temp: Real,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> ZoneResult<Vec<Real>> {
        let h_ve = vent_heat_transfer_coeff(self.volume, ach);

        let mut matrix_a: DMatrix<Real> = DMatrix::zeros(self.no_of_temps, self.no_of_temps);
        let mut vector_b: DVector<Real> = DVector::zeros(self.no_of_temps);

        for (eli_idx, eli) in self.elements.iter().enumerate() {
            let (ext_idx, int_idx) = self.element_positions[eli_idx];
            let k_pli = eli.k_pli();
            let h_pli = eli.h_pli();

            // External surface node (eqn 41)
            let mut idx = ext_idx;
            let mut i = 0usize;
            matrix_a[(idx, idx)] = (k_pli[i] / delta_t) + eli.h_ce() + eli.h_re() + h_pli[i];
            matrix_a[(idx, idx + 1)] = -h_pli[i];
            let (i_sol_dir, i_sol_dif) = eli.i_sol_dir_dif(conditions, it);
            let (f_sh_dir, f_sh_dif) = eli.shading_factors_direct_diffuse(conditions, it)?;
            vector_b[idx] = (k_pli[i] / delta_t) * temp_prev[idx]
                + (eli.h_ce() + eli.h_re()) * eli.temp_ext(conditions, it)
                + eli.a_sol() * (i_sol_dif * f_sh_dif + i_sol_dir * f_sh_dir)
                - eli.therm_rad_to_sky();

            // Inside nodes (eqn 40)
            for _ in 0..eli.number_of_inside_nodes() {
                i += 1;
                idx += 1;
                matrix_a[(idx, idx - 1)] = -h_pli[i - 1];
                matrix_a[(idx, idx)] = (k_pli[i] / delta_t) + h_pli[i] + h_pli[i - 1];
                matrix_a[(idx, idx + 1)] = -h_pli[i];
                vector_b[idx] = (k_pli[i] / delta_t) * temp_prev[idx];
            }

            // Internal surface node (eqn 39). The convective coefficient
            // depends on heat flow direction, taken from last step's
            // air/surface temperatures.
            idx += 1;
            i += 1;
            debug_assert_eq!(idx, int_idx);
            let h_ci = eli.h_ci(temp_prev[self.zone_idx], temp_prev[idx]);
            matrix_a[(idx, idx - 1)] = -h_pli[i - 1];
            matrix_a[(idx, idx)] = (k_pli[i] / delta_t) + h_ci + eli.h_ri() + h_pli[i - 1];
            // radiative coupling to every internal surface, including an
            // adjustment on this node's own diagonal
            for (elk_idx, elk) in self.elements.iter().enumerate() {
                let col = self.element_positions[elk_idx].1;
                matrix_a[(idx, col)] -= (elk.area() / self.area_el_total) * eli.h_ri();
            }
            matrix_a[(idx, self.zone_idx)] = -h_ci;
            vector_b[idx] = (k_pli[i] / delta_t) * temp_prev[idx]
                + ((1.0 - F_INT_C) * gains_internal
                    + (1.0 - F_SOL_C) * gains_solar
                    + (1.0 - f_hc_c) * gains_heat_cool)
                    / self.area_el_total;
        }

        // Zone air heat balance (eqn 38)
        matrix_a[(self.zone_idx, self.zone_idx)] = (self.c_int / delta_t)
            + self
                .elements
                .iter()
                .enumerate()
                .map(|(eli_idx, eli)| {
                    eli.area()
                        * eli.h_ci(
                            temp_prev[self.zone_idx],
                            temp_prev[self.element_positions[eli_idx].1],
                        )
                })
                .sum::<Real>()
            + h_ve
            + self.tb_heat_trans_coeff;
        for (eli_idx, eli) in self.elements.iter().enumerate() {
            let col = self.element_positions[eli_idx].1;
            matrix_a[(self.zone_idx, col)] = -eli.area()
                * eli.h_ci(
                    temp_prev[self.zone_idx],
                    temp_prev[self.element_positions[eli_idx].1],
                );
        }
        vector_b[self.zone_idx] = (self.c_int / delta_t) * temp_prev[self.zone_idx]
            + h_ve * avg_supply_temp
            + self.tb_heat_trans_coeff * temp_ext_air
            + F_INT_C * gains_internal
            + F_SOL_C * gains_solar
            + f_hc_c * gains_heat_cool;

        self.fast_solver(matrix_a, vector_b)
    }

    /// Solve the assembled system, exploiting its structure.
    ///
    /// Only internal surfaces and the zone air actually interact across
    /// elements; each element's other nodes form a chain that can be
    /// eliminated by forward substitution. So: eliminate each chain into its
    /// internal-surface row, LU-solve the dense (n_elements + 1) system for
    /// the surface and air temperatures, then back-substitute the chains.
    /// Equivalent to a full LU solve of the original system at a fraction of
    /// the cost.
    fn fast_solver(&self, coeffs: DMatrix<Real>, rhs: DVector<Real>) -> ZoneResult<Vec<Real>> {
        let mut coeffs_adj: DMatrix<Real> = DMatrix::zeros(self.no_of_temps, self.no_of_temps);
        let mut rhs_adj: DVector<Real> = DVector::zeros(self.no_of_temps);

        let num_rows_cols_reduced = self.elements.len() + 1;
        let zone_idx_reduced = num_rows_cols_reduced - 1;
        let mut matrix_a: DMatrix<Real> =
            DMatrix::zeros(num_rows_cols_reduced, num_rows_cols_reduced);
        let mut vector_b: DVector<Real> = DVector::zeros(num_rows_cols_reduced);

        for el_idx in 0..self.elements.len() {
            let (ext_idx, int_idx) = self.element_positions[el_idx];

            coeffs_adj[(ext_idx, ext_idx)] = coeffs[(ext_idx, ext_idx)];
            rhs_adj[ext_idx] = rhs[ext_idx];

            // forward-eliminate the chain from the external surface inward
            for idx in (ext_idx + 1)..=int_idx {
                coeffs_adj[(idx, idx)] = coeffs[(idx, idx)]
                    - coeffs[(idx - 1, idx)] * coeffs[(idx, idx - 1)]
                        / coeffs_adj[(idx - 1, idx - 1)];
                rhs_adj[idx] = rhs[idx]
                    - rhs_adj[idx - 1] * coeffs[(idx, idx - 1)] / coeffs_adj[(idx - 1, idx - 1)];
            }

            matrix_a[(el_idx, el_idx)] = coeffs_adj[(int_idx, int_idx)];
            vector_b[el_idx] = rhs_adj[int_idx];

            for el_idx_other in 0..self.elements.len() {
                if el_idx == el_idx_other {
                    continue;
                }
                let other_int_idx = self.element_positions[el_idx_other].1;
                matrix_a[(el_idx, el_idx_other)] = coeffs[(int_idx, other_int_idx)];
            }

            matrix_a[(el_idx, zone_idx_reduced)] = coeffs[(int_idx, self.zone_idx)];
            matrix_a[(zone_idx_reduced, el_idx)] = coeffs[(self.zone_idx, int_idx)];
        }

        matrix_a[(zone_idx_reduced, zone_idx_reduced)] = coeffs[(self.zone_idx, self.zone_idx)];
        vector_b[zone_idx_reduced] = rhs[self.zone_idx];

        let vector_x = matrix_a
            .lu()
            .solve(&vector_b)
            .ok_or(ZoneError::SolverDegenerate)?;
        if vector_x.iter().any(|&val| !val.is_finite()) {
            return Err(ZoneError::SolverDegenerate);
        }

        let mut temperatures = vec![0.0; self.no_of_temps];
        temperatures[self.zone_idx] = vector_x[zone_idx_reduced];
        for el_idx in 0..self.elements.len() {
            let (ext_idx, int_idx) = self.element_positions[el_idx];
            temperatures[int_idx] = vector_x[el_idx];
            for idx in (ext_idx..int_idx).rev() {
                temperatures[idx] = (rhs_adj[idx] - coeffs[(idx, idx + 1)] * temperatures[idx + 1])
                    / coeffs_adj[(idx, idx)];
            }
        }
        Ok(temperatures)
    }

    /// Operative temperature per section 6.5.5.3: mean of air temperature
    /// and area-weighted mean radiant temperature, degC.
    fn temp_operative_from(&self, temp_vector: &[Real]) -> Real {
        let temp_int_air = temp_vector[self.zone_idx];
        let temp_mean_radiant = self
            .elements
            .iter()
            .enumerate()
            .map(|(eli_idx, eli)| eli.area() * temp_vector[self.element_positions[eli_idx].1])
            .sum::<Real>()
            / self.area_el_total;
        (temp_int_air + temp_mean_radiant) / 2.0
    }

    pub fn temp_operative(&self) -> Real {
        self.temp_operative_from(&self.temp_prev)
    }

    pub fn temp_internal_air(&self) -> Real {
        self.temp_prev[self.zone_idx]
    }

    fn setpoint_temp_from(&self, temp_vector: &[Real]) -> Real {
        match self.setpnt_basis {
            SetpointBasis::Operative => self.temp_operative_from(temp_vector),
            SetpointBasis::Air => temp_vector[self.zone_idx],
        }
    }

    /// Air change rate needed to drive the setpoint temperature to
    /// `temp_target`, interpolated between the rates already evaluated.
    /// Clamped to `[ach_min, ach_max]`.
    #[allow(clippy::too_many_arguments)]
    fn ach_req_to_reach_temperature(
        temp_target: Real,
        ach_min: Real,
        ach_max: Real,
        temp_ach_min: Real,
        temp_ach_max: Real,
        temp_int_air_min: Real,
        temp_int_air_max: Real,
        temp_supply: Real,
    ) -> Real {
        // extra ventilation must actually cool, and the zone must be warmer
        // than the supply air
        if temp_ach_max >= temp_ach_min
            || temp_int_air_max >= temp_int_air_min
            || temp_int_air_min <= temp_supply
        {
            return ach_min;
        }

        let frac_interp = (temp_target - temp_ach_min) / (temp_ach_max - temp_ach_min);
        let temp_int_air_req =
            temp_int_air_min + frac_interp * (temp_int_air_max - temp_int_air_min);
        if temp_int_air_req <= temp_supply {
            return ach_max;
        }

        let ach_req = (ach_max
            * frac_interp
            * ((temp_int_air_max - temp_supply) / (temp_int_air_min - temp_supply))
            + ach_min * (1.0 - frac_interp))
            / ((temp_int_air_req - temp_supply) / (temp_int_air_min - temp_supply));

        ach_req.clamp(ach_min, ach_max)
    }

    /// How far extra ventilation can substitute for active cooling.
    ///
    /// Returns the (possibly lowered) free-floating temperature, the air
    /// change rate to evaluate demand at, and the rate below which extra
    /// ventilation would overshoot into heating.
    #[allow(clippy::too_many_arguments)]
    fn cooling_potential_from_ventilation(
        &self,
        delta_t: Real,
        temp_ext_air: Real,
        gains_internal: Real,
        gains_solar: Real,
        temp_setpnt_heat: Real,
        temp_setpnt_cool: Real,
        temp_setpnt_cool_vent: Real,
        temp_free: Real,
        temp_int_air_free: Real,
        ach_args: AirChangesPerHour,
        avg_supply_temp: Real,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> ZoneResult<(Real, Real, Option<Real>)> {
        let AirChangesPerHour::TargetAndWindowsOpen {
            ach_target,
            ach_windows_open,
        } = ach_args
        else {
            return Ok((temp_free, ach_args.base_rate(), None));
        };
        if ach_windows_open == ach_target {
            return Ok((temp_free, ach_target, None));
        }

        let mut temp_free = temp_free;

        // temperatures with maximum extra ventilation
        let temp_vector_vent_max = self.calc_temperatures(
            delta_t,
            &self.temp_prev,
            temp_ext_air,
            gains_internal,
            gains_solar,
            0.0,
            0.0,
            ach_windows_open,
            avg_supply_temp,
            conditions,
            it,
        )?;
        let temp_int_air_vent_max = temp_vector_vent_max[self.zone_idx];
        let temp_vent_max = self.setpoint_temp_from(&temp_vector_vent_max);

        let ach_to_trigger_heating = Self::ach_req_to_reach_temperature(
            temp_setpnt_heat,
            ach_target,
            ach_windows_open,
            temp_free,
            temp_vent_max,
            temp_int_air_free,
            temp_int_air_vent_max,
            avg_supply_temp,
        );

        let ach_cooling = if temp_vent_max < temp_free
            && temp_free > temp_setpnt_cool_vent
            && temp_int_air_free > avg_supply_temp
        {
            let mut ach_cooling = Self::ach_req_to_reach_temperature(
                temp_setpnt_cool_vent,
                ach_target,
                ach_windows_open,
                temp_free,
                temp_vent_max,
                temp_int_air_free,
                temp_int_air_vent_max,
                avg_supply_temp,
            );

            let temp_vector_vent_extra = self.calc_temperatures(
                delta_t,
                &self.temp_prev,
                temp_ext_air,
                gains_internal,
                gains_solar,
                0.0,
                0.0,
                ach_cooling,
                avg_supply_temp,
                conditions,
                it,
            )?;
            let temp_free_vent_extra = self.setpoint_temp_from(&temp_vector_vent_extra);

            // if even the extra ventilation leaves the zone above the active
            // cooling setpoint, the cooling system takes over instead
            if temp_free_vent_extra > temp_setpnt_cool {
                ach_cooling = ach_target;
            } else {
                temp_free = temp_free_vent_extra;
            }
            ach_cooling
        } else {
            ach_target
        };

        Ok((temp_free, ach_cooling, Some(ach_to_trigger_heating)))
    }

    /// Heating and cooling demand for the current timestep, kWh, per
    /// section 6.5.5.2 steps 1-4.
    ///
    /// The system is solved free-floating, then once more with a probe load
    /// of +/-10 W per m^2 of floor area; the load needed to land on the
    /// setpoint follows by linear interpolation (the system is linear in the
    /// load for fixed convective coefficients).
    #[allow(clippy::too_many_arguments)]
    pub fn space_heat_cool_demand(
        &self,
        delta_t_h: Real,
        temp_ext_air: Real,
        gains_internal: Real,
        gains_solar: Real,
        frac_convective_heat: Real,
        frac_convective_cool: Real,
        temp_setpnt_heat: Real,
        temp_setpnt_cool: Real,
        avg_air_supply_temp: Real,
        ach_args: AirChangesPerHour,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> ZoneResult<SpaceHeatCoolDemand> {
        if temp_setpnt_cool < temp_setpnt_heat {
            return Err(ZoneError::SetpointOrdering {
                heat: temp_setpnt_heat,
                cool: temp_setpnt_cool,
            });
        }

        let temp_setpnt_cool_vent = match &self.vent_cool_control {
            Some(control) => control.setpnt(it).unwrap_or(TEMP_SETPNT_COOL_VENT_NONE),
            None => TEMP_SETPNT_COOL_VENT_NONE,
        };
        if temp_setpnt_cool_vent < temp_setpnt_heat {
            return Err(ZoneError::SetpointOrdering {
                heat: temp_setpnt_heat,
                cool: temp_setpnt_cool_vent,
            });
        }

        let delta_t = delta_t_h * SECONDS_PER_HOUR;

        // free-floating solve (heating/cooling gains zero)
        let temp_vector_no_heat_cool = self.calc_temperatures(
            delta_t,
            &self.temp_prev,
            temp_ext_air,
            gains_internal,
            gains_solar,
            0.0,
            0.0,
            ach_args.base_rate(),
            avg_air_supply_temp,
            conditions,
            it,
        )?;
        let temp_int_air_free = temp_vector_no_heat_cool[self.zone_idx];
        let temp_free = self.setpoint_temp_from(&temp_vector_no_heat_cool);

        let (temp_free, ach_cooling, ach_to_trigger_heating) = self
            .cooling_potential_from_ventilation(
                delta_t,
                temp_ext_air,
                gains_internal,
                gains_solar,
                temp_setpnt_heat,
                temp_setpnt_cool,
                temp_setpnt_cool_vent,
                temp_free,
                temp_int_air_free,
                ach_args,
                avg_air_supply_temp,
                conditions,
                it,
            )?;

        // which setpoint (if either) the zone is outside of
        let (temp_setpnt, heat_cool_load_upper, frac_convective) = if temp_free > temp_setpnt_cool {
            (
                temp_setpnt_cool,
                -HEAT_COOL_LOAD_PROBE * self.useful_area,
                frac_convective_cool,
            )
        } else if temp_free < temp_setpnt_heat {
            (
                temp_setpnt_heat,
                HEAT_COOL_LOAD_PROBE * self.useful_area,
                frac_convective_heat,
            )
        } else {
            return Ok(SpaceHeatCoolDemand {
                ach_cooling,
                ach_to_trigger_heating,
                ..Default::default()
            });
        };

        // solve once more with the probe load
        let temp_vector_upper = self.calc_temperatures(
            delta_t,
            &self.temp_prev,
            temp_ext_air,
            gains_internal,
            gains_solar,
            heat_cool_load_upper,
            frac_convective,
            ach_cooling,
            avg_air_supply_temp,
            conditions,
            it,
        )?;
        let temp_upper = self.setpoint_temp_from(&temp_vector_upper);

        if temp_upper == temp_free {
            return Err(ZoneError::DegenerateInterpolation);
        }
        let heat_cool_load_unrestricted =
            heat_cool_load_upper * (temp_setpnt - temp_free) / (temp_upper - temp_free);
        let heat_cool_demand = watts_to_kwh(heat_cool_load_unrestricted, delta_t_h);

        debug!(
            temp_free,
            temp_upper, heat_cool_demand, "space heat/cool demand interpolated"
        );

        let mut result = SpaceHeatCoolDemand {
            ach_cooling,
            ach_to_trigger_heating,
            ..Default::default()
        };
        if heat_cool_demand < 0.0 {
            result.space_cool_demand = heat_cool_demand;
        } else {
            result.space_heat_demand = heat_cool_demand;
        }
        Ok(result)
    }

    /// Commit node and air temperatures for the next timestep. Called exactly
    /// once per timestep, after the delivered heating/cooling is known.
    #[allow(clippy::too_many_arguments)]
    pub fn update_temperatures(
        &mut self,
        delta_t: Real,
        temp_ext_air: Real,
        gains_internal: Real,
        gains_solar: Real,
        gains_heat_cool: Real,
        frac_convective: Real,
        ach: Real,
        avg_supply_temp: Real,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> ZoneResult<()> {
        self.temp_prev = self.calc_temperatures(
            delta_t,
            &self.temp_prev,
            temp_ext_air,
            gains_internal,
            gains_solar,
            gains_heat_cool,
            frac_convective,
            ach,
            avg_supply_temp,
            conditions,
            it,
        )?;
        Ok(())
    }

    /// Steady-state fabric heat loss coefficient over all elements, W/K.
    pub fn total_fabric_heat_loss(&self) -> Real {
        self.elements
            .iter()
            .map(BuildingElement::fabric_heat_loss)
            .sum()
    }

    /// Area of all elements that lose heat to outside, m^2.
    pub fn total_heat_loss_area(&self) -> Real {
        self.elements
            .iter()
            .filter(|el| !matches!(el, BuildingElement::AdjacentConditioned(_)))
            .map(BuildingElement::area)
            .sum()
    }

    /// Fabric heat capacity over all elements, kJ/K.
    pub fn total_heat_capacity(&self) -> Real {
        self.elements.iter().map(BuildingElement::heat_capacity).sum()
    }

    /// Thermal bridge heat transfer coefficient, W/K.
    pub fn total_thermal_bridges(&self) -> Real {
        self.tb_heat_trans_coeff
    }
}

fn vectors_close(a: &[Real], b: &[Real], rtol: Real) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| (x - y).abs() <= rtol * y.abs() + 1e-10)
}
