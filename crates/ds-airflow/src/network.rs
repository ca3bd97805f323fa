//! The zone pressure-network balance.
//!
//! All envelope paths, mechanical units and combustion appliances of a zone
//! are collected into one [`VentilationNetwork`]. Per timestep the network is
//! first *resolved*: wind speed, facade pressure coefficients and path flow
//! coefficients are looked up once, so that the remaining mass-balance
//! residual is an infallible function of the internal reference pressure and
//! can be handed to the shared bisection solver.

use ds_core::air::{C_A, T_0_ABS, air_density_at_altitude, celsius_to_kelvin,
    mass_to_volume_flow, volume_to_mass_flow};
use ds_core::{Real, RootConfig, SimulationTimeIteration, solve_root};
use ds_climate::ExternalConditions;
use tracing::debug;

use crate::error::{AirflowError, AirflowResult};
use crate::paths::{CombustionAppliance, Leak, MechanicalVentilation, Vent, Window,
    pressure_difference_at_path};
use crate::wind::{TerrainClass, VentilationShieldClass, facade_direction,
    terrain_roughness_coeff, wind_pressure_coefficient, wind_speed_at_zone_level};

/// Bracket half-width the pressure solve starts from, Pa.
const P_Z_BRACKET_INITIAL: Real = 5.0;
/// Largest internal reference pressure magnitude considered physical, Pa.
const P_Z_BRACKET_LIMIT: Real = 2500.0;

/// One resolved power-law path: `qv = coeff * sign(dp) * |dp|^exponent`.
#[derive(Clone, Copy, Debug)]
struct PathTerm {
    h_path: Real,
    c_p: Real,
    coeff: Real,
    exponent: Real,
    /// Leak paths raise the coefficient together with |dp|; the coefficient
    /// is calibrated against that expression, so it is kept.
    whole_product: bool,
}

impl PathTerm {
    fn volume_flow(&self, u_site: Real, t_e: Real, t_z: Real, p_z_ref: Real) -> Real {
        let dp = pressure_difference_at_path(self.h_path, self.c_p, u_site, t_e, t_z, p_z_ref);
        if self.whole_product {
            dp.signum() * (self.coeff * dp.abs()).powf(self.exponent)
        } else {
            self.coeff * dp.signum() * dp.abs().powf(self.exponent)
        }
    }
}

/// Signed air flows through the envelope at one reference pressure, kg/h.
#[derive(Clone, Copy, Debug, Default)]
pub struct AirFlows {
    /// Total entering mass flow (positive), converted at external temperature.
    pub qm_in: Real,
    /// Total leaving mass flow (negative), converted at zone temperature.
    pub qm_out: Real,
}

/// A network resolved against one timestep's wind and temperatures.
pub struct ResolvedNetwork {
    terms: Vec<PathTerm>,
    /// Mechanical supply, kg/h at external temperature (positive).
    qm_fixed_in: Real,
    /// Mechanical extract and combustion draw, kg/h at zone temperature
    /// (negative).
    qm_fixed_out: Real,
    /// Mechanical supply mass flow weighted by heat recovery efficiency,
    /// kg/h.
    qm_sup_weighted_hr: Real,
    u_site: Real,
    t_e: Real,
    t_z: Real,
    rho_alt: Real,
}

impl ResolvedNetwork {
    /// Envelope flows split by direction at a trial reference pressure.
    pub fn flows(&self, p_z_ref: Real) -> AirFlows {
        let mut flows = AirFlows {
            qm_in: self.qm_fixed_in,
            qm_out: self.qm_fixed_out,
        };
        for term in &self.terms {
            let qv = term.volume_flow(self.u_site, self.t_e, self.t_z, p_z_ref);
            if qv >= 0.0 {
                flows.qm_in += volume_to_mass_flow(qv, self.t_e, self.rho_alt);
            } else {
                flows.qm_out += volume_to_mass_flow(qv, self.t_z, self.rho_alt);
            }
        }
        flows
    }

    /// Mass-balance residual, kg/h. Zero at the true internal pressure.
    pub fn mass_balance(&self, p_z_ref: Real) -> Real {
        let flows = self.flows(p_z_ref);
        flows.qm_in + flows.qm_out
    }

    /// Internal reference pressure that closes the mass balance, Pa.
    ///
    /// The bracket is grown geometrically around the initial guess until the
    /// residual changes sign, then handed to the shared bisection. A network
    /// whose residual keeps one sign out to the physical pressure limit does
    /// not balance and is reported as non-convergent.
    pub fn internal_reference_pressure(&self, p_z_ref_guess: Real) -> AirflowResult<Real> {
        let mut half_width = P_Z_BRACKET_INITIAL;
        let (lo, hi) = loop {
            let lo = (p_z_ref_guess - half_width).max(-P_Z_BRACKET_LIMIT);
            let hi = (p_z_ref_guess + half_width).min(P_Z_BRACKET_LIMIT);
            let f_lo = self.mass_balance(lo);
            let f_hi = self.mass_balance(hi);
            if f_lo == 0.0 || f_hi == 0.0 || f_lo.signum() != f_hi.signum() {
                break (lo, hi);
            }
            if lo <= -P_Z_BRACKET_LIMIT && hi >= P_Z_BRACKET_LIMIT {
                return Err(AirflowError::Core(ds_core::CoreError::NonConvergence {
                    what: "zone internal reference pressure",
                    iterations: 0,
                    residual: f_hi,
                }));
            }
            half_width *= 2.0;
        };

        let p_z_ref = solve_root(
            |p| self.mass_balance(p),
            lo,
            hi,
            RootConfig {
                max_iterations: 100,
                abs_tol: 1e-8,
                what: "zone internal reference pressure",
            },
        )?;
        debug!(p_z_ref, "ventilation pressure balance closed");
        Ok(p_z_ref)
    }

    /// Total incoming volume flow expressed at zone temperature, m^3/h.
    pub fn incoming_air_flow(&self, p_z_ref: Real) -> Real {
        mass_to_volume_flow(self.flows(p_z_ref).qm_in, self.t_z, self.rho_alt)
    }

    /// Air changes per hour delivered at a reference pressure.
    pub fn air_change_rate(&self, p_z_ref: Real, zone_volume: Real) -> Real {
        self.incoming_air_flow(p_z_ref) / zone_volume
    }

    /// Flow-weighted temperature of the air entering the zone, C.
    ///
    /// Envelope paths deliver outside air; MVHR supply is tempered to
    /// `T_ext + eta * (T_zone - T_ext)` by the recovered fraction of the
    /// extract heat. The zone's ventilation heat loss is then
    /// `m_dot * c_a * (T_zone - T_supply)`.
    pub fn average_supply_temperature(&self, p_z_ref: Real) -> Real {
        let temp_ext = self.t_e - T_0_ABS;
        let qm_in = self.flows(p_z_ref).qm_in;
        if qm_in <= 0.0 {
            return temp_ext;
        }
        let temp_int = self.t_z - T_0_ABS;
        temp_ext + self.qm_sup_weighted_hr * (temp_int - temp_ext) / qm_in
    }
}

/// All airflow paths serving one thermal zone.
pub struct VentilationNetwork {
    f_cross: bool,
    shield_class: VentilationShieldClass,
    terrain: TerrainClass,
    zone_volume: Real,
    rho_alt: Real,
    windows: Vec<Window>,
    vents: Vec<Vent>,
    leaks: Vec<Leak>,
    mech_vents: Vec<MechanicalVentilation>,
    combustion_appliances: Vec<CombustionAppliance>,
}

impl VentilationNetwork {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        f_cross: bool,
        shield_class: VentilationShieldClass,
        terrain: TerrainClass,
        altitude: Real,
        zone_volume: Real,
        windows: Vec<Window>,
        vents: Vec<Vent>,
        leaks: Vec<Leak>,
        mech_vents: Vec<MechanicalVentilation>,
        combustion_appliances: Vec<CombustionAppliance>,
    ) -> AirflowResult<Self> {
        if !(zone_volume > 0.0) {
            return Err(AirflowError::InvalidConfig {
                what: "zone volume must be positive",
            });
        }

        let network = Self {
            f_cross,
            shield_class,
            terrain,
            zone_volume,
            rho_alt: air_density_at_altitude(altitude),
            windows,
            vents,
            leaks,
            mech_vents,
            combustion_appliances,
        };
        // look every path up in the coefficient table now so a bad
        // combination is a construction error, not a mid-run one
        for window in &network.windows {
            network.path_pressure_coeff(window.orientation(), window.pitch(), window.h_path(), 0.0)?;
        }
        for vent in &network.vents {
            network.path_pressure_coeff(vent.orientation(), vent.pitch(), vent.h_path(), 0.0)?;
        }
        for leak in &network.leaks {
            wind_pressure_coefficient(
                network.f_cross,
                network.shield_class,
                leak.h_path(),
                leak.facade_direction(),
            )
            .ok_or(AirflowError::WindTable {
                what: "leak path facade",
            })?;
        }
        Ok(network)
    }

    pub fn zone_volume(&self) -> Real {
        self.zone_volume
    }

    fn path_pressure_coeff(
        &self,
        orientation: Real,
        pitch: Real,
        h_path: Real,
        wind_direction: Real,
    ) -> AirflowResult<Real> {
        let facade = facade_direction(self.f_cross, orientation, pitch, wind_direction);
        wind_pressure_coefficient(self.f_cross, self.shield_class, h_path, facade).ok_or(
            AirflowError::WindTable {
                what: "path height and shielding",
            },
        )
    }

    /// Resolve against one timestep: all wind and table lookups happen here.
    ///
    /// * `r_w_arg` - window opening ratio, 0-1
    /// * `r_v_arg` - vent opening ratio, 0-1
    /// * `temp_int_air` - zone air temperature, C
    pub fn resolve(
        &self,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
        r_w_arg: Real,
        r_v_arg: Real,
        temp_int_air: Real,
    ) -> AirflowResult<ResolvedNetwork> {
        let wind_direction = conditions.wind_direction(it);
        let u_site = wind_speed_at_zone_level(
            terrain_roughness_coeff(self.terrain),
            conditions.wind_speed(it),
            None,
            None,
            None,
        );
        let t_e = celsius_to_kelvin(conditions.air_temp(it));
        let t_z = celsius_to_kelvin(temp_int_air);

        let mut terms = Vec::new();
        for window in &self.windows {
            let c_p = self.path_pressure_coeff(
                window.orientation(),
                window.pitch(),
                window.h_path(),
                wind_direction,
            )?;
            let c_w = window.flow_coefficient(r_w_arg, it);
            let per_part = c_w / (window.divisions() + 1.0);
            for part in window.parts() {
                terms.push(PathTerm {
                    h_path: part.h_div_path(),
                    c_p,
                    coeff: per_part,
                    exponent: crate::paths::N_WINDOW,
                    whole_product: false,
                });
            }
        }
        for vent in &self.vents {
            let c_p = self.path_pressure_coeff(
                vent.orientation(),
                vent.pitch(),
                vent.h_path(),
                wind_direction,
            )?;
            terms.push(PathTerm {
                h_path: vent.h_path(),
                c_p,
                coeff: r_v_arg * vent.flow_coefficient(),
                exponent: crate::paths::N_VENT,
                whole_product: false,
            });
        }
        for leak in &self.leaks {
            let c_p = wind_pressure_coefficient(
                self.f_cross,
                self.shield_class,
                leak.h_path(),
                leak.facade_direction(),
            )
            .ok_or(AirflowError::WindTable {
                what: "leak path facade",
            })?;
            terms.push(PathTerm {
                h_path: leak.h_path(),
                c_p,
                coeff: leak.flow_coefficient(),
                exponent: crate::paths::N_LEAK,
                whole_product: true,
            });
        }

        let mut qm_fixed_in = 0.0;
        let mut qm_fixed_out = 0.0;
        let mut qm_sup_weighted_hr = 0.0;
        for mech in &self.mech_vents {
            let (qv_sup, qv_ext) = mech.qv_supply_extract(it);
            let qm_sup = volume_to_mass_flow(qv_sup, t_e, self.rho_alt);
            qm_fixed_in += qm_sup;
            qm_sup_weighted_hr += qm_sup * mech.efficiency_hr();
            qm_fixed_out += volume_to_mass_flow(qv_ext, t_z, self.rho_alt);
        }
        for appliance in &self.combustion_appliances {
            qm_fixed_out += volume_to_mass_flow(appliance.qv_extract(it), t_z, self.rho_alt);
        }

        Ok(ResolvedNetwork {
            terms,
            qm_fixed_in,
            qm_fixed_out,
            qm_sup_weighted_hr,
            u_site,
            t_e,
            t_z,
            rho_alt: self.rho_alt,
        })
    }

    /// Smallest adjustment of the vent opening ratio that brings the air
    /// change rate inside `[ach_min, ach_max]`.
    ///
    /// Returns the initial ratio unchanged when no bound is given or the
    /// initial rate already sits inside the band. When the band cannot be
    /// reached within ratios `[0, 1]` the nearest endpoint is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn find_r_v_arg_within_bounds(
        &self,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
        ach_min: Option<Real>,
        ach_max: Option<Real>,
        initial_r_v_arg: Real,
        r_w_arg: Real,
        temp_int_air: Real,
        p_z_ref_guess: Real,
    ) -> AirflowResult<Real> {
        if ach_min.is_none() && ach_max.is_none() {
            return Ok(initial_r_v_arg);
        }

        let ach_at = |r_v_arg: Real| -> AirflowResult<Real> {
            let resolved = self.resolve(conditions, it, r_w_arg, r_v_arg, temp_int_air)?;
            let p_z_ref = resolved.internal_reference_pressure(p_z_ref_guess)?;
            Ok(resolved.air_change_rate(p_z_ref, self.zone_volume))
        };

        let ach_initial = ach_at(initial_r_v_arg)?;
        let below = ach_min.is_some_and(|min| ach_initial < min);
        let above = ach_max.is_some_and(|max| ach_initial > max);
        if !below && !above {
            return Ok(initial_r_v_arg);
        }

        // opening vents monotonically raises the rate, so the target sits at
        // the violated bound
        let target = if below {
            ach_min.unwrap_or(ach_initial)
        } else {
            ach_max.unwrap_or(ach_initial)
        };

        let lo = 0.0;
        let hi = 1.0;
        let ach_lo = ach_at(lo)?;
        let ach_hi = ach_at(hi)?;
        if target <= ach_lo {
            return Ok(lo);
        }
        if target >= ach_hi {
            return Ok(hi);
        }

        // the residual is infallible for the bisection; a solve failure at a
        // trial ratio is latched and reported instead of the root
        let mut inner_err = None;
        let r_v_arg = solve_root(
            |r| match ach_at(r) {
                Ok(ach) => ach - target,
                Err(err) => {
                    inner_err.get_or_insert(err);
                    0.0
                }
            },
            lo,
            hi,
            RootConfig {
                max_iterations: 100,
                abs_tol: 1e-6,
                what: "vent opening ratio for the target air change rate",
            },
        );
        if let Some(err) = inner_err {
            return Err(err);
        }
        Ok(r_v_arg?)
    }
}

/// Heat transfer coefficient of an incoming mass flow, W/K.
pub fn ventilation_heat_loss_coefficient(qm_in_kgh: Real) -> Real {
    qm_in_kgh * C_A / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::VentilationDuty;
    use crate::wind::FacadeDirection;
    use ds_climate::{SiteGeometry, WeatherSeries};
    use ds_controls::OnOffTimeControl;
    use ds_core::SimulationTime;

    fn conditions(
        time: &SimulationTime,
        air_temp: Real,
        wind_speed: Real,
        wind_direction: Real,
    ) -> ExternalConditions {
        let n = (time.end() / 1.0).ceil() as usize;
        ExternalConditions::new(
            time,
            WeatherSeries {
                air_temps: vec![air_temp; n],
                wind_speeds: vec![wind_speed; n],
                wind_directions: vec![wind_direction; n],
                diffuse_horizontal_radiation: vec![0.0; n],
                direct_beam_radiation: vec![0.0; n],
                ground_reflectivity: vec![0.2; n],
                time_series_step: 1.0,
                direct_beam_conversion_needed: false,
            },
            SiteGeometry {
                latitude: 51.5,
                longitude: -0.1,
                timezone: 0.0,
                leap_year: false,
                shading_segments: vec![],
            },
        )
        .unwrap()
    }

    fn leeward_leak() -> Leak {
        Leak::new(
            1.0,
            50.0,
            1.2,
            FacadeDirection::Leeward,
            100.0,
            80.0,
            20.0,
        )
        .unwrap()
    }

    #[test]
    fn single_leeward_leak_converges_to_an_outgoing_flow() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 3.7, 200.0);
        let it = time.iter().next().unwrap();

        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![],
            vec![leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap();

        let resolved = network.resolve(&conditions, &it, 0.0, 1.0, 20.0).unwrap();
        let p_z_ref = resolved.internal_reference_pressure(0.0).unwrap();
        let flows = resolved.flows(p_z_ref);

        // one path, so the balanced state carries a single signed flow and
        // a leeward facade in wind with a warm zone pushes air out
        assert!((flows.qm_in + flows.qm_out).abs() < 1e-6);
        assert_eq!(flows.qm_in, 0.0);
        assert!(flows.qm_out < 0.0);
    }

    #[test]
    fn opposed_leaks_balance_in_against_out() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 4.0, 0.0);
        let it = time.iter().next().unwrap();

        let windward = Leak::new(
            1.0,
            50.0,
            1.2,
            FacadeDirection::Windward,
            100.0,
            80.0,
            20.0,
        )
        .unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![],
            vec![windward, leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap();

        let resolved = network.resolve(&conditions, &it, 0.0, 1.0, 20.0).unwrap();
        let p_z_ref = resolved.internal_reference_pressure(0.0).unwrap();
        let flows = resolved.flows(p_z_ref);
        assert!((flows.qm_in + flows.qm_out).abs() < 1e-6);
        assert!(flows.qm_in > 0.0);
        assert!(flows.qm_out < 0.0);
    }

    #[test]
    fn shut_windows_add_no_flow() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 5.0, 4.0, 0.0);
        let it = time.iter().next().unwrap();

        let window = Window::new(1.2, 1.5, 0.5, 1, 0.0, 90.0, None).unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![window],
            vec![],
            vec![leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap();

        let with_window = network.resolve(&conditions, &it, 1.0, 1.0, 20.0).unwrap();
        let p_z_ref = with_window.internal_reference_pressure(0.0).unwrap();
        assert!((with_window.mass_balance(p_z_ref)).abs() < 1e-6);

        // the shut window contributes nothing, so the leak-only solution
        // solves the same balance
        let leak_only = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![],
            vec![leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap()
        .resolve(&conditions, &it, 1.0, 1.0, 20.0)
        .unwrap();
        let p_leak_only = leak_only.internal_reference_pressure(0.0).unwrap();
        assert!((p_z_ref - p_leak_only).abs() < 1e-6);
    }

    #[test]
    fn mvhr_fixed_flows_enter_the_balance() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 3.7, 200.0);
        let it = time.iter().next().unwrap();

        let mvhr = MechanicalVentilation::new(VentilationDuty::Mvhr, 100.0, 0.7, None).unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![],
            vec![leeward_leak()],
            vec![mvhr],
            vec![],
        )
        .unwrap();

        let resolved = network.resolve(&conditions, &it, 0.0, 1.0, 20.0).unwrap();
        let p_z_ref = resolved.internal_reference_pressure(0.0).unwrap();
        let flows = resolved.flows(p_z_ref);
        assert!((flows.qm_in + flows.qm_out).abs() < 1e-6);
        // supply at 0 C outweighs extract at 20 C slightly; both fixed flows
        // are present in the totals
        assert!(flows.qm_in > 0.0);
        assert!(flows.qm_out < 0.0);
    }

    #[test]
    fn heat_recovery_tempers_the_average_supply_temperature() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 3.7, 200.0);
        let it = time.iter().next().unwrap();

        let supply_temp_at = |efficiency_hr: Real| -> Real {
            let mvhr =
                MechanicalVentilation::new(VentilationDuty::Mvhr, 100.0, efficiency_hr, None)
                    .unwrap();
            let network = VentilationNetwork::new(
                false,
                VentilationShieldClass::Normal,
                TerrainClass::OpenTerrain,
                0.0,
                250.0,
                vec![],
                vec![],
                vec![leeward_leak()],
                vec![mvhr],
                vec![],
            )
            .unwrap();
            let resolved = network.resolve(&conditions, &it, 0.0, 1.0, 20.0).unwrap();
            let p_z_ref = resolved.internal_reference_pressure(0.0).unwrap();
            resolved.average_supply_temperature(p_z_ref)
        };

        // no recovery collapses to the outside temperature; recovery lands
        // between outside and zone air
        assert!(supply_temp_at(0.0).abs() < 1e-9);
        let tempered = supply_temp_at(0.7);
        assert!(tempered > 0.0 && tempered < 20.0);
        assert!(supply_temp_at(0.9) > tempered);
    }

    #[test]
    fn extract_fan_pulls_air_in_through_the_leak() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 0.0, 0.0);
        let it = time.iter().next().unwrap();

        let mev = MechanicalVentilation::new(
            VentilationDuty::CentralisedContinuousExtract,
            60.0,
            0.0,
            None,
        )
        .unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![],
            vec![leeward_leak()],
            vec![mev],
            vec![],
        )
        .unwrap();

        // equal temperatures, no wind: only the fan forces flow, and the
        // zone must depressurize to feed it through the leak
        let resolved = network.resolve(&conditions, &it, 0.0, 1.0, 0.0).unwrap();
        let p_z_ref = resolved.internal_reference_pressure(0.0).unwrap();
        assert!(p_z_ref < 0.0);
        let flows = resolved.flows(p_z_ref);
        assert!((flows.qm_in + flows.qm_out).abs() < 1e-6);
        assert!(flows.qm_in > 0.0);
    }

    #[test]
    fn vent_ratio_search_returns_initial_when_unbounded_or_in_band() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 3.7, 200.0);
        let it = time.iter().next().unwrap();

        let vent = Vent::new(1.5, 100.0, 20.0, 20.0, 90.0).unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![vent],
            vec![leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap();

        let unbounded = network
            .find_r_v_arg_within_bounds(&conditions, &it, None, None, 0.4, 0.0, 20.0, 0.0)
            .unwrap();
        assert_eq!(unbounded, 0.4);

        let in_band = network
            .find_r_v_arg_within_bounds(
                &conditions,
                &it,
                Some(0.0),
                Some(1e6),
                0.4,
                0.0,
                20.0,
                0.0,
            )
            .unwrap();
        assert_eq!(in_band, 0.4);
    }

    #[test]
    fn vent_ratio_search_clamps_to_endpoint_when_target_unreachable() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 3.7, 200.0);
        let it = time.iter().next().unwrap();

        let vent = Vent::new(1.5, 100.0, 20.0, 20.0, 90.0).unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![vent],
            vec![leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap();

        // an absurd minimum cannot be met even fully open
        let clamped = network
            .find_r_v_arg_within_bounds(
                &conditions,
                &it,
                Some(1e3),
                None,
                0.4,
                0.0,
                20.0,
                0.0,
            )
            .unwrap();
        assert_eq!(clamped, 1.0);
    }

    #[test]
    fn vent_ratio_search_meets_a_reachable_maximum() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 3.7, 200.0);
        let it = time.iter().next().unwrap();

        let vent = Vent::new(1.5, 2000.0, 20.0, 20.0, 90.0).unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![vent],
            vec![leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap();

        let ach_at = |r: Real| -> Real {
            let resolved = network.resolve(&conditions, &it, 0.0, r, 20.0).unwrap();
            let p = resolved.internal_reference_pressure(0.0).unwrap();
            resolved.air_change_rate(p, network.zone_volume())
        };
        let ach_full = ach_at(1.0);
        let ach_shut = ach_at(0.0);
        let target = 0.5 * (ach_shut + ach_full);

        let r = network
            .find_r_v_arg_within_bounds(
                &conditions,
                &it,
                None,
                Some(target),
                1.0,
                0.0,
                20.0,
                0.0,
            )
            .unwrap();
        assert!(r > 0.0 && r < 1.0);
        assert!((ach_at(r) - target).abs() < 1e-5);
    }

    #[test]
    fn open_window_flow_scales_against_the_shut_case() {
        let time = SimulationTime::new(0.0, 1.0, 1.0).unwrap();
        let conditions = conditions(&time, 0.0, 4.0, 0.0);
        let it = time.iter().next().unwrap();

        let window = Window::new(
            1.2,
            1.5,
            0.5,
            3,
            0.0,
            90.0,
            Some(OnOffTimeControl::always_on()),
        )
        .unwrap();
        let network = VentilationNetwork::new(
            false,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![window],
            vec![],
            vec![leeward_leak()],
            vec![],
            vec![],
        )
        .unwrap();

        let open = network.resolve(&conditions, &it, 1.0, 1.0, 20.0).unwrap();
        let p_open = open.internal_reference_pressure(0.0).unwrap();
        let shut = network.resolve(&conditions, &it, 0.0, 1.0, 20.0).unwrap();
        let p_shut = shut.internal_reference_pressure(0.0).unwrap();

        assert!(open.flows(p_open).qm_in > shut.flows(p_shut).qm_in);
    }

    #[test]
    fn heat_loss_coefficient_matches_air_heat_capacity() {
        // 3600 kg/h is 1 kg/s, so the coefficient equals c_a
        assert!((ventilation_heat_loss_coefficient(3600.0) - C_A).abs() < 1e-9);
    }

    #[test]
    fn rejects_paths_outside_the_pressure_table() {
        // 60 m path with normal shielding has no published coefficient
        let vent = Vent::new(60.0, 100.0, 20.0, 0.0, 90.0).unwrap();
        let result = VentilationNetwork::new(
            true,
            VentilationShieldClass::Normal,
            TerrainClass::OpenTerrain,
            0.0,
            250.0,
            vec![],
            vec![vent],
            vec![],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(AirflowError::WindTable { .. })));
    }
}
