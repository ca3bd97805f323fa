//! The external-conditions provider.
//!
//! Constructed once per run from the weather series and static site
//! geometry; all solar-geometry quantities are precomputed into per-day,
//! per-hour and per-timestep vectors so every query during the run is a
//! table read plus a little trig.

use ds_core::{Real, SimulationTime, SimulationTimeIteration};
use tracing::debug;

use crate::error::{ClimateError, ClimateResult};
use crate::geometry;
use crate::irradiance;
use crate::shading::{ShadingObjectKind, ShadingSegment, WindowShading};

pub const HOURS_PER_DAY: usize = 24;

/// Pre-loaded weather time series, indexed from hour 0 of the year at
/// `time_series_step` hour resolution.
#[derive(Clone, Debug)]
pub struct WeatherSeries {
    pub air_temps: Vec<Real>,
    pub wind_speeds: Vec<Real>,
    pub wind_directions: Vec<Real>,
    pub diffuse_horizontal_radiation: Vec<Real>,
    pub direct_beam_radiation: Vec<Real>,
    pub ground_reflectivity: Vec<Real>,
    pub time_series_step: Real,
    /// Whether beam values are direct-horizontal and need conversion to
    /// normal incidence.
    pub direct_beam_conversion_needed: bool,
}

/// Static site geometry.
#[derive(Clone, Debug)]
pub struct SiteGeometry {
    /// Degrees north.
    pub latitude: Real,
    /// Degrees east.
    pub longitude: Real,
    /// Hours ahead of UTC.
    pub timezone: Real,
    pub leap_year: bool,
    pub shading_segments: Vec<ShadingSegment>,
}

/// Sky/circumsolar/horizon/ground split of diffuse irradiance, W/m^2.
#[derive(Clone, Copy, Debug)]
pub struct DiffuseBreakdown {
    pub sky: Real,
    pub circumsolar: Real,
    pub horiz: Real,
    pub ground_refl: Real,
}

/// Direct/diffuse/total irradiance on a surface, W/m^2, after moving the
/// circumsolar component from diffuse to direct.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceIrradiance {
    pub direct: Real,
    pub diffuse: Real,
    pub total: Real,
}

#[derive(Debug)]
pub struct ExternalConditions {
    air_temps: Vec<Real>,
    wind_speeds: Vec<Real>,
    wind_directions: Vec<Real>,
    /// Resampled to one entry per simulation timestep.
    diffuse_horizontal_radiations: Vec<Real>,
    /// Resampled per timestep and converted to normal incidence.
    direct_beam_radiations: Vec<Real>,
    ground_reflectivity: Vec<Real>,
    latitude: Real,
    time_series_step: Real,
    shading_segments: Vec<ShadingSegment>,
    // per day of year
    solar_declinations: Vec<Real>,
    // per hour of year
    solar_hour_angles: Vec<Real>,
    solar_altitudes: Vec<Real>,
    solar_zenith_angles: Vec<Real>,
    solar_azimuth_angles: Vec<Real>,
    // per simulation timestep
    f1_circumsolar: Vec<Real>,
    f2_horizontal: Vec<Real>,
}

impl ExternalConditions {
    pub fn new(
        time: &SimulationTime,
        weather: WeatherSeries,
        site: SiteGeometry,
    ) -> ClimateResult<Self> {
        if !(-90.0..=90.0).contains(&site.latitude) {
            return Err(ClimateError::InvalidSite {
                what: "latitude outside [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&site.longitude) {
            return Err(ClimateError::InvalidSite {
                what: "longitude outside [-180, 180]",
            });
        }
        validate_segments(&site.shading_segments)?;

        let required = (time.end() / weather.time_series_step).ceil() as usize;
        check_series_len("air_temps", weather.air_temps.len(), required)?;
        check_series_len("wind_speeds", weather.wind_speeds.len(), required)?;
        check_series_len("wind_directions", weather.wind_directions.len(), required)?;
        check_series_len(
            "diffuse_horizontal_radiation",
            weather.diffuse_horizontal_radiation.len(),
            required,
        )?;
        check_series_len(
            "direct_beam_radiation",
            weather.direct_beam_radiation.len(),
            required,
        )?;
        check_series_len(
            "ground_reflectivity",
            weather.ground_reflectivity.len(),
            required,
        )?;

        let days_in_year = if site.leap_year { 366 } else { 365 };
        let hours_in_year = days_in_year * HOURS_PER_DAY;
        let time_shift = geometry::time_shift(site.timezone, site.longitude);

        let earth_orbit_deviations: Vec<Real> = (0..days_in_year)
            .map(geometry::earth_orbit_deviation)
            .collect();
        let extra_terrestrial: Vec<Real> = earth_orbit_deviations
            .iter()
            .map(|&dev| geometry::extra_terrestrial_radiation(dev))
            .collect();
        let solar_declinations: Vec<Real> = earth_orbit_deviations
            .iter()
            .map(|&dev| geometry::solar_declination(dev))
            .collect();
        let equations_of_time: Vec<Real> =
            (0..days_in_year).map(geometry::equation_of_time).collect();

        let solar_hour_angles: Vec<Real> = (0..hours_in_year)
            .map(|hour| {
                let solar_time = geometry::solar_time(
                    hour % HOURS_PER_DAY,
                    equations_of_time[hour / HOURS_PER_DAY],
                    time_shift,
                );
                geometry::solar_hour_angle(solar_time)
            })
            .collect();
        let solar_altitudes: Vec<Real> = (0..hours_in_year)
            .map(|hour| {
                geometry::solar_altitude(
                    site.latitude,
                    solar_declinations[hour / HOURS_PER_DAY],
                    solar_hour_angles[hour],
                )
            })
            .collect();
        let solar_zenith_angles: Vec<Real> = solar_altitudes
            .iter()
            .map(|&alt| geometry::solar_zenith_angle(alt))
            .collect();
        let solar_azimuth_angles: Vec<Real> = (0..hours_in_year)
            .map(|hour| {
                geometry::solar_azimuth_angle(
                    site.latitude,
                    solar_declinations[hour / HOURS_PER_DAY],
                    solar_hour_angles[hour],
                    solar_altitudes[hour],
                )
            })
            .collect();
        let air_masses: Vec<Real> = solar_altitudes
            .iter()
            .map(|&alt| geometry::air_mass(alt))
            .collect();

        // resample radiation series to one entry per simulation timestep
        let direct_beam_radiations: Vec<Real> = time
            .iter()
            .map(|it| {
                irradiance::direct_beam_to_normal_incidence(
                    weather.direct_beam_conversion_needed,
                    weather.direct_beam_radiation[it.time_series_idx(weather.time_series_step)],
                    solar_altitudes[it.current_hour()],
                )
            })
            .collect();
        let diffuse_horizontal_radiations: Vec<Real> = time
            .iter()
            .map(|it| {
                weather.diffuse_horizontal_radiation[it.time_series_idx(weather.time_series_step)]
            })
            .collect();

        let clearness: Vec<Real> = time
            .iter()
            .map(|it| {
                irradiance::clearness_parameter(
                    diffuse_horizontal_radiations[it.index],
                    direct_beam_radiations[it.index],
                    solar_altitudes[it.current_hour()],
                )
            })
            .collect();
        let sky_brightness: Vec<Real> = time
            .iter()
            .map(|it| {
                irradiance::sky_brightness_parameter(
                    air_masses[it.current_hour()],
                    diffuse_horizontal_radiations[it.index],
                    extra_terrestrial[it.current_day()],
                )
            })
            .collect();
        let f1_circumsolar: Vec<Real> = time
            .iter()
            .map(|it| {
                irradiance::f1_circumsolar(
                    clearness[it.index],
                    sky_brightness[it.index],
                    solar_zenith_angles[it.current_hour()],
                )
            })
            .collect();
        let f2_horizontal: Vec<Real> = time
            .iter()
            .map(|it| {
                irradiance::f2_horizontal(
                    clearness[it.index],
                    sky_brightness[it.index],
                    solar_zenith_angles[it.current_hour()],
                )
            })
            .collect();

        debug!(
            days_in_year,
            timesteps = time.total_steps(),
            "precomputed solar geometry"
        );

        Ok(Self {
            air_temps: weather.air_temps,
            wind_speeds: weather.wind_speeds,
            wind_directions: weather.wind_directions,
            diffuse_horizontal_radiations,
            direct_beam_radiations,
            ground_reflectivity: weather.ground_reflectivity,
            latitude: site.latitude,
            time_series_step: weather.time_series_step,
            shading_segments: site.shading_segments,
            solar_declinations,
            solar_hour_angles,
            solar_altitudes,
            solar_zenith_angles,
            solar_azimuth_angles,
            f1_circumsolar,
            f2_horizontal,
        })
    }

    fn series_idx(&self, it: &SimulationTimeIteration) -> usize {
        it.time_series_idx(self.time_series_step)
    }

    pub fn air_temp(&self, it: &SimulationTimeIteration) -> Real {
        self.air_temps[self.series_idx(it)]
    }

    /// Annual mean air temperature, if a full year of data is present.
    pub fn air_temp_annual(&self) -> Option<Real> {
        let full_year = (8760.0 / self.time_series_step) as usize;
        if self.air_temps.len() < full_year {
            return None;
        }
        let slice = &self.air_temps[..full_year];
        Some(slice.iter().sum::<Real>() / slice.len() as Real)
    }

    /// Mean air temperature over a month given its (start, end) hours of year.
    pub fn air_temp_monthly(&self, month_start_end_hours: (usize, usize)) -> Real {
        let start = (month_start_end_hours.0 as Real / self.time_series_step) as usize;
        let end = (month_start_end_hours.1 as Real / self.time_series_step) as usize;
        let slice = &self.air_temps[start..end];
        slice.iter().sum::<Real>() / slice.len() as Real
    }

    pub fn wind_speed(&self, it: &SimulationTimeIteration) -> Real {
        self.wind_speeds[self.series_idx(it)]
    }

    /// Annual mean wind speed, if a full year of data is present.
    pub fn wind_speed_annual(&self) -> Option<Real> {
        let full_year = (8760.0 / self.time_series_step) as usize;
        if self.wind_speeds.len() < full_year {
            return None;
        }
        let slice = &self.wind_speeds[..full_year];
        Some(slice.iter().sum::<Real>() / slice.len() as Real)
    }

    /// Wind direction in degrees where the wind is blowing from.
    pub fn wind_direction(&self, it: &SimulationTimeIteration) -> Real {
        self.wind_directions[self.series_idx(it)]
    }

    pub fn diffuse_horizontal_radiation(&self, it: &SimulationTimeIteration) -> Real {
        self.diffuse_horizontal_radiations[it.index]
    }

    pub fn direct_beam_radiation(&self, it: &SimulationTimeIteration) -> Real {
        self.direct_beam_radiations[it.index]
    }

    pub fn ground_reflectivity(&self, it: &SimulationTimeIteration) -> Real {
        self.ground_reflectivity[self.series_idx(it)]
    }

    pub fn solar_altitude(&self, it: &SimulationTimeIteration) -> Real {
        self.solar_altitudes[it.current_hour()]
    }

    pub fn solar_azimuth(&self, it: &SimulationTimeIteration) -> Real {
        self.solar_azimuth_angles[it.current_hour()]
    }

    /// Angle of incidence of the solar beam on the surface, degrees.
    pub fn solar_angle_of_incidence(
        &self,
        tilt: Real,
        orientation: Real,
        it: &SimulationTimeIteration,
    ) -> Real {
        geometry::solar_angle_of_incidence(
            tilt,
            orientation,
            self.latitude,
            self.solar_declinations[it.current_day()],
            self.solar_hour_angles[it.current_hour()],
        )
    }

    /// Beam irradiance falling on the surface (excluding circumsolar), W/m^2.
    fn direct_irradiance(&self, tilt: Real, orientation: Real, it: &SimulationTimeIteration) -> Real {
        let irr = self.direct_beam_radiation(it)
            * self
                .solar_angle_of_incidence(tilt, orientation, it)
                .to_radians()
                .cos();
        irr.max(0.0)
    }

    /// Incidence-weighted circumsolar solid-angle ratio a/b.
    fn a_over_b(&self, tilt: Real, orientation: Real, it: &SimulationTimeIteration) -> Real {
        let a = self
            .solar_angle_of_incidence(tilt, orientation, it)
            .to_radians()
            .cos()
            .max(0.0);
        let b = self.solar_zenith_angles[it.current_hour()]
            .to_radians()
            .cos()
            .max(85.0_f64.to_radians().cos());
        a / b
    }

    fn circumsolar_irradiance(
        &self,
        tilt: Real,
        orientation: Real,
        it: &SimulationTimeIteration,
    ) -> Real {
        self.diffuse_horizontal_radiation(it)
            * self.f1_circumsolar[it.index]
            * self.a_over_b(tilt, orientation, it)
    }

    /// Diffuse irradiance on the surface split into its components
    /// (sky + circumsolar + horizon), W/m^2.
    fn diffuse_irradiance(
        &self,
        tilt: Real,
        orientation: Real,
        it: &SimulationTimeIteration,
    ) -> (Real, Real, Real, Real) {
        let gsol_d = self.diffuse_horizontal_radiation(it);
        let f1 = self.f1_circumsolar[it.index];
        let f2 = self.f2_horizontal[it.index];

        let sky = gsol_d * (1.0 - f1) * ((1.0 + tilt.to_radians().cos()) / 2.0);
        let circumsolar = self.circumsolar_irradiance(tilt, orientation, it);
        let horiz = gsol_d * f2 * tilt.to_radians().sin();

        (sky + circumsolar + horiz, sky, circumsolar, horiz)
    }

    fn ground_reflection_irradiance(&self, tilt: Real, it: &SimulationTimeIteration) -> Real {
        (self.diffuse_horizontal_radiation(it)
            + self.direct_beam_radiation(it) * self.solar_altitude(it).to_radians().sin())
            * self.ground_reflectivity(it)
            * ((1.0 - tilt.to_radians().cos()) / 2.0)
    }

    /// Total direct and diffuse irradiance on the surface, with circumsolar
    /// radiation counted as direct and ground reflection as diffuse.
    pub fn surface_irradiance(
        &self,
        tilt: Real,
        orientation: Real,
        it: &SimulationTimeIteration,
    ) -> SurfaceIrradiance {
        let (breakdown, irr) = self.surface_irradiance_with_breakdown(tilt, orientation, it);
        let _ = breakdown;
        irr
    }

    fn surface_irradiance_with_breakdown(
        &self,
        tilt: Real,
        orientation: Real,
        it: &SimulationTimeIteration,
    ) -> (DiffuseBreakdown, SurfaceIrradiance) {
        let (diffuse_total, sky, circumsolar, horiz) =
            self.diffuse_irradiance(tilt, orientation, it);
        let ground_refl = self.ground_reflection_irradiance(tilt, it);

        let direct = self.direct_irradiance(tilt, orientation, it) + circumsolar;
        let diffuse = diffuse_total - circumsolar + ground_refl;
        (
            DiffuseBreakdown {
                sky,
                circumsolar,
                horiz,
                ground_refl,
            },
            SurfaceIrradiance {
                direct,
                diffuse,
                total: direct + diffuse,
            },
        )
    }

    /// Whether the surface faces away from the solar beam entirely (based on
    /// a vertical projection of the surface). Direct shading from objects is
    /// skipped in that case since the irradiance calculation already zeroes
    /// beam radiation arriving from behind the surface.
    fn outside_solar_beam(
        &self,
        tilt: Real,
        orientation: Real,
        it: &SimulationTimeIteration,
    ) -> bool {
        let hour = it.current_hour();
        let mut test1 = orientation - self.solar_azimuth_angles[hour];
        if test1 > 180.0 {
            test1 -= 360.0;
        } else if test1 < -180.0 {
            test1 += 360.0;
        }
        let test2 = tilt - self.solar_altitudes[hour];
        !(-90.0..=90.0).contains(&test1) || !(-90.0..=90.0).contains(&test2)
    }

    fn segment_for(&self, it: &SimulationTimeIteration) -> ClimateResult<&ShadingSegment> {
        let azimuth = self.solar_azimuth_angles[it.current_hour()];
        self.shading_segments
            .iter()
            .find(|segment| segment.contains_azimuth(azimuth))
            .ok_or(ClimateError::SegmentNotFound { azimuth })
    }

    /// Shade height cast on a surface by a distant obstacle, m.
    fn obstacle_shade_height(
        &self,
        base_height: Real,
        obstacle_height: Real,
        distance: Real,
        it: &SimulationTimeIteration,
    ) -> Real {
        let altitude = self.solar_altitude(it);
        (obstacle_height - base_height - distance * altitude.to_radians().tan()).max(0.0)
    }

    /// Shade height cast on a surface by a distant overhang, m.
    fn overhang_shade_height(
        &self,
        surface_height: Real,
        base_height: Real,
        overhang_height: Real,
        distance: Real,
        it: &SimulationTimeIteration,
    ) -> Real {
        let altitude = self.solar_altitude(it);
        (surface_height + base_height - overhang_height + distance * altitude.to_radians().tan())
            .max(0.0)
    }

    /// Shading factor for the direct beam from distant and window-local
    /// objects: sunlit fraction of the surface.
    fn direct_shading_reduction_factor(
        &self,
        base_height: Real,
        height: Real,
        width: Real,
        orientation: Real,
        window_shading: &[WindowShading],
        it: &SimulationTimeIteration,
    ) -> ClimateResult<Real> {
        let mut hshade_obst: Real = 0.0;
        let mut hshade_ovh: Real = 0.0;
        let mut wfin_r: Real = 0.0;
        let mut wfin_l: Real = 0.0;

        let segment = self.segment_for(it)?;
        for object in &segment.objects {
            match object.kind {
                ShadingObjectKind::Obstacle => {
                    let shade =
                        self.obstacle_shade_height(base_height, object.height, object.distance, it);
                    hshade_obst = hshade_obst.max(shade);
                }
                ShadingObjectKind::Overhang => {
                    let shade = self.overhang_shade_height(
                        height,
                        base_height,
                        object.height,
                        object.distance,
                        it,
                    );
                    hshade_ovh = hshade_ovh.max(shade);
                }
            }
        }

        let altitude = self.solar_altitude(it);
        let azimuth = self.solar_azimuth(it);
        for object in window_shading {
            match *object {
                WindowShading::Overhang { depth, distance } => {
                    let shade = depth * altitude.to_radians().tan()
                        / (azimuth - orientation).to_radians().cos()
                        - distance;
                    hshade_ovh = hshade_ovh.max(shade);
                }
                WindowShading::SideFinRight { depth, distance } => {
                    // a right fin only shades when the sun is to its left
                    let check = azimuth - orientation;
                    let shade = if check > 0.0 {
                        0.0
                    } else {
                        depth * check.to_radians().tan() - distance
                    };
                    wfin_r = wfin_r.max(shade);
                }
                WindowShading::SideFinLeft { depth, distance } => {
                    let check = azimuth - orientation;
                    let shade = if check < 0.0 {
                        0.0
                    } else {
                        depth * check.to_radians().tan() - distance
                    };
                    wfin_l = wfin_l.max(shade);
                }
                WindowShading::Reveal { .. } => {
                    return Err(ClimateError::InvalidSite {
                        what: "reveal must be expanded before factor calculation",
                    });
                }
            }
        }

        let hk_obst = height.min(hshade_obst);
        let hk_ovh = height.min(hshade_ovh);
        let hk_sun = (height - (hk_obst + hk_ovh)).max(0.0);

        let wk_fin_r = width.min(wfin_r);
        let wk_fin_l = width.min(wfin_l);
        let wk_sun = (width - (wk_fin_r + wk_fin_l)).max(0.0);

        Ok((hk_sun * wk_sun) / (height * width))
    }

    /// Shading factor for diffuse radiation from window-local overhangs and
    /// side fins (view-factor method, ISO/TR 52016-2 section F.6.3).
    fn diffuse_shading_reduction_factor(
        &self,
        breakdown: DiffuseBreakdown,
        tilt: Real,
        height: Real,
        width: Real,
        window_shading: &[WindowShading],
    ) -> ClimateResult<Real> {
        let diffuse_irr_sky = breakdown.sky;
        let diffuse_irr_hor = breakdown.horiz;
        let diffuse_irr_ref = breakdown.ground_refl;
        let diffuse_irr_total = diffuse_irr_sky + diffuse_irr_hor + diffuse_irr_ref;
        if diffuse_irr_total == 0.0 {
            return Err(ClimateError::ZeroDiffuse);
        }

        let beta = tilt.to_radians();

        // depth/distance pairs per object family; distance defaults to 1 to
        // avoid dividing by zero when a family has no objects
        let mut overhangs: Vec<(Real, Real)> = vec![];
        let mut fins_left: Vec<(Real, Real)> = vec![];
        let mut fins_right: Vec<(Real, Real)> = vec![];
        for object in window_shading {
            match *object {
                WindowShading::Overhang { depth, distance } => overhangs.push((depth, distance)),
                WindowShading::SideFinLeft { depth, distance } => fins_left.push((depth, distance)),
                WindowShading::SideFinRight { depth, distance } => {
                    fins_right.push((depth, distance))
                }
                WindowShading::Reveal { .. } => {
                    return Err(ClimateError::InvalidSite {
                        what: "reveal must be expanded before factor calculation",
                    });
                }
            }
        }
        if overhangs.is_empty() {
            overhangs.push((0.0, 1.0));
        }
        if fins_left.is_empty() {
            fins_left.push((0.0, 1.0));
        }
        if fins_right.is_empty() {
            fins_right.push((0.0, 1.0));
        }

        let view_factor_sky_no_obstacles = (1.0 + beta.cos()) / 2.0;
        let view_factor_ground_no_obstacles = (1.0 - beta.cos()) / 2.0;

        // evaluate every combination of one overhang and one fin per side,
        // keeping the largest combined factor
        let mut fdiff_max: Option<Real> = None;
        for &(d_ovh, l_ovh) in &overhangs {
            for &(d_fin_l, l_fin_l) in &fins_left {
                for &(d_fin_r, l_fin_r) in &fins_right {
                    let p1_ovh = d_ovh / height;
                    let p2_ovh = l_ovh / height;
                    let p1_fin_l = d_fin_l / width;
                    let p2_fin_l = l_fin_l / width;
                    let p1_fin_r = d_fin_r / width;
                    let p2_fin_r = l_fin_r / width;

                    // view factors, eqns F.15 to F.18; the fin view factor is
                    // averaged over the two sides since the standard assumes
                    // identical fins
                    let f_w_s = (0.6514
                        * (1.0 - p2_fin_l / (p1_fin_l.powi(2) + p2_fin_l.powi(2)).sqrt())
                        + 0.6514 * (1.0 - p2_fin_r / (p1_fin_r.powi(2) + p2_fin_r.powi(2)).sqrt()))
                        / 2.0;
                    let f_w_o = 0.3282 * (1.0 - p2_ovh / (p1_ovh.powi(2) + p2_ovh.powi(2)).sqrt());
                    let f_w_sky = (1.0 - (beta - 90.0_f64.to_radians()).sin()) / 2.0;

                    let f_sh_dif_fins = if view_factor_sky_no_obstacles == 0.0 {
                        1.0
                    } else {
                        (1.0 - f_w_s) * f_w_sky / view_factor_sky_no_obstacles
                    };
                    let f_sh_ref_fins = if view_factor_ground_no_obstacles == 0.0 {
                        1.0
                    } else {
                        (1.0 - f_w_s) * (1.0 - f_w_sky) / view_factor_ground_no_obstacles
                    };
                    let f_sh_dif_overhangs = if view_factor_sky_no_obstacles == 0.0 {
                        1.0
                    } else {
                        (f_w_sky - f_w_o) / view_factor_sky_no_obstacles
                    };
                    let f_sh_ref_overhangs = if view_factor_ground_no_obstacles == 0.0 {
                        1.0
                    } else {
                        (1.0 - f_w_sky) / view_factor_ground_no_obstacles
                    };

                    let f_sh_dif = f_sh_dif_fins.min(f_sh_dif_overhangs).max(0.0);
                    let f_sh_ref = f_sh_ref_fins.min(f_sh_ref_overhangs).max(0.0);

                    let fdiff = (f_sh_dif * (diffuse_irr_sky + diffuse_irr_hor)
                        + f_sh_ref * diffuse_irr_ref)
                        / diffuse_irr_total;
                    fdiff_max = Some(match fdiff_max {
                        Some(best) => best.max(fdiff),
                        None => fdiff,
                    });
                }
            }
        }

        Ok(fdiff_max.unwrap_or(1.0))
    }

    /// Direct and diffuse shading reduction factors for a surface, combining
    /// distant (segment) shading with window-local overhangs, fins and
    /// reveals. Returns (0, 0) when there is no radiation at all.
    pub fn shading_reduction_factor_direct_diffuse(
        &self,
        base_height: Real,
        height: Real,
        width: Real,
        tilt: Real,
        orientation: Real,
        window_shading: &[WindowShading],
        it: &SimulationTimeIteration,
    ) -> ClimateResult<(Real, Real)> {
        let (breakdown, irr) = self.surface_irradiance_with_breakdown(tilt, orientation, it);
        if irr.total == 0.0 {
            return Ok((0.0, 0.0));
        }

        let expanded = WindowShading::expand(window_shading);

        let fdir = if self.outside_solar_beam(tilt, orientation, it) {
            1.0
        } else {
            self.direct_shading_reduction_factor(
                base_height,
                height,
                width,
                orientation,
                &expanded,
                it,
            )?
        };

        let fdiff =
            self.diffuse_shading_reduction_factor(breakdown, tilt, height, width, &expanded)?;

        Ok((fdir, fdiff))
    }
}

fn check_series_len(what: &'static str, len: usize, required: usize) -> ClimateResult<()> {
    if len < required {
        Err(ClimateError::SeriesTooShort {
            what,
            len,
            required,
        })
    } else {
        Ok(())
    }
}

fn validate_segments(segments: &[ShadingSegment]) -> ClimateResult<()> {
    let mut previous_end: Option<Real> = None;
    for (index, segment) in segments.iter().enumerate() {
        if segment.end >= segment.start {
            return Err(ClimateError::SegmentOrder { index });
        }
        if let Some(end) = previous_end {
            if end != segment.start {
                return Err(ClimateError::SegmentGap { index: index - 1 });
            }
        }
        previous_end = Some(segment.end);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::ShadingObject;

    fn full_circle_segments() -> Vec<ShadingSegment> {
        vec![
            ShadingSegment {
                start: 180.0,
                end: 90.0,
                objects: vec![],
            },
            ShadingSegment {
                start: 90.0,
                end: 0.0,
                objects: vec![],
            },
            ShadingSegment {
                start: 0.0,
                end: -90.0,
                objects: vec![],
            },
            ShadingSegment {
                start: -90.0,
                end: -180.0,
                objects: vec![],
            },
        ]
    }

    fn test_conditions(hours: usize) -> (SimulationTime, ExternalConditions) {
        let time = SimulationTime::new(0.0, hours as f64, 1.0).unwrap();
        let n = hours;
        let weather = WeatherSeries {
            air_temps: vec![5.0; n],
            wind_speeds: vec![4.0; n],
            wind_directions: vec![180.0; n],
            diffuse_horizontal_radiation: vec![100.0; n],
            direct_beam_radiation: vec![300.0; n],
            ground_reflectivity: vec![0.2; n],
            time_series_step: 1.0,
            direct_beam_conversion_needed: false,
        };
        let site = SiteGeometry {
            latitude: 51.5,
            longitude: -0.1,
            timezone: 0.0,
            leap_year: false,
            shading_segments: full_circle_segments(),
        };
        let conditions = ExternalConditions::new(&time, weather, site).unwrap();
        (time, conditions)
    }

    #[test]
    fn rejects_short_series() {
        let time = SimulationTime::new(0.0, 48.0, 1.0).unwrap();
        let weather = WeatherSeries {
            air_temps: vec![5.0; 24],
            wind_speeds: vec![4.0; 48],
            wind_directions: vec![180.0; 48],
            diffuse_horizontal_radiation: vec![100.0; 48],
            direct_beam_radiation: vec![300.0; 48],
            ground_reflectivity: vec![0.2; 48],
            time_series_step: 1.0,
            direct_beam_conversion_needed: false,
        };
        let site = SiteGeometry {
            latitude: 51.5,
            longitude: -0.1,
            timezone: 0.0,
            leap_year: false,
            shading_segments: full_circle_segments(),
        };
        let err = ExternalConditions::new(&time, weather, site).unwrap_err();
        assert!(matches!(err, ClimateError::SeriesTooShort { .. }));
    }

    #[test]
    fn rejects_segment_gap() {
        let segments = vec![
            ShadingSegment {
                start: 180.0,
                end: 90.0,
                objects: vec![],
            },
            ShadingSegment {
                start: 45.0,
                end: -180.0,
                objects: vec![],
            },
        ];
        let err = validate_segments(&segments).unwrap_err();
        assert!(matches!(err, ClimateError::SegmentGap { .. }));
    }

    #[test]
    fn surface_irradiance_components_non_negative() {
        let (time, conditions) = test_conditions(24);
        for it in time.iter() {
            let irr = conditions.surface_irradiance(90.0, 0.0, &it);
            assert!(irr.direct >= 0.0);
            assert!(irr.diffuse >= 0.0);
            assert!((irr.total - irr.direct - irr.diffuse).abs() < 1e-9);
        }
    }

    #[test]
    fn south_wall_gets_more_direct_than_north_wall_at_midday() {
        let (time, conditions) = test_conditions(24);
        let midday = time.iter().nth(12).unwrap();
        let south = conditions.surface_irradiance(90.0, 0.0, &midday);
        let north = conditions.surface_irradiance(90.0, 180.0, &midday);
        assert!(south.direct > north.direct);
    }

    #[test]
    fn no_shading_objects_give_unity_direct_factor_in_beam() {
        let (time, conditions) = test_conditions(24);
        let midday = time.iter().nth(12).unwrap();
        let (fdir, fdiff) = conditions
            .shading_reduction_factor_direct_diffuse(0.0, 1.25, 4.0, 90.0, 0.0, &[], &midday)
            .unwrap();
        assert!((fdir - 1.0).abs() < 1e-9);
        assert!(fdiff > 0.0 && fdiff <= 1.0);
    }

    #[test]
    fn obstacle_reduces_direct_factor() {
        let time = SimulationTime::new(0.0, 24.0, 1.0).unwrap();
        let n = 24;
        let weather = WeatherSeries {
            air_temps: vec![5.0; n],
            wind_speeds: vec![4.0; n],
            wind_directions: vec![180.0; n],
            diffuse_horizontal_radiation: vec![100.0; n],
            direct_beam_radiation: vec![300.0; n],
            ground_reflectivity: vec![0.2; n],
            time_series_step: 1.0,
            direct_beam_conversion_needed: false,
        };
        let mut segments = full_circle_segments();
        for segment in &mut segments {
            segment.objects.push(ShadingObject {
                kind: ShadingObjectKind::Obstacle,
                height: 30.0,
                distance: 2.0,
            });
        }
        let site = SiteGeometry {
            latitude: 51.5,
            longitude: -0.1,
            timezone: 0.0,
            leap_year: false,
            shading_segments: segments,
        };
        let conditions = ExternalConditions::new(&time, weather, site).unwrap();
        let midday = time.iter().nth(12).unwrap();
        let (fdir, _) = conditions
            .shading_reduction_factor_direct_diffuse(0.0, 1.25, 4.0, 90.0, 0.0, &[], &midday)
            .unwrap();
        assert!(fdir < 1.0);
    }

    #[test]
    fn annual_averages_need_full_year() {
        let (_, conditions) = test_conditions(24);
        assert!(conditions.air_temp_annual().is_none());
        assert!(conditions.wind_speed_annual().is_none());
    }
}
