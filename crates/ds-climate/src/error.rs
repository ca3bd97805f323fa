use thiserror::Error;

pub type ClimateResult<T> = Result<T, ClimateError>;

#[derive(Error, Debug)]
pub enum ClimateError {
    #[error("Weather series too short: {what} has {len} entries, need at least {required}")]
    SeriesTooShort {
        what: &'static str,
        len: usize,
        required: usize,
    },

    #[error("Shading segment {index}: end azimuth must be less than start azimuth")]
    SegmentOrder { index: usize },

    #[error("Shading segments must be contiguous (gap after segment {index})")]
    SegmentGap { index: usize },

    #[error("No shading segment covers solar azimuth {azimuth} degrees")]
    SegmentNotFound { azimuth: f64 },

    #[error("Zero diffuse radiation with non-zero direct radiation")]
    ZeroDiffuse,

    #[error("Invalid site geometry: {what}")]
    InvalidSite { what: &'static str },
}
