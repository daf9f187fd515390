//! Configuration validation

use super::error::ConfigResult;

/// Configuration object that can check its own ranges
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    fn config_name(&self) -> &'static str {
        "Config"
    }
}

impl<T: Validatable> Validatable for Option<T> {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            Some(config) => config.validate(),
            None => Ok(()),
        }
    }
}

/// Range check helper used by every section
pub(crate) fn check_range<T>(
    field: &str,
    value: T,
    min: T,
    max: T,
    hint: &str,
) -> ConfigResult<()>
where
    T: PartialOrd + ToString + Copy,
{
    if value < min || value > max {
        return Err(super::error::ConfigError::range_with_hint(
            field, value, min, max, hint,
        ));
    }
    Ok(())
}
