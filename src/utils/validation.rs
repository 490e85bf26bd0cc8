use crate::utils::error::{LaunchError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LaunchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LaunchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(LaunchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LaunchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LaunchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// `--server.<key>=<value>` 的 key：只允許英數字、`_`、`.`
pub fn validate_option_key(field_name: &str, key: &str, reserved: &[&str]) -> Result<()> {
    validate_non_empty_string(field_name, key)?;

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(LaunchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: key.to_string(),
            reason: "Option keys may only contain letters, digits, '_' and '.'".to_string(),
        });
    }

    if reserved.contains(&key) {
        return Err(LaunchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: key.to_string(),
            reason: format!(
                "Option is fixed by the launcher and cannot be overridden. Fixed options: {}",
                reserved.join(", ")
            ),
        });
    }

    Ok(())
}
