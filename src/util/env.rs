use thiserror::Error;

pub type EnvResult<T> = core::result::Result<T, EnvError>;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("missing environment variable '{0}'")]
    Missing(&'static str),

    #[error("environment variable '{name}' is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, loaded once in `main` and passed by value into
/// constructors.
#[derive(Debug, Clone)]
pub struct Env {
    pub redis_url: String,
    pub api_port: u16,
}

impl Env {
    pub fn load() -> EnvResult<Self> {
        Ok(Self {
            redis_url: required("REDIS_URL")?,
            api_port: required("API_PORT")?.parse().map_err(|e| EnvError::Invalid {
                name: "API_PORT",
                reason: format!("{e}"),
            })?,
        })
    }
}

fn required(name: &'static str) -> EnvResult<String> {
    std::env::var(name).map_err(|_| EnvError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vars_are_named_in_the_error() {
        let err = required("GOLD_LEDGER_TEST_UNSET_VAR").expect_err("unset var");
        assert!(err.to_string().contains("GOLD_LEDGER_TEST_UNSET_VAR"));
    }
}
