use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrOrigin {
    Config,
    Input,
    Io,
}

#[derive(Debug, Error)]
#[error("{origin:?} error: {msg}")]
pub struct ApiErr {
    pub origin: ErrOrigin,
    pub msg: String,
}

pub fn static_err(origin: ErrOrigin, msg: &'static str) -> ApiErr {
    ApiErr {
        origin,
        msg: String::from(msg),
    }
}

impl From<std::io::Error> for ApiErr {
    fn from(err: std::io::Error) -> Self {
        ApiErr { msg:    format!("{}", err),
                 origin: ErrOrigin::Io, }
    }
}

impl From<toml::de::Error> for ApiErr {
    fn from(err: toml::de::Error) -> Self {
        ApiErr { msg:    format!("{}", err),
                 origin: ErrOrigin::Config, }
    }
}

impl From<serde_json::Error> for ApiErr {
    fn from(err: serde_json::Error) -> Self {
        ApiErr { msg:    format!("{}", err),
                 origin: ErrOrigin::Input, }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_origin() {
        let err = static_err(ErrOrigin::Config, "bad thumbnail template");
        assert_eq!(err.to_string(), "Config error: bad thumbnail template");
    }

    #[test]
    fn test_json_error_maps_to_input() {
        let err: ApiErr = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert_eq!(err.origin, ErrOrigin::Input);
    }
}
