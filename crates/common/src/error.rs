/// Error taxonomy shared by every storage driver.
///
/// Public operations return exactly one of these kinds; low-level transport
/// errors are mapped in via the `From` impls below and never escape raw.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("path not found")]
    PathNotFound,
    #[error("object is not a file")]
    NotFile,
    #[error("object is not a folder")]
    NotFolder,
    #[error("operation not supported by this driver")]
    NotSupported,
    #[error("operation not implemented")]
    NotImplemented,
    #[error("empty file stream")]
    EmptyFile,
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("vendor error: {0}")]
    Vendor(String),
    #[error("operation canceled")]
    Canceled,
    #[error("operation timed out")]
    Timeout,
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => DriverError::PathNotFound,
            std::io::ErrorKind::TimedOut => DriverError::Timeout,
            _ => DriverError::Vendor(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DriverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DriverError::Timeout
        } else {
            DriverError::Vendor(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Vendor(format!("malformed vendor response: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_path_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(DriverError::from(io), DriverError::PathNotFound));
    }

    #[test]
    fn other_io_errors_map_to_vendor() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(DriverError::from(io), DriverError::Vendor(_)));
    }
}
