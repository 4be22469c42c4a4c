use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// The host refused to allocate a status-bar slot, or the initial icon could not be shown
    InitFailure(String),
    /// The icon resource is missing, empty, or could not be decoded
    IconLoadFailure(String),
    /// The context menu could not be built or attached
    MenuError(String),
    /// The controller has been torn down
    Disposed,
    ConfigError(String),
    IoError(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InitFailure(msg) => write!(f, "Status item initialization failed: {}", msg),
            AppError::IconLoadFailure(msg) => write!(f, "Icon load failed: {}", msg),
            AppError::MenuError(msg) => write!(f, "Context menu error: {}", msg),
            AppError::Disposed => write!(f, "Status item has been disposed"),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::IconLoadFailure(err.to_string())
    }
}

#[cfg(any(windows, target_os = "macos"))]
impl From<muda::Error> for AppError {
    fn from(err: muda::Error) -> Self {
        AppError::MenuError(err.to_string())
    }
}

#[cfg(any(windows, target_os = "macos"))]
impl From<tray_icon::Error> for AppError {
    fn from(err: tray_icon::Error) -> Self {
        AppError::InitFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Fatal,
    Recoverable,
    Minor,
}

impl AppError {
    /// How the surrounding application should treat this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::InitFailure(_) | AppError::ConfigError(_) => ErrorSeverity::Fatal,
            AppError::IconLoadFailure(_) | AppError::MenuError(_) | AppError::IoError(_) => {
                ErrorSeverity::Recoverable
            }
            AppError::Disposed => ErrorSeverity::Minor,
        }
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, AppError::Disposed)
    }
}
