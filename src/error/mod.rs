use std::fmt;

#[derive(Debug)]
pub enum ScreeningError {
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
    CsvError(csv::Error),
    Http(reqwest::Error),
    Status(u16),
    Timeout,
    Config(String),
    InvalidAge(String),
    UnknownGame(String),
    EmptyBank(String),
    IncompleteBank(String),
    AgeRestricted { game: &'static str, min_age: u8 },
    Download(String),
    InvalidTransition(&'static str),
    InvalidScore { game_id: String, score: u32, total: u32 },
    NoResults,
}

impl ScreeningError {
    /// Text safe to show to the child or parent in chat.
    pub fn user_message(&self) -> String {
        match self {
            ScreeningError::InvalidAge(msg) => msg.clone(),
            ScreeningError::NoResults => {
                "No games played yet. Use /play to start a game first.".to_string()
            }
            ScreeningError::UnknownGame(id) => format!("There is no game called \"{}\".", id),
            ScreeningError::AgeRestricted { game, min_age } => {
                format!("{} is for children aged {} and up.", game, min_age)
            }
            ScreeningError::Download(_) => {
                "Could not read the photo. Please send it again.".to_string()
            }
            ScreeningError::Http(_) | ScreeningError::Status(_) | ScreeningError::Timeout => {
                "Could not get diagnosis. Please try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl std::error::Error for ScreeningError {}

impl fmt::Display for ScreeningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreeningError::IoError(e) => write!(f, "IO error: {}", e),
            ScreeningError::SerdeError(e) => write!(f, "Serialization error: {}", e),
            ScreeningError::CsvError(e) => write!(f, "CSV error: {}", e),
            ScreeningError::Http(e) => write!(f, "HTTP error: {}", e),
            ScreeningError::Status(code) => write!(f, "Server responded with status {}", code),
            ScreeningError::Timeout => write!(f, "Request timed out"),
            ScreeningError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScreeningError::InvalidAge(msg) => write!(f, "Invalid age: {}", msg),
            ScreeningError::UnknownGame(id) => write!(f, "Unknown game: {}", id),
            ScreeningError::EmptyBank(id) => write!(f, "Question bank for {} is empty", id),
            ScreeningError::IncompleteBank(msg) => write!(f, "Incomplete question bank: {}", msg),
            ScreeningError::AgeRestricted { game, min_age } => {
                write!(f, "{} needs age {} or older", game, min_age)
            }
            ScreeningError::Download(msg) => write!(f, "Telegram download failed: {}", msg),
            ScreeningError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            ScreeningError::InvalidScore { game_id, score, total } => write!(
                f,
                "Score {} exceeds total {} for game {}",
                score, total, game_id
            ),
            ScreeningError::NoResults => write!(f, "No game results recorded"),
        }
    }
}

impl From<std::io::Error> for ScreeningError {
    fn from(err: std::io::Error) -> Self {
        ScreeningError::IoError(err)
    }
}

impl From<serde_json::Error> for ScreeningError {
    fn from(err: serde_json::Error) -> Self {
        ScreeningError::SerdeError(err)
    }
}

impl From<csv::Error> for ScreeningError {
    fn from(err: csv::Error) -> Self {
        ScreeningError::CsvError(err)
    }
}

impl From<reqwest::Error> for ScreeningError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScreeningError::Timeout
        } else if let Some(status) = err.status() {
            ScreeningError::Status(status.as_u16())
        } else {
            ScreeningError::Http(err)
        }
    }
}

impl From<config::ConfigError> for ScreeningError {
    fn from(err: config::ConfigError) -> Self {
        ScreeningError::Config(err.to_string())
    }
}

impl From<teloxide::RequestError> for ScreeningError {
    fn from(err: teloxide::RequestError) -> Self {
        ScreeningError::Download(err.to_string())
    }
}

impl From<teloxide::DownloadError> for ScreeningError {
    fn from(err: teloxide::DownloadError) -> Self {
        ScreeningError::Download(err.to_string())
    }
}
