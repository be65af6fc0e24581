#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighScoreError {
    Io(String),
    Parse(String),
    Encode(String),
    LockPoisoned,
}

impl std::fmt::Display for HighScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighScoreError::Io(e) => write!(f, "High score storage error: {}", e),
            HighScoreError::Parse(e) => write!(f, "High score file is malformed: {}", e),
            HighScoreError::Encode(e) => write!(f, "Could not encode high score table: {}", e),
            HighScoreError::LockPoisoned => write!(f, "High score store lock poisoned"),
        }
    }
}

impl std::error::Error for HighScoreError {}
