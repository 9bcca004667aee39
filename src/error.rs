/*
 * Error Module
 *
 * Error types for the simulation core and its configuration layer.
 *
 * - VectorError: numeric degeneracy (division by zero). The core always
 *   recovers from it locally by substituting a zero contribution.
 * - FlockError: invalid construction arguments or tunables.
 * - ConfigError: failures while loading a configuration file.
 */

use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorError {
    DivideByZero,
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorError::DivideByZero => write!(f, "division by zero"),
        }
    }
}

impl std::error::Error for VectorError {}

#[derive(Clone, Debug, PartialEq)]
pub enum FlockError {
    /// A flock needs at least one boid.
    EmptyPopulation,
    InvalidBoundRadius { actual: f64 },
    /// A tunable that must be finite and positive was not.
    InvalidParameter { name: &'static str, actual: f64 },
    DuplicateId { id: usize },
}

impl fmt::Display for FlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlockError::EmptyPopulation => write!(f, "population must be greater than 0"),
            FlockError::InvalidBoundRadius { actual } => {
                write!(f, "bound radius must be finite and positive, got {actual}")
            }
            FlockError::InvalidParameter { name, actual } => {
                write!(f, "{name} must be finite and positive, got {actual}")
            }
            FlockError::DuplicateId { id } => write!(f, "boid id {id} appears more than once"),
        }
    }
}

impl std::error::Error for FlockError {}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(FlockError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, .. } => write!(f, "failed to read config {}", path.display()),
            ConfigError::Parse(_) => write!(f, "failed to parse config"),
            ConfigError::Invalid(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<FlockError> for ConfigError {
    fn from(err: FlockError) -> Self {
        ConfigError::Invalid(err)
    }
}
