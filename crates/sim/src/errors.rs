use std::error;
use std::fmt;

use crate::tree::NodeId;

/// Error returned when attempting to convert an invalid byte/character into
/// a `Symbol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSymbol(pub u8);

impl fmt::Display for InvalidSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid alignment symbol byte: {} ('{}')", self.0, self.0 as char)
    }
}

impl error::Error for InvalidSymbol {}

/// Errors raised while assembling an alignment from species genomes.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// A sequence contains a character outside the alphabet.
    InvalidSymbol {
        species: String,
        position: usize,
        symbol: InvalidSymbol,
    },
    /// Sequences of one alignment must share a length.
    LengthMismatch {
        species: String,
        expected: usize,
        found: usize,
    },
    /// The same species name appears twice.
    DuplicateSpecies(String),
    /// Fewer than two species; no tree can be built.
    TooFewSpecies(usize),
    /// Sequences of length zero carry no sites to score.
    EmptySequence(String),
}

impl fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSymbol {
                species,
                position,
                symbol,
            } => write!(f, "Species '{species}' at position {position}: {symbol}"),
            Self::LengthMismatch {
                species,
                expected,
                found,
            } => write!(
                f,
                "Species '{species}' has sequence length {found}, expected {expected}"
            ),
            Self::DuplicateSpecies(name) => write!(f, "Duplicate species name: '{name}'"),
            Self::TooFewSpecies(n) => {
                write!(f, "An alignment needs at least 2 species, found {n}")
            }
            Self::EmptySequence(name) => write!(f, "Species '{name}' has an empty sequence"),
        }
    }
}

impl error::Error for AlignmentError {}

/// Structural errors on a phylogenetic tree.
///
/// All of these indicate a corrupted tree and are not recoverable.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// A node id does not refer to a slot in the arena.
    MissingNode(NodeId),
    /// A structural requirement was violated.
    Malformed(String),
    /// The random node sampler kept returning nothing.
    SelectionExhausted { attempts: usize },
    /// Trees need at least one species.
    NoSpecies,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode(id) => write!(f, "Node {id} does not exist in the tree"),
            Self::Malformed(msg) => write!(f, "Malformed tree: {msg}"),
            Self::SelectionExhausted { attempts } => {
                write!(f, "No valid subtree found after {attempts} sampling attempts")
            }
            Self::NoSpecies => write!(f, "Cannot build a tree without species"),
        }
    }
}

impl error::Error for TreeError {}

/// Errors that can occur while scoring a tree against an alignment.
#[derive(Debug, Clone, PartialEq)]
pub enum LikelihoodError {
    /// A leaf names a species that is not in the alignment.
    UnknownSpecies(String),
    /// A genome is shorter than the number of sites being scored.
    SiteOutOfRange {
        species: String,
        site: usize,
        len: usize,
    },
    /// The tree itself is corrupted.
    Tree(TreeError),
}

impl fmt::Display for LikelihoodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSpecies(name) => {
                write!(f, "Leaf species '{name}' is absent from the alignment")
            }
            Self::SiteOutOfRange { species, site, len } => write!(
                f,
                "Species '{species}' has no site {site} (sequence length {len})"
            ),
            Self::Tree(e) => write!(f, "{e}"),
        }
    }
}

impl error::Error for LikelihoodError {}

impl From<TreeError> for LikelihoodError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

/// Errors for configuration values outside their valid range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Probability parameter outside [0, 1]
    InvalidProbability(&'static str, f64),
    /// Count parameter that must be at least one
    ZeroCount(&'static str),
    /// Parameters rejected by a probability distribution
    InvalidDistribution(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProbability(name, val) => write!(
                f,
                "Invalid probability for {name}: {val} (must be between 0.0 and 1.0)"
            ),
            Self::ZeroCount(name) => write!(f, "{name} must be at least 1"),
            Self::InvalidDistribution(msg) => write!(f, "Invalid distribution parameters: {msg}"),
        }
    }
}

impl error::Error for ConfigError {}

/// Errors that can occur during simulation building.
#[derive(Debug)]
pub enum BuilderError {
    /// A required parameter is missing
    MissingRequired(&'static str),
    /// The assembled configuration is invalid
    InvalidConfig(ConfigError),
    /// The initial population could not be built
    Initialization(Box<SimulationError>),
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired(param) => {
                write!(f, "Missing required parameter: {param}")
            }
            Self::InvalidConfig(e) => write!(f, "Invalid parameter: {e}"),
            Self::Initialization(e) => write!(f, "Failed to initialize simulation: {e}"),
        }
    }
}

impl error::Error for BuilderError {}

impl From<ConfigError> for BuilderError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

/// Errors that abort a genetic algorithm run.
#[derive(Debug)]
pub enum SimulationError {
    Config(ConfigError),
    Tree(TreeError),
    Likelihood(LikelihoodError),
    /// `run` was asked to continue after the run already terminated.
    AlreadyFinished,
    /// A summary was requested before any generation was scored.
    NotStarted,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Tree(e) => write!(f, "Tree error: {e}"),
            Self::Likelihood(e) => write!(f, "Likelihood error: {e}"),
            Self::AlreadyFinished => write!(f, "Simulation has already terminated"),
            Self::NotStarted => write!(f, "No generation has been scored yet"),
        }
    }
}

impl error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Tree(e) => Some(e),
            Self::Likelihood(e) => Some(e),
            Self::AlreadyFinished | Self::NotStarted => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<TreeError> for SimulationError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

impl From<LikelihoodError> for SimulationError {
    fn from(e: LikelihoodError) -> Self {
        Self::Likelihood(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_symbol_display() {
        let err = InvalidSymbol(b'X');
        let msg = format!("{err}");
        assert!(msg.contains("88"));
        assert!(msg.contains('X'));
    }

    #[test]
    fn test_simulation_error_source_chain() {
        let err = SimulationError::from(LikelihoodError::UnknownSpecies("felis".into()));
        assert!(err.to_string().contains("felis"));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn test_likelihood_error_from_tree_error() {
        let err = LikelihoodError::from(TreeError::MissingNode(NodeId::new(3)));
        assert_eq!(err, LikelihoodError::Tree(TreeError::MissingNode(NodeId::new(3))));
    }
}
