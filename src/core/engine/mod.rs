pub mod calculator;
pub mod ochiai;
pub mod proximity;

use strum::{Display, EnumString};

pub use calculator::SuspiciousnessCalculator;
pub use ochiai::OchiaiCalculator;
pub use proximity::{Bound, ProximityCalculator, ThresholdPolicy, Weighting};

/// Algorithm names accepted in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AlgorithmKind {
    Ochiai,
    Proximity,
}

/// A fully resolved algorithm selection, including the proximity threshold
/// policies when they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Ochiai,
    Proximity {
        lower: ThresholdPolicy,
        upper: ThresholdPolicy,
    },
}

impl Algorithm {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::Ochiai => AlgorithmKind::Ochiai,
            Algorithm::Proximity { .. } => AlgorithmKind::Proximity,
        }
    }

    pub fn calculator(&self) -> Box<dyn SuspiciousnessCalculator> {
        match *self {
            Algorithm::Ochiai => Box::new(OchiaiCalculator),
            Algorithm::Proximity { lower, upper } => {
                Box::new(ProximityCalculator::new(lower, upper))
            }
        }
    }
}
