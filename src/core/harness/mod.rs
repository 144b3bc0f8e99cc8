pub mod executor;
pub mod parser;

pub use executor::TestHarness;
pub use parser::{parse_spectrum, parse_spectrum_file, SpectrumFormatError};
