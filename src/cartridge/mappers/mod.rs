// Mappers module - Implementations of cartridge bank-switching logic
//
// This module contains the mapper factory and the two mapper implementations
// this crate supports: Mapper0 (NROM/UxROM, iNES mapper IDs 0 and 2) and
// Mapper1 (MMC1, iNES mapper ID 1).

mod mapper0;
mod mapper1;

use super::{Cartridge, Mapper};
pub use mapper0::Mapper0;
pub use mapper1::Mapper1;

/// Error type for mapper creation
#[derive(Debug)]
pub enum MapperError {
    /// The requested mapper number is not supported
    UnsupportedMapper(u8),
    /// Invalid cartridge configuration for the mapper
    InvalidConfiguration(String),
}

impl std::fmt::Display for MapperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperError::UnsupportedMapper(num) => {
                write!(f, "Mapper {} is not supported", num)
            }
            MapperError::InvalidConfiguration(msg) => {
                write!(f, "Invalid mapper configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for MapperError {}

/// Create a mapper instance based on the mapper number in the cartridge
///
/// iNES mapper IDs 0 (NROM) and 2 (UxROM) are both served by `Mapper0`,
/// which generalizes to a fixed-or-switchable first bank with a fixed last
/// bank. iNES mapper ID 1 (MMC1) is served by `Mapper1`.
pub fn create_mapper(cartridge: Cartridge) -> Result<Box<dyn Mapper>, MapperError> {
    match cartridge.mapper {
        0 | 2 => Ok(Box::new(Mapper0::new(cartridge))),
        1 => Ok(Box::new(Mapper1::new(cartridge))),
        mapper_num => Err(MapperError::UnsupportedMapper(mapper_num)),
    }
}
