mod mpl3115a2_core;
mod mpl3115a2_enums;
mod mpl3115a2_fixed;

pub use mpl3115a2_core::*;
pub use mpl3115a2_enums::*;
pub use mpl3115a2_fixed::*;
