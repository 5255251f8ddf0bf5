pub mod i2cio;
pub mod mpl3115a2;
