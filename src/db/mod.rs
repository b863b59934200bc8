pub mod eia;
pub mod writer;
