pub mod archive;
pub mod fs;
