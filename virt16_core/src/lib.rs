pub mod isa;
pub mod diagnostics;
pub mod text;
pub mod preprocess;
pub mod context;
pub mod macros;
pub mod defines;
pub mod placement;
pub mod routines;
pub mod allocator;
pub mod encoder;
pub mod image;
pub mod assembler;
