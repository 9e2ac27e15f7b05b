pub mod construct;
