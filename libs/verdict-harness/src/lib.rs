pub mod generator;
pub mod marshal;
pub mod signature;
pub mod templates;

mod toolchain_tests;

pub use generator::{GenerateError, Harness, HarnessGenerator, TypeHints};
pub use signature::{detect_function_signature, PatternDetector, SignatureDetector};
