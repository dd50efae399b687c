//! Cross-cutting test suites

mod sampler_tests;
mod search_tests;
