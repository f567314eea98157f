//! Pre-compile source text processing.
//!
//! Before the external compiler runs, the generator copies the source tree
//! into a scratch directory and gives each registered pre-processor a
//! chance to rewrite the raw markup text. This is a pure text transform;
//! the core only invokes the compiler against whatever tree results.

/// Rewrites raw source-page text before compilation.
pub trait PreProcessor {
    fn process(&self, source: &str) -> String;
}

impl<F> PreProcessor for F
where
    F: Fn(&str) -> String,
{
    fn process(&self, source: &str) -> String {
        self(source)
    }
}
