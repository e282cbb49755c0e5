pub mod driver;
pub mod probe;
pub mod result;
pub mod transport;

#[cfg(test)]
mod fake;

use std::fmt::Write;

/// Flatten an error and its `source()` chain into a single line.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Leaf;

    impl std::fmt::Display for Leaf {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "connection refused")
        }
    }

    impl std::error::Error for Leaf {}

    #[derive(Debug)]
    struct Outer(Leaf);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "error sending request")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_report_joins_source_chain() {
        assert_eq!(report(&Outer(Leaf)), "error sending request: connection refused");
        assert_eq!(report(&Leaf), "connection refused");
    }
}
