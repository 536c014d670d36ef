use std::path::{Path, PathBuf};
use std::fmt::Display;

pub trait ErrorType: Display + PartialEq {
    // Errors that point at a defect in lexpda itself rather than the input
    fn is_internal(&self) -> bool {
        false
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize
}

impl Location {
    pub fn at(file: &Path, line: usize) -> Self {
        Location {
            file: file.to_path_buf(),
            line
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Error<T> {
    pub fn is_internal(&self) -> bool {
        self.error.is_internal()
    }
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

impl<T: ErrorType + std::fmt::Debug> std::error::Error for Error<T> {}

pub type Errors<T> = Vec<Error<T>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_hides_line_zero() {
        assert_eq!(Location::at(Path::new("grammar/arith.bnf"), 0).to_string(), "grammar/arith.bnf");
        assert_eq!(Location::at(Path::new("prog.txt"), 12).to_string(), "prog.txt:12");
    }
}
