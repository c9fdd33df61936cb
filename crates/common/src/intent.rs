use std::fmt;
use std::str::FromStr;

use crate::CommandError;

/// Intenção do cadastro carregada através do redirect OAuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    JobSeeker,
    Employer,
}

impl Intent {
    pub const ALL: [Intent; 2] = [Intent::JobSeeker, Intent::Employer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::JobSeeker => "job_seeker",
            Intent::Employer => "employer",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "job_seeker" => Ok(Intent::JobSeeker),
            "employer" => Ok(Intent::Employer),
            _ => Err(CommandError::InvalidIntent(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_roundtrip() {
        for intent in Intent::ALL {
            assert_eq!(intent.to_string().parse::<Intent>().unwrap(), intent);
        }
    }

    #[test]
    fn parse_is_lenient_on_case_and_hyphen() {
        assert_eq!("EMPLOYER".parse::<Intent>().unwrap(), Intent::Employer);
        assert_eq!("Job-Seeker".parse::<Intent>().unwrap(), Intent::JobSeeker);
    }

    #[test]
    fn parse_unknown_intent() {
        let err = "admin".parse::<Intent>().unwrap_err();
        assert!(matches!(err, CommandError::InvalidIntent(ref s) if s == "admin"));
    }
}
