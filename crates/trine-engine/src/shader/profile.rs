use std::fmt;
use std::str::FromStr;

/// Lowest shader-model major version the backend accepts.
pub const MIN_SHADER_MODEL_MAJOR: u32 = 6;

/// Pipeline stage named by a target profile prefix.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProfileStage {
    Vertex,
    Pixel,
    Geometry,
    Hull,
    Domain,
    Compute,
    Library,
}

impl ProfileStage {
    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "vs" => Self::Vertex,
            "ps" => Self::Pixel,
            "gs" => Self::Geometry,
            "hs" => Self::Hull,
            "ds" => Self::Domain,
            "cs" => Self::Compute,
            "lib" => Self::Library,
            _ => return None,
        })
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Vertex => "vs",
            Self::Pixel => "ps",
            Self::Geometry => "gs",
            Self::Hull => "hs",
            Self::Domain => "ds",
            Self::Compute => "cs",
            Self::Library => "lib",
        }
    }
}

/// A parsed `<stage>_<major>_<minor>` target profile, e.g. `vs_5_0`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetProfile {
    pub stage: ProfileStage,
    pub major: u32,
    pub minor: u32,
}

impl TargetProfile {
    /// Raises the major version to [`MIN_SHADER_MODEL_MAJOR`] when below it.
    ///
    /// Stage and minor version are preserved. Sufficient versions are left alone.
    pub fn upgrade(self) -> Self {
        if self.major >= MIN_SHADER_MODEL_MAJOR {
            return self;
        }
        Self {
            major: MIN_SHADER_MODEL_MAJOR,
            ..self
        }
    }
}

/// Profile string did not have the `<stage>_<major>_<minor>` shape.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParseProfileError(pub String);

impl fmt::Display for ParseProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed target profile '{}'", self.0)
    }
}

impl std::error::Error for ParseProfileError {}

impl FromStr for TargetProfile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseProfileError(s.to_string());

        let mut parts = s.split('_');
        let stage = parts
            .next()
            .and_then(ProfileStage::from_prefix)
            .ok_or_else(err)?;
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        let minor = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;

        if parts.next().is_some() {
            return Err(err());
        }

        Ok(Self {
            stage,
            major,
            minor,
        })
    }
}

impl fmt::Display for TargetProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.stage.prefix(), self.major, self.minor)
    }
}

/// Rewrites `profile` in place so its major version meets the minimum.
///
/// Returns `true` when the string changed.
pub fn upgrade_in_place(profile: &mut String) -> Result<bool, ParseProfileError> {
    let parsed: TargetProfile = profile.parse()?;
    let upgraded = parsed.upgrade();
    if upgraded == parsed {
        return Ok(false);
    }

    log::debug!("upgrading shader target profile {profile} -> {upgraded}");
    *profile = upgraded.to_string();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upgraded(s: &str) -> String {
        let mut p = s.to_string();
        upgrade_in_place(&mut p).unwrap();
        p
    }

    // ── parsing ───────────────────────────────────────────────────────────

    #[test]
    fn parses_stage_and_version() {
        let p: TargetProfile = "ps_5_1".parse().unwrap();
        assert_eq!(p.stage, ProfileStage::Pixel);
        assert_eq!((p.major, p.minor), (5, 1));
    }

    #[test]
    fn rejects_malformed_profiles() {
        for bad in ["", "vs", "vs_5", "xx_5_0", "vs_a_0", "vs_5_0_1"] {
            assert!(bad.parse::<TargetProfile>().is_err(), "{bad}");
        }
    }

    // ── upgrade ───────────────────────────────────────────────────────────

    #[test]
    fn old_profiles_upgrade_to_minimum() {
        assert_eq!(upgraded("vs_5_0"), "vs_6_0");
        assert_eq!(upgraded("ps_4_0"), "ps_6_0");
        assert_eq!(upgraded("cs_5_1"), "cs_6_1");
    }

    #[test]
    fn sufficient_profiles_are_never_downgraded() {
        for major in MIN_SHADER_MODEL_MAJOR..10 {
            for minor in 0..8 {
                let s = format!("vs_{major}_{minor}");
                let mut p = s.clone();
                assert!(!upgrade_in_place(&mut p).unwrap());
                assert_eq!(p, s);
            }
        }
    }

    #[test]
    fn every_low_major_reaches_minimum() {
        for major in 0..MIN_SHADER_MODEL_MAJOR {
            let p = TargetProfile {
                stage: ProfileStage::Compute,
                major,
                minor: 3,
            }
            .upgrade();
            assert_eq!(p.major, MIN_SHADER_MODEL_MAJOR);
            assert_eq!(p.minor, 3);
            assert_eq!(p.stage, ProfileStage::Compute);
        }
    }
}
