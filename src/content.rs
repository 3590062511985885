use crate::{
    foundation::error::{CyberfolioError, CyberfolioResult},
    widgets::marquee::Skill,
};
use std::path::{Path, PathBuf};

/// One row of the experience timeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub org: String,
    /// Free-form, e.g. `2023 - now`.
    pub period: String,
    #[serde(default)]
    pub summary: String,
}

/// Text and asset references of the landing page.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SiteContent {
    pub name: String,
    pub tagline: String,
    pub nav_links: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<Skill>,
    /// Account whose public contribution calendar is shown.
    pub github_user: String,
    pub audio_path: PathBuf,
    pub track_label: String,
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            name: "Ritam Roa".to_owned(),
            tagline: "Full Stack Developer / Creative Technologist".to_owned(),
            nav_links: ["Works", "About", "Contact"].map(str::to_owned).to_vec(),
            experience: Vec::new(),
            skills: vec![
                Skill::new("TypeScript", "typescript/typescript-original"),
                Skill::new("React", "react/react-original"),
                Skill::new("Three.js", "threejs/threejs-original"),
                Skill::new("Node.js", "nodejs/nodejs-original"),
                Skill::new("Rust", "rust/rust-original"),
                Skill::new("Python", "python/python-original"),
                Skill::new("Tailwind", "tailwindcss/tailwindcss-original"),
                Skill::new("Git", "git/git-original"),
            ],
            github_user: "ritamroa".to_owned(),
            audio_path: PathBuf::from("audio/song.mp3"),
            track_label: "Phantom Liberty — Cyberpunk 2077".to_owned(),
        }
    }
}

impl SiteContent {
    pub fn validate(&self) -> CyberfolioResult<()> {
        if self.name.trim().is_empty() {
            return Err(CyberfolioError::validation("site name must not be empty"));
        }
        if self.github_user.trim().is_empty() || self.github_user.contains(['/', '?', '#']) {
            return Err(CyberfolioError::validation(format!(
                "invalid github_user '{}'",
                self.github_user
            )));
        }
        Ok(())
    }

    pub fn from_reader(reader: impl std::io::Read) -> CyberfolioResult<Self> {
        let content: Self = serde_json::from_reader(reader)?;
        content.validate()?;
        Ok(content)
    }

    pub fn from_path(path: &Path) -> CyberfolioResult<Self> {
        use anyhow::Context as _;
        let file = std::fs::File::open(path)
            .with_context(|| format!("open site content '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_landing_page() {
        let c = SiteContent::default();
        assert_eq!(c.nav_links, vec!["Works", "About", "Contact"]);
        assert_eq!(c.audio_path, PathBuf::from("audio/song.mp3"));
        assert!(c.skills.iter().all(|s| s.icon_url().is_some()));
        c.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SiteContent::from_reader(
            br#"{"name":"Someone","experience":[{"role":"Engineer","org":"Acme","period":"2024"}]}"#
                .as_slice(),
        )
        .unwrap();
        assert_eq!(c.name, "Someone");
        assert_eq!(c.experience[0].summary, "");
        assert_eq!(c.tagline, SiteContent::default().tagline);
    }

    #[test]
    fn rejects_path_like_users() {
        let c = SiteContent {
            github_user: "a/b".to_owned(),
            ..SiteContent::default()
        };
        assert!(matches!(c.validate(), Err(CyberfolioError::Validation(_))));
    }
}
