use anyhow::{anyhow, Result};
use chrono::{Datelike, Utc};
use spark_app_core::{AppSettings, FilePersistence, StudentProfile};

/// Field edits for `profile set`. `None` leaves a field untouched; an empty
/// value clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub major: Option<String>,
    pub student_year: Option<String>,
    pub graduation_year: Option<String>,
    pub courses_taken: Option<Vec<String>>,
    pub time_commitment: Option<String>,
    pub skills: Option<Vec<String>>,
    pub career_goal: Option<String>,
    pub bio: Option<String>,
    pub server_url: Option<String>,
}

impl ProfileUpdate {
    fn touches_profile(&self) -> bool {
        self.name.is_some()
            || self.major.is_some()
            || self.student_year.is_some()
            || self.graduation_year.is_some()
            || self.courses_taken.is_some()
            || self.time_commitment.is_some()
            || self.skills.is_some()
            || self.career_goal.is_some()
            || self.bio.is_some()
    }
}

pub struct ProfileManager {
    persistence: FilePersistence,
}

impl ProfileManager {
    pub fn new() -> Self {
        Self {
            persistence: FilePersistence::new(),
        }
    }

    pub fn with_persistence(persistence: FilePersistence) -> Self {
        Self { persistence }
    }

    pub fn load(&self) -> Result<(StudentProfile, AppSettings)> {
        Ok((
            self.persistence.load_profile()?,
            self.persistence.load_settings()?,
        ))
    }

    pub fn update(&self, update: ProfileUpdate) -> Result<(StudentProfile, AppSettings)> {
        let (mut profile, mut settings) = self.load()?;

        if let Some(year) = update.graduation_year.as_deref().map(str::trim) {
            if !year.is_empty() {
                let parsed: i32 = year
                    .parse()
                    .map_err(|_| anyhow!("Graduation year must be a number, got '{year}'"))?;
                let now = Utc::now().year();
                if !(now - 10..=now + 10).contains(&parsed) {
                    return Err(anyhow!("Graduation year {parsed} is out of range"));
                }
            }
        }

        if update.server_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(anyhow!("Server URL cannot be empty"));
        }

        if update.touches_profile() {
            let set = |field: &mut String, value: Option<String>| {
                if let Some(v) = value {
                    *field = v.trim().to_string();
                }
            };
            let set_list = |field: &mut Vec<String>, value: Option<Vec<String>>| {
                if let Some(v) = value {
                    *field = v
                        .into_iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
            };
            set(&mut profile.name, update.name);
            set(&mut profile.major, update.major);
            set(&mut profile.student_year, update.student_year);
            set(&mut profile.graduation_year, update.graduation_year);
            set_list(&mut profile.courses_taken, update.courses_taken);
            set(&mut profile.time_commitment, update.time_commitment);
            set_list(&mut profile.skills, update.skills);
            set(&mut profile.career_goal, update.career_goal);
            set(&mut profile.bio, update.bio);
            profile.updated_at = Some(Utc::now());
            self.persistence.save_profile(&profile)?;
        }

        if let Some(url) = update.server_url {
            settings.server_url = url.trim().to_string();
            self.persistence.save_settings(&settings)?;
        }

        Ok((profile, settings))
    }
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn print_profile(profile: &StudentProfile, settings: &AppSettings) {
    if profile.is_empty() {
        println!("No profile saved.");
    } else {
        for (key, value) in profile.extra_context() {
            println!("{:<18} {}", key, value);
        }
        if let Some(at) = profile.updated_at {
            println!("{:<18} {}", "updated_at", at.to_rfc3339());
        }
    }
    println!("{:<18} {}", "server_url", settings.server_url);
}

pub fn handle_show() -> Result<()> {
    let mgr = ProfileManager::new();
    let (profile, settings) = mgr.load()?;
    print_profile(&profile, &settings);
    Ok(())
}

pub fn handle_set(update: ProfileUpdate) -> Result<()> {
    let mgr = ProfileManager::new();
    let (profile, settings) = mgr.update(update)?;
    println!("Profile saved.");
    print_profile(&profile, &settings);
    Ok(())
}
