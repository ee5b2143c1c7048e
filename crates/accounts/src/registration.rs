use crate::Credentials;
use framework::{Error, Result};
use roster::TrainerRecord;

/// The trainer sign-up form. Every field starts empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Comma separated specialities, e.g. `Strength Training, Yoga`.
    pub specialization: String,
    /// Whole years of experience.
    pub experience: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Field labels in form order.
    pub const LABELS: [&'static str; 7] = [
        "Full Name",
        "Email",
        "Phone Number",
        "Specialization",
        "Years of Experience",
        "Password",
        "Confirm Password",
    ];

    /// Builds a form from values in `LABELS` order.
    pub fn from_values(values: [String; 7]) -> Self {
        let [full_name, email, phone, specialization, experience, password, confirm_password] =
            values;
        Self {
            full_name,
            email,
            phone,
            specialization,
            experience,
            password,
            confirm_password,
        }
    }

    /// Checks the form, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("Full Name", &self.full_name),
            ("Email", &self.email),
            ("Phone Number", &self.phone),
            ("Specialization", &self.specialization),
            ("Years of Experience", &self.experience),
            ("Password", &self.password),
        ];
        if let Some((label, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(Error::Validation(format!("{label} is required")));
        }
        if !self.email.contains('@') {
            return Err(Error::Validation("Email must contain '@'".into()));
        }
        self.years()?;
        if self.password != self.confirm_password {
            return Err(Error::Validation("passwords do not match".into()));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }

    /// The roster record a new trainer starts with. The id is
    /// assigned by the repository.
    pub fn to_record(&self) -> Result<TrainerRecord> {
        let years = self.years()?;
        Ok(TrainerRecord {
            name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            skills: self
                .specialization
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            past_experience: Some(format!("{years} years")),
            ..Default::default()
        })
    }

    fn years(&self) -> Result<u32> {
        self.experience
            .trim()
            .parse()
            .map_err(|_| Error::Validation("Years of Experience must be a whole number".into()))
    }
}
