use crate::domain::error::FieldError;
use crate::domain::form::{FormState, FormValue};
use crate::domain::opportunity::{OpportunityType, ReviewStatus, Stage};
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

fn duns_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{9}$").expect("static regex"))
}

fn aws_account_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{12}$").expect("static regex"))
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("static regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

pub const EMAIL_FIELDS: &[&str] = &["CustomerEmail", "PartnerEmail", "AssigneeEmail"];
pub const AMOUNT_FIELDS: &[&str] = &["ExpectedAmount", "SoftwareAmount"];
/// Fields that legitimately carry several values; every other field is scalar.
pub const LIST_FIELDS: &[&str] = &[
    "MarketingChannels",
    "MarketingUseCases",
    "PrimaryNeedsFromAws",
    "ApnPrograms",
    "DeliveryModels",
    "SalesActivities",
    "PayloadType",
    "Status",
    "LifeCycleStage",
    "LifeCycleReviewStatus",
];
pub const DATE_FIELDS: &[&str] = &[
    "TargetCloseDate",
    "SoftwareEffectiveDate",
    "SoftwareExpirationDate",
];

/// Collects field errors; a form is submittable only when this stays empty.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn require(&mut self, form: &FormState, field: &str) -> Option<String> {
        let value = form.text(field);
        if value.is_none() {
            self.push(field, format!("{field} is required"));
        }
        value
    }

    pub fn check_pattern(&mut self, form: &FormState, field: &str, re: &Regex, message: &str) {
        if let Some(value) = form.text(field) {
            if !re.is_match(&value) {
                self.push(field, message);
            }
        }
    }

    pub fn check_enum<T: FromStr<Err = String>>(&mut self, form: &FormState, field: &str) {
        if let Some(value) = form.text(field) {
            if let Err(message) = value.parse::<T>() {
                self.push(field, message);
            }
        }
    }

    pub fn check_date(&mut self, form: &FormState, field: &str) {
        if let Some(value) = form.text(field) {
            if NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_err() {
                self.push(field, format!("{field} must be a YYYY-MM-DD date"));
            }
        }
    }

    /// Parses every entry of a list field, reporting each one that is not a
    /// known value. Returns the entries that parsed.
    pub fn check_enum_list<T: FromStr<Err = String>>(
        &mut self,
        form: &FormState,
        field: &str,
    ) -> Vec<T> {
        let mut parsed = Vec::new();
        for value in form.list(field) {
            match value.parse::<T>() {
                Ok(v) => parsed.push(v),
                Err(message) => self.push(field, message),
            }
        }
        parsed
    }

    pub fn check_timestamp(&mut self, form: &FormState, field: &str) {
        if let Some(value) = form.text(field) {
            if DateTime::parse_from_rfc3339(&value).is_err() {
                self.push(field, format!("{field} must be an RFC 3339 timestamp"));
            }
        }
    }

    /// A scalar field given as a list must hold at most one value.
    pub fn check_single_values(&mut self, form: &FormState) {
        for (field, value) in form.iter() {
            let FormValue::List(values) = value else {
                continue;
            };
            if LIST_FIELDS.contains(&field.as_str()) {
                continue;
            }
            if values.iter().filter(|v| !v.trim().is_empty()).count() > 1 {
                self.push(field, format!("{field} expects a single value"));
            }
        }
    }

    /// Format checks shared by every operation: only fields that are present are checked.
    pub fn check_formats(&mut self, form: &FormState) {
        self.check_pattern(form, "Duns", duns_re(), "DUNS must be exactly 9 digits");
        self.check_pattern(
            form,
            "AwsAccountId",
            aws_account_id_re(),
            "AWS Account ID must be exactly 12 digits",
        );
        for field in AMOUNT_FIELDS {
            self.check_pattern(form, field, amount_re(), "Amount must be a non-negative number");
        }
        for field in EMAIL_FIELDS {
            self.check_pattern(form, field, email_re(), "Please enter a valid email address");
        }
        for field in DATE_FIELDS {
            self.check_date(form, field);
        }
        self.check_enum::<ReviewStatus>(form, "ReviewStatus");
        self.check_enum::<Stage>(form, "Stage");
        self.check_enum::<OpportunityType>(form, "OpportunityType");
        self.check_single_values(form);
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub fn validate_formats(form: &FormState) -> Result<(), Vec<FieldError>> {
    let mut v = Validator::new();
    v.check_formats(form);
    v.finish()
}
