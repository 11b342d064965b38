//! # Multi-step forms as explicit state machines
//!
//! A [`FormFlow`] is the data of one form plus a table of typed steps, each
//! with its own validation predicate. [`StepForm`] walks that table:
//!
//! - the step number starts at 1 and never exceeds the step count;
//! - [`StepForm::next`] advances only if the current step validates, and
//!   otherwise records the field errors and stays put;
//! - [`StepForm::back`] goes back one step without validating;
//! - [`StepForm::begin_submit`] is allowed on the last step while no other
//!   submission is in flight, after every step validates again.
//!
//! Two flows ship with the app: [`ProfileCompletion`] and
//! [`ServiceSubmission`].

use std::collections::BTreeMap;
use std::fmt::Debug;

use thiserror::Error;

use crate::destination::Destination;
use crate::models::{ListingStatus, NewListing, ProfileUpdate, UserRole};

/// Validation messages keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("please fill in all required fields")]
    Invalid(FieldErrors),
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("the form is not on its last step")]
    NotOnLastStep,
    #[error("the form is already on its last step")]
    AtLastStep,
}

/// Form data with a fixed sequence of validated steps.
pub trait FormFlow {
    type Step: Copy + PartialEq + Debug + 'static;

    /// Steps in order. Must not be empty.
    const STEPS: &'static [Self::Step];

    /// Check the fields belonging to `step`.
    fn validate(&self, step: Self::Step) -> Result<(), FieldErrors>;
}

/// A form walking through the steps of `F`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepForm<F: FormFlow> {
    data: F,
    index: usize,
    submitting: bool,
    errors: FieldErrors,
}

impl<F: FormFlow + Default> Default for StepForm<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: FormFlow> StepForm<F> {
    pub fn new(data: F) -> Self {
        Self {
            data,
            index: 0,
            submitting: false,
            errors: FieldErrors::new(),
        }
    }

    pub fn data(&self) -> &F {
        &self.data
    }

    /// Mutable access to the fields. Editing clears stale errors.
    pub fn data_mut(&mut self) -> &mut F {
        self.errors.clear();
        &mut self.data
    }

    pub fn step(&self) -> F::Step {
        F::STEPS[self.index]
    }

    /// 1-based step number.
    pub fn step_number(&self) -> usize {
        self.index + 1
    }

    pub fn step_count(&self) -> usize {
        F::STEPS.len()
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == F::STEPS.len()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the current step would pass validation.
    pub fn can_advance(&self) -> bool {
        !self.is_last() && self.data.validate(self.step()).is_ok()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.is_last() && !self.submitting
    }

    /// Advance one step if the current one validates.
    pub fn next(&mut self) -> Result<F::Step, FormError> {
        if self.is_last() {
            return Err(FormError::AtLastStep);
        }
        if let Err(errors) = self.data.validate(self.step()) {
            self.errors = errors.clone();
            return Err(FormError::Invalid(errors));
        }
        self.errors.clear();
        self.index += 1;
        Ok(self.step())
    }

    /// Go back one step; a no-op on the first step.
    pub fn back(&mut self) -> F::Step {
        if self.index > 0 {
            self.index -= 1;
        }
        self.errors.clear();
        self.step()
    }

    /// Start submitting. Every step is validated again; on failure the form
    /// jumps to the first invalid step.
    pub fn begin_submit(&mut self) -> Result<&F, FormError> {
        if !self.is_last() {
            return Err(FormError::NotOnLastStep);
        }
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        for (i, step) in F::STEPS.iter().enumerate() {
            if let Err(errors) = self.data.validate(*step) {
                self.index = i;
                self.errors = errors.clone();
                return Err(FormError::Invalid(errors));
            }
        }
        self.submitting = true;
        Ok(&self.data)
    }

    /// Clear the in-flight guard once the backend call returned.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &'static str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

fn into_result(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Steps of the profile-completion wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStep {
    Contact,
    Role,
}

/// Data collected by the profile-completion wizard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileCompletion {
    pub phone: String,
    pub location: String,
    pub role: UserRole,
}

impl FormFlow for ProfileCompletion {
    type Step = ProfileStep;
    const STEPS: &'static [ProfileStep] = &[ProfileStep::Contact, ProfileStep::Role];

    fn validate(&self, step: ProfileStep) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        match step {
            ProfileStep::Contact => {
                require(&mut errors, "phone", &self.phone, "Phone number is required");
                require(&mut errors, "location", &self.location, "Location is required");
            }
            ProfileStep::Role => {}
        }
        into_result(errors)
    }
}

impl ProfileCompletion {
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            phone: Some(self.phone.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            user_type: Some(self.role),
            ..ProfileUpdate::default()
        }
    }

    /// Where to go once the profile was saved.
    pub fn destination(&self) -> Destination {
        match self.role {
            UserRole::Hire => Destination::Home,
            UserRole::Offer => Destination::Profile,
        }
    }
}

/// Steps of the service submission wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStep {
    Details,
    /// Summary plus terms. Contact details come from the provider's profile.
    Review,
}

/// Data collected by the service submission wizard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSubmission {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub location: String,
    pub availability: String,
    pub terms_accepted: bool,
}

impl FormFlow for ServiceSubmission {
    type Step = ServiceStep;
    const STEPS: &'static [ServiceStep] = &[ServiceStep::Details, ServiceStep::Review];

    fn validate(&self, step: ServiceStep) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        match step {
            ServiceStep::Details => {
                require(&mut errors, "title", &self.title, "Title is required");
                require(&mut errors, "description", &self.description, "Description is required");
                require(&mut errors, "category", &self.category_id, "Category is required");
                require(&mut errors, "location", &self.location, "Location is required");
                require(&mut errors, "availability", &self.availability, "Availability is required");
            }
            ServiceStep::Review => {
                if !self.terms_accepted {
                    errors.insert("terms", "You must accept the terms");
                }
            }
        }
        into_result(errors)
    }
}

impl ServiceSubmission {
    pub fn to_new_listing(&self, provider_id: &str) -> NewListing {
        NewListing {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category_id: self.category_id.clone(),
            location: self.location.trim().to_string(),
            availability: self.availability.trim().to_string(),
            provider_id: provider_id.to_string(),
            status: ListingStatus::Active,
            images: Vec::new(),
        }
    }

    pub fn destination(&self) -> Destination {
        Destination::MyServices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_next_rejected_with_empty_phone() {
        let mut form = StepForm::<ProfileCompletion>::default();
        form.data_mut().location = "Springfield".to_string();

        let err = form.next().unwrap_err();
        assert_matches!(err, FormError::Invalid(ref errors) if errors.contains_key("phone"));
        assert_eq!(form.step_number(), 1);
        assert_eq!(form.errors().get("phone"), Some(&"Phone number is required"));
        assert!(!form.errors().contains_key("location"));
    }

    #[test]
    fn test_next_advances_when_contact_complete() {
        let mut form = StepForm::<ProfileCompletion>::default();
        form.data_mut().phone = "555-0100".to_string();
        form.data_mut().location = "Springfield".to_string();
        assert!(form.can_advance());

        assert_eq!(form.next(), Ok(ProfileStep::Role));
        assert_eq!(form.step_number(), 2);
        assert!(form.is_last());
        assert!(form.errors().is_empty());
        assert_eq!(form.next(), Err(FormError::AtLastStep));
    }

    #[test]
    fn test_back_needs_no_validation() {
        let mut form = StepForm::new(ProfileCompletion {
            phone: "555-0100".to_string(),
            location: "Springfield".to_string(),
            role: UserRole::Offer,
        });
        form.next().unwrap();
        form.data_mut().phone.clear();

        assert_eq!(form.back(), ProfileStep::Contact);
        assert_eq!(form.step_number(), 1);
        assert_eq!(form.back(), ProfileStep::Contact);
        assert_eq!(form.step_number(), 1);
    }

    #[test]
    fn test_submit_guard_prevents_duplicates() {
        let mut form = StepForm::new(ProfileCompletion {
            phone: "555-0100".to_string(),
            location: "Springfield".to_string(),
            role: UserRole::Offer,
        });
        assert_eq!(form.begin_submit().unwrap_err(), FormError::NotOnLastStep);
        form.next().unwrap();
        assert!(form.can_submit());

        let data = form.begin_submit().unwrap();
        assert_eq!(data.destination(), Destination::Profile);
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit().unwrap_err(), FormError::AlreadySubmitting);

        form.finish_submit();
        assert!(form.can_submit());
    }

    #[test]
    fn test_submit_revalidates_earlier_steps() {
        let mut form = StepForm::new(ProfileCompletion {
            phone: "555-0100".to_string(),
            location: "Springfield".to_string(),
            role: UserRole::Hire,
        });
        form.next().unwrap();
        form.data_mut().location = "  ".to_string();

        assert_matches!(form.begin_submit(), Err(FormError::Invalid(_)));
        assert_eq!(form.step(), ProfileStep::Contact);
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_profile_completion_update_and_destination() {
        let data = ProfileCompletion {
            phone: " 555-0100 ".to_string(),
            location: "Springfield".to_string(),
            role: UserRole::Hire,
        };
        let update = data.to_update();
        assert_eq!(update.phone.as_deref(), Some("555-0100"));
        assert_eq!(update.user_type, Some(UserRole::Hire));
        assert_eq!(data.destination(), Destination::Home);
    }

    #[test]
    fn test_service_submission_steps() {
        let mut form = StepForm::<ServiceSubmission>::default();
        assert_eq!(form.step_count(), 2);

        let err = form.next().unwrap_err();
        let FormError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec!["availability", "category", "description", "location", "title"]
        );

        {
            let data = form.data_mut();
            data.title = "Math tutoring".to_string();
            data.description = "Algebra and calculus".to_string();
            data.category_id = "cat-tutoring".to_string();
            data.location = "Springfield".to_string();
            data.availability = "Weekends".to_string();
        }
        assert_eq!(form.next(), Ok(ServiceStep::Review));

        assert_matches!(
            form.begin_submit(),
            Err(FormError::Invalid(ref e)) if e.keys().copied().collect::<Vec<_>>() == vec!["terms"]
        );
        assert_eq!(form.step(), ServiceStep::Review);

        form.data_mut().terms_accepted = true;
        let listing = form.begin_submit().unwrap().to_new_listing("user-1");
        assert_eq!(listing.provider_id, "user-1");
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.title, "Math tutoring");
        assert_eq!(listing.availability, "Weekends");
    }
}
