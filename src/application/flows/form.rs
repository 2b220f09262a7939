use crate::domain::entities::{ChatIdentity, NewSpecialist, SlotTime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::shared::utils::datetime::{parse_entry, ENTRY_HINT};
use crate::shared::utils::name_validator::{require_text, validate_service_name};

/// Fields collected so far by the onboarding form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialistDraft {
    pub identity: Option<ChatIdentity>,
    pub name: String,
    pub specialization: String,
    pub description: String,
    pub first_service: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    AwaitingIdentity,
    AwaitingName,
    AwaitingSpecialization,
    AwaitingDescription,
    AwaitingFirstService,
    AwaitingFirstSlot,
}

/// One in-progress multi-step form. At most one exists per chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Onboarding {
        step: OnboardingStep,
        draft: SpecialistDraft,
    },
    AwaitingServiceName {
        specialist: i64,
    },
    AwaitingSlotDateTime {
        specialist: i64,
    },
    /// Walks the specialist's services in order, one rename per answer.
    AwaitingRename {
        specialist: i64,
        services: Vec<(i64, String)>,
        index: usize,
    },
    AwaitingSlotReschedule {
        slot: i64,
    },
    AwaitingFeedbackText {
        user: i64,
    },
    AwaitingFeedbackReply {
        request: i64,
    },
}

/// A write the router must perform to finish a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    VerifyIdentity(ChatIdentity),
    OnboardSpecialist(NewSpecialist),
    AddService { specialist: i64, name: String },
    AddSlot { specialist: i64, at: SlotTime },
    RenameService { service: i64, name: String },
    RescheduleSlot { slot: i64, at: SlotTime },
    SubmitFeedback { user: i64, text: String },
    ReplyFeedback { request: i64, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub state: FormState,
    pub prompt: String,
}

#[derive(Debug)]
pub enum Transition {
    /// Answer stored; ask the next question.
    Next(Continuation),
    /// Answer rejected; the form stays on the same step.
    Retry { state: FormState, error: DomainError },
    /// Answer accepted; `effect` must be committed. `retry` is the step to
    /// return to if the commit fails validation, `then` what follows success.
    Commit {
        effect: FormEffect,
        retry: FormState,
        then: Option<Continuation>,
    },
}

impl FormState {
    pub fn onboarding() -> Self {
        FormState::Onboarding {
            step: OnboardingStep::AwaitingIdentity,
            draft: SpecialistDraft::default(),
        }
    }

    /// Short name used when one form replaces another.
    pub fn title(&self) -> &'static str {
        match self {
            FormState::Onboarding { .. } => "specialist onboarding",
            FormState::AwaitingServiceName { .. } => "new service",
            FormState::AwaitingSlotDateTime { .. } => "new slot",
            FormState::AwaitingRename { .. } => "service renaming",
            FormState::AwaitingSlotReschedule { .. } => "slot editing",
            FormState::AwaitingFeedbackText { .. } => "feedback",
            FormState::AwaitingFeedbackReply { .. } => "feedback reply",
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            FormState::Onboarding { step, .. } => match step {
                OnboardingStep::AwaitingIdentity => {
                    "Enter the specialist's Telegram ID:".to_string()
                }
                OnboardingStep::AwaitingName => "Enter the specialist's name:".to_string(),
                OnboardingStep::AwaitingSpecialization => "Enter the specialization:".to_string(),
                OnboardingStep::AwaitingDescription => {
                    "Enter a short description of the specialist:".to_string()
                }
                OnboardingStep::AwaitingFirstService => {
                    "Enter the first service (letters, spaces and hyphens only):".to_string()
                }
                OnboardingStep::AwaitingFirstSlot => {
                    format!("Enter the first slot. {}", ENTRY_HINT)
                }
            },
            FormState::AwaitingServiceName { .. } => {
                "Enter the service name (letters, spaces and hyphens only):".to_string()
            }
            FormState::AwaitingSlotDateTime { .. } => format!("Enter the slot. {}", ENTRY_HINT),
            FormState::AwaitingRename {
                services, index, ..
            } => match services.get(*index) {
                Some((_, name)) => format!(
                    "Editing service {} of {}: \"{}\". Enter the new name:",
                    index + 1,
                    services.len(),
                    name
                ),
                None => "All services are renamed.".to_string(),
            },
            FormState::AwaitingSlotReschedule { .. } => {
                format!("Enter the new date and time. {}", ENTRY_HINT)
            }
            FormState::AwaitingFeedbackText { .. } => {
                "✉️ Enter your message for the administrator:".to_string()
            }
            FormState::AwaitingFeedbackReply { request } => {
                format!("Enter your reply to request #{}:", request)
            }
        }
    }

    /// Consumes one free-text answer.
    pub fn advance(self, text: &str) -> Transition {
        match self.answer(text) {
            Ok(transition) => transition,
            Err(error) => Transition::Retry { state: self, error },
        }
    }

    fn answer(&self, text: &str) -> DomainResult<Transition> {
        let transition = match self {
            FormState::Onboarding { step, draft } => onboarding_answer(*step, draft, text)?,
            FormState::AwaitingServiceName { specialist } => Transition::Commit {
                effect: FormEffect::AddService {
                    specialist: *specialist,
                    name: validate_service_name(text)?,
                },
                retry: self.clone(),
                then: None,
            },
            FormState::AwaitingSlotDateTime { specialist } => Transition::Commit {
                effect: FormEffect::AddSlot {
                    specialist: *specialist,
                    at: parse_entry(text)?,
                },
                retry: self.clone(),
                then: None,
            },
            FormState::AwaitingRename {
                specialist,
                services,
                index,
            } => {
                let (service, _) = services.get(*index).ok_or_else(|| {
                    DomainError::NotFound(format!("service #{} in the list", index + 1))
                })?;
                let next = FormState::AwaitingRename {
                    specialist: *specialist,
                    services: services.clone(),
                    index: index + 1,
                };
                Transition::Commit {
                    effect: FormEffect::RenameService {
                        service: *service,
                        name: validate_service_name(text)?,
                    },
                    retry: self.clone(),
                    then: (index + 1 < services.len()).then(|| Continuation {
                        prompt: next.prompt(),
                        state: next,
                    }),
                }
            }
            FormState::AwaitingSlotReschedule { slot } => Transition::Commit {
                effect: FormEffect::RescheduleSlot {
                    slot: *slot,
                    at: parse_entry(text)?,
                },
                retry: self.clone(),
                then: None,
            },
            FormState::AwaitingFeedbackText { user } => Transition::Commit {
                effect: FormEffect::SubmitFeedback {
                    user: *user,
                    text: require_text(text, "Message")?,
                },
                retry: self.clone(),
                then: None,
            },
            FormState::AwaitingFeedbackReply { request } => Transition::Commit {
                effect: FormEffect::ReplyFeedback {
                    request: *request,
                    text: require_text(text, "Reply")?,
                },
                retry: self.clone(),
                then: None,
            },
        };
        Ok(transition)
    }
}

fn onboarding_answer(
    step: OnboardingStep,
    draft: &SpecialistDraft,
    text: &str,
) -> DomainResult<Transition> {
    let mut next = draft.clone();
    let retry = FormState::Onboarding {
        step,
        draft: draft.clone(),
    };
    let proceed = |step: OnboardingStep, draft: SpecialistDraft| {
        let state = FormState::Onboarding { step, draft };
        Continuation {
            prompt: state.prompt(),
            state,
        }
    };

    let transition = match step {
        OnboardingStep::AwaitingIdentity => {
            let identity: ChatIdentity = text.trim().parse().map_err(|_| {
                DomainError::Validation("The Telegram ID must be a number".to_string())
            })?;
            next.identity = Some(identity);
            Transition::Commit {
                effect: FormEffect::VerifyIdentity(identity),
                retry,
                then: Some(proceed(OnboardingStep::AwaitingName, next)),
            }
        }
        OnboardingStep::AwaitingName => {
            next.name = require_text(text, "Name")?;
            Transition::Next(proceed(OnboardingStep::AwaitingSpecialization, next))
        }
        OnboardingStep::AwaitingSpecialization => {
            next.specialization = require_text(text, "Specialization")?;
            Transition::Next(proceed(OnboardingStep::AwaitingDescription, next))
        }
        OnboardingStep::AwaitingDescription => {
            next.description = require_text(text, "Description")?;
            Transition::Next(proceed(OnboardingStep::AwaitingFirstService, next))
        }
        OnboardingStep::AwaitingFirstService => {
            next.first_service = validate_service_name(text)?;
            Transition::Next(proceed(OnboardingStep::AwaitingFirstSlot, next))
        }
        OnboardingStep::AwaitingFirstSlot => {
            let first_slot = parse_entry(text)?;
            let identity = draft.identity.ok_or_else(|| {
                DomainError::Validation("The Telegram ID is missing, start again".to_string())
            })?;
            Transition::Commit {
                effect: FormEffect::OnboardSpecialist(NewSpecialist {
                    telegram_identity: identity,
                    name: draft.name.clone(),
                    specialization: draft.specialization.clone(),
                    description: draft.description.clone(),
                    first_service: draft.first_service.clone(),
                    first_slot,
                }),
                retry,
                then: None,
            }
        }
    };
    Ok(transition)
}
