use std::time::Duration;

use crate::auth::Authenticator;
use crate::cache::Revalidator;
use crate::form::{FieldErrors, FormData, FormState};
use crate::paths;
use crate::validation::{CreateTopicInput, validate_create_topic};

use super::store::{TopicStore, TopicStoreError};

pub const SIGN_IN_REQUIRED_MESSAGE: &str = "You must be signed in to do this.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Collaborators for a single create-topic submission.
pub struct CreateTopicContext<'a> {
    pub authenticator: &'a dyn Authenticator,
    pub store: &'a dyn TopicStore,
    pub revalidator: &'a dyn Revalidator,
    pub submit_delay: Duration,
}

/// Navigation to a view. Terminal: nothing runs after it is issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub target: String,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateTopicOutcome {
    /// The submission was rejected; re-render the form with these errors.
    Rejected(FormState),
    /// The topic exists and listings were revalidated.
    Redirect(Redirect),
}

impl CreateTopicOutcome {
    pub fn form_state(&self) -> Option<&FormState> {
        match self {
            CreateTopicOutcome::Rejected(state) => Some(state),
            CreateTopicOutcome::Redirect(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            CreateTopicOutcome::Redirect(redirect) => Some(redirect),
            CreateTopicOutcome::Rejected(_) => None,
        }
    }
}

enum CreateTopicError {
    Invalid(FieldErrors),
    Unauthenticated,
    Persist(TopicStoreError),
}

impl CreateTopicError {
    fn outcome_label(&self) -> &'static str {
        match self {
            CreateTopicError::Invalid(_) => "invalid",
            CreateTopicError::Unauthenticated => "unauthenticated",
            CreateTopicError::Persist(_) => "persist_failed",
        }
    }

    fn into_form_state(self) -> FormState {
        let errors = match self {
            CreateTopicError::Invalid(errors) => errors,
            CreateTopicError::Unauthenticated => FieldErrors::form(SIGN_IN_REQUIRED_MESSAGE),
            CreateTopicError::Persist(err) => FieldErrors::form(
                err.user_message()
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ),
        };
        FormState::from(errors)
    }
}

/// Create a topic from a form submission.
///
/// Stages run strictly in order (validate, authenticate, persist) and the
/// first failure becomes the returned form state. On success the root
/// listing is revalidated before the redirect to the new topic is returned.
/// `_previous` is accepted so resubmissions can pass their last state back.
pub async fn create_topic<F>(
    ctx: &CreateTopicContext<'_>,
    _previous: FormState,
    form: &F,
) -> CreateTopicOutcome
where
    F: FormData + ?Sized,
{
    if !ctx.submit_delay.is_zero() {
        tokio::time::sleep(ctx.submit_delay).await;
    }

    match run_create_topic(ctx, form).await {
        Ok(redirect) => {
            record_outcome("created");
            CreateTopicOutcome::Redirect(redirect)
        }
        Err(err) => {
            record_outcome(err.outcome_label());
            match &err {
                CreateTopicError::Invalid(errors) => {
                    let fields: Vec<&str> = errors.fields().collect();
                    tracing::debug!(?fields, "Topic submission failed validation");
                }
                CreateTopicError::Unauthenticated => {
                    tracing::debug!("Topic submission without a signed-in user");
                }
                CreateTopicError::Persist(store_err) => {
                    tracing::warn!("Failed to persist topic: {store_err}");
                }
            }
            CreateTopicOutcome::Rejected(err.into_form_state())
        }
    }
}

async fn run_create_topic<F>(
    ctx: &CreateTopicContext<'_>,
    form: &F,
) -> Result<Redirect, CreateTopicError>
where
    F: FormData + ?Sized,
{
    let CreateTopicInput { name, description } =
        validate_create_topic(form).map_err(CreateTopicError::Invalid)?;

    let session = ctx.authenticator.check_session().await;
    let Some(user) = session.as_ref().and_then(|s| s.signed_in_user()) else {
        return Err(CreateTopicError::Unauthenticated);
    };

    let topic = ctx
        .store
        .create_topic(&name, &description)
        .await
        .map_err(CreateTopicError::Persist)?;

    tracing::info!(slug = %topic.slug, user = %user.handle, "Created topic");

    ctx.revalidator.revalidate_path(paths::home());
    Ok(Redirect {
        target: paths::topic_show(&topic.slug),
    })
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("topics_create_total", "outcome" => outcome).increment(1);
}
