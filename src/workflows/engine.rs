use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::domain::{
    Agency, AgencyId, Application, ApplicationId, ApplicationStatus, HiringRequest,
    HiringRequestId, HiringRequestStatus, NewAgency, NewHiringRequest, SubscriptionStatus,
    TransitionRequest, WorkflowEntity,
};
use super::error::WorkflowError;
use super::graph::{authorize_transition, Lifecycle};
use crate::access::{DenyReason, Identity, IdentityId, Role};
use crate::clock::{Clock, SystemClock};
use crate::persistence::{next_record_id, EntityKind, Store};
use crate::session::Session;

/// Validates and applies hiring request and application lifecycles.
///
/// Every call takes the caller's [`Session`] by reference and keeps nothing from it.
/// Status changes go through [`Store::conditional_update`] keyed on the status read at
/// the start of the call, so a concurrent writer turns into [`WorkflowError::Conflict`].
pub struct WorkflowEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> WorkflowEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn register_agency(
        &self,
        session: &Session,
        request: NewAgency,
    ) -> Result<Agency, WorkflowError> {
        let actor = session.require_identity()?;
        require_role(actor, &[Role::Agency])?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "name",
                reason: "must not be blank".to_string(),
            });
        }
        if let Some(existing) = self.agency_owned_by(&actor.id)? {
            return Err(WorkflowError::AgencyAlreadyRegistered {
                agency_id: existing.id,
            });
        }

        let agency = Agency {
            id: AgencyId(next_record_id("agency")),
            name,
            subscription_tier: request.subscription_tier,
            subscription_status: SubscriptionStatus::Trialing,
            owner_identity_id: actor.id.clone(),
            created_at: self.clock.now(),
        };
        let stored = self.store.create(agency)?;
        info!(agency = %stored.id, owner = %stored.owner_identity_id, "agency registered");
        Ok(stored)
    }

    /// Creates a `pending` request bound to the caller's own agency.
    pub fn create_hiring_request(
        &self,
        session: &Session,
        request: NewHiringRequest,
    ) -> Result<HiringRequest, WorkflowError> {
        let actor = session.require_identity()?;
        require_role(actor, &[Role::Agency])?;

        let agency = self
            .agency_owned_by(&actor.id)?
            .ok_or_else(|| WorkflowError::NotFound {
                kind: EntityKind::Agency,
                id: actor.id.to_string(),
            })?;
        if !agency.subscription_status.permits_posting() {
            warn!(
                agency = %agency.id,
                subscription = ?agency.subscription_status,
                "hiring request refused for inactive subscription"
            );
            return Err(WorkflowError::AuthorizationDenied {
                reason: DenyReason::InactiveSubscription,
            });
        }

        request.validate(self.today())?;
        let hiring_request = request.into_hiring_request(agency.id, self.clock.now());
        let stored = self.store.create(hiring_request)?;
        info!(
            hiring_request = %stored.id,
            agency = %stored.agency_id,
            quantity = stored.quantity,
            deadline = %stored.deadline,
            "hiring request created"
        );
        Ok(stored)
    }

    /// Submits the caller's application in `applied`.
    pub fn apply(
        &self,
        session: &Session,
        hiring_request_id: &HiringRequestId,
    ) -> Result<Application, WorkflowError> {
        let actor = session.require_identity()?;
        require_role(actor, &[Role::Talent])?;

        let request = self.store.get::<HiringRequest>(&hiring_request_id.0)?;
        if let Err(rejection) = request.accepting_applications(self.today()) {
            warn!(hiring_request = %request.id, candidate = %actor.id, %rejection, "application refused");
            return Err(WorkflowError::InvalidTransition {
                entity: EntityKind::Application,
                rejection,
            });
        }

        let open = self.store.find_where(&|application: &Application| {
            application.blocks_reapplication(&request.id, &actor.id)
        })?;
        if let Some(existing) = open.into_iter().next() {
            return Err(WorkflowError::DuplicateApplication {
                existing: existing.id,
            });
        }

        let application = Application::submit(request.id, actor.id.clone(), self.clock.now());
        let stored = self.store.create(application)?;
        info!(
            application = %stored.id,
            hiring_request = %stored.hiring_request_id,
            candidate = %stored.candidate_id,
            "application submitted"
        );
        Ok(stored)
    }

    /// Single entry point for status changes on either entity.
    pub fn request_transition(
        &self,
        session: &Session,
        transition: TransitionRequest,
    ) -> Result<WorkflowEntity, WorkflowError> {
        match transition {
            TransitionRequest::HiringRequest { id, to } => self
                .transition_hiring_request(session, &id, to)
                .map(WorkflowEntity::HiringRequest),
            TransitionRequest::Application { id, to } => self
                .transition_application(session, &id, to)
                .map(WorkflowEntity::Application),
        }
    }

    pub fn transition_hiring_request(
        &self,
        session: &Session,
        id: &HiringRequestId,
        to: HiringRequestStatus,
    ) -> Result<HiringRequest, WorkflowError> {
        let actor = session.require_identity()?;
        let current = self.store.get::<HiringRequest>(&id.0)?;
        let is_owner = self.owns_agency(actor, &current.agency_id)?;

        authorize_transition(current.status, to, actor, is_owner)
            .map_err(|err| rejected(EntityKind::HiringRequest, &id.0, actor, err))?;

        let mut updated = current.clone();
        updated.status = to;
        updated.updated_at = self.clock.now();
        let stored = self
            .store
            .conditional_update(&id.0, current.status, updated)
            .map_err(|err| {
                rejected(
                    EntityKind::HiringRequest,
                    &id.0,
                    actor,
                    WorkflowError::from(err),
                )
            })?;

        info!(
            hiring_request = %stored.id,
            actor = %actor.id,
            from = current.status.label(),
            to = to.label(),
            "hiring request transitioned"
        );
        Ok(stored)
    }

    pub fn transition_application(
        &self,
        session: &Session,
        id: &ApplicationId,
        to: ApplicationStatus,
    ) -> Result<Application, WorkflowError> {
        let actor = session.require_identity()?;
        let current = self.store.get::<Application>(&id.0)?;
        let is_owner = current.candidate_id == actor.id;

        authorize_transition(current.status, to, actor, is_owner)
            .map_err(|err| rejected(EntityKind::Application, &id.0, actor, err))?;

        let mut updated = current.clone();
        updated.status = to;
        updated.updated_at = self.clock.now();
        let stored = self
            .store
            .conditional_update(&id.0, current.status, updated)
            .map_err(|err| {
                rejected(
                    EntityKind::Application,
                    &id.0,
                    actor,
                    WorkflowError::from(err),
                )
            })?;

        info!(
            application = %stored.id,
            actor = %actor.id,
            from = current.status.label(),
            to = to.label(),
            "application transitioned"
        );
        Ok(stored)
    }

    /// Requests still taking applications: pending or in progress, deadline not elapsed.
    pub fn open_hiring_requests(
        &self,
        session: &Session,
    ) -> Result<Vec<HiringRequest>, WorkflowError> {
        session.require_identity()?;
        let today = self.today();
        let open = self
            .store
            .find_where(&|request: &HiringRequest| request.is_open(today))?;
        debug!(count = open.len(), %today, "listed open hiring requests");
        Ok(open)
    }

    pub fn hiring_requests_for_agency(
        &self,
        session: &Session,
    ) -> Result<Vec<HiringRequest>, WorkflowError> {
        let actor = session.require_identity()?;
        require_role(actor, &[Role::Agency])?;

        let Some(agency) = self.agency_owned_by(&actor.id)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .store
            .find_where(&|request: &HiringRequest| request.agency_id == agency.id)?)
    }

    /// Staff see every request's applicants; an agency only its own.
    pub fn applications_for_request(
        &self,
        session: &Session,
        hiring_request_id: &HiringRequestId,
    ) -> Result<Vec<Application>, WorkflowError> {
        let actor = session.require_identity()?;
        require_role(actor, &[Role::Admin, Role::Team, Role::Agency])?;

        let request = self.store.get::<HiringRequest>(&hiring_request_id.0)?;
        if !actor.role.is_staff() && !self.owns_agency(actor, &request.agency_id)? {
            return Err(WorkflowError::AuthorizationDenied {
                reason: DenyReason::NotOwner,
            });
        }

        Ok(self.store.find_where(&|application: &Application| {
            application.hiring_request_id == request.id
        })?)
    }

    pub fn applications_for_candidate(
        &self,
        session: &Session,
    ) -> Result<Vec<Application>, WorkflowError> {
        let actor = session.require_identity()?;
        require_role(actor, &[Role::Talent])?;

        Ok(self
            .store
            .find_where(&|application: &Application| application.candidate_id == actor.id)?)
    }

    fn agency_owned_by(&self, owner: &IdentityId) -> Result<Option<Agency>, WorkflowError> {
        let mut owned = self
            .store
            .find_where(&|agency: &Agency| &agency.owner_identity_id == owner)?;
        Ok(owned.pop())
    }

    fn owns_agency(&self, actor: &Identity, agency_id: &AgencyId) -> Result<bool, WorkflowError> {
        if actor.role != Role::Agency {
            return Ok(false);
        }
        Ok(self
            .agency_owned_by(&actor.id)?
            .is_some_and(|agency| &agency.id == agency_id))
    }
}

fn require_role(actor: &Identity, accepted: &[Role]) -> Result<(), WorkflowError> {
    if accepted.contains(&actor.role) {
        return Ok(());
    }
    Err(WorkflowError::AuthorizationDenied {
        reason: DenyReason::RoleNotAccepted {
            role: actor.role,
            accepted: accepted.to_vec(),
        },
    })
}

fn rejected(kind: EntityKind, id: &str, actor: &Identity, err: WorkflowError) -> WorkflowError {
    match &err {
        WorkflowError::Conflict { .. } => {
            warn!(entity = %kind, id, actor = %actor.id, "transition lost a concurrent update")
        }
        _ => warn!(entity = %kind, id, actor = %actor.id, error = %err, "transition rejected"),
    }
    err
}
