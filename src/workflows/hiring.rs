use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    AgencyId, HiringRequest, HiringRequestId, HiringRequestStatus, NewHiringRequest,
};
use super::error::{TransitionRejection, WorkflowError};
use super::graph::{ActorRule, Edge, Lifecycle};
use crate::persistence::{next_record_id, EntityKind};

static HIRING_REQUEST_EDGES: [Edge<HiringRequestStatus>; 4] = [
    Edge {
        from: HiringRequestStatus::Pending,
        to: HiringRequestStatus::InProgress,
        actors: ActorRule::STAFF,
    },
    Edge {
        from: HiringRequestStatus::InProgress,
        to: HiringRequestStatus::Fulfilled,
        actors: ActorRule::STAFF,
    },
    Edge {
        from: HiringRequestStatus::Pending,
        to: HiringRequestStatus::Cancelled,
        actors: ActorRule::OWNER_OR_STAFF,
    },
    Edge {
        from: HiringRequestStatus::InProgress,
        to: HiringRequestStatus::Cancelled,
        actors: ActorRule::OWNER_OR_STAFF,
    },
];

impl Lifecycle for HiringRequestStatus {
    const ENTITY: EntityKind = EntityKind::HiringRequest;

    fn initial() -> Self {
        HiringRequestStatus::Pending
    }

    fn edges() -> &'static [Edge<Self>] {
        &HIRING_REQUEST_EDGES
    }

    fn label(self) -> &'static str {
        match self {
            HiringRequestStatus::Pending => "pending",
            HiringRequestStatus::InProgress => "in_progress",
            HiringRequestStatus::Fulfilled => "fulfilled",
            HiringRequestStatus::Cancelled => "cancelled",
        }
    }
}

impl HiringRequest {
    /// Eligibility for new applications: pending or in progress, deadline not elapsed.
    pub fn accepting_applications(&self, today: NaiveDate) -> Result<(), TransitionRejection> {
        if !matches!(
            self.status,
            HiringRequestStatus::Pending | HiringRequestStatus::InProgress
        ) {
            return Err(TransitionRejection::RequestClosed {
                status: self.status.label(),
            });
        }
        if self.deadline_elapsed(today) {
            return Err(TransitionRejection::DeadlineElapsed {
                deadline: self.deadline,
            });
        }
        Ok(())
    }

    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.accepting_applications(today).is_ok()
    }
}

impl NewHiringRequest {
    pub(crate) fn validate(&self, today: NaiveDate) -> Result<(), WorkflowError> {
        if self.quantity == 0 {
            return Err(WorkflowError::InvalidInput {
                field: "quantity",
                reason: "must request at least one position".to_string(),
            });
        }
        if self.job_title.trim().is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "job_title",
                reason: "must not be blank".to_string(),
            });
        }
        if self.destination_country.trim().is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "destination_country",
                reason: "must not be blank".to_string(),
            });
        }
        if self.deadline < today {
            return Err(WorkflowError::InvalidInput {
                field: "deadline",
                reason: format!("{} is already in the past", self.deadline),
            });
        }
        Ok(())
    }

    pub(crate) fn into_hiring_request(
        self,
        agency_id: AgencyId,
        now: DateTime<Utc>,
    ) -> HiringRequest {
        HiringRequest {
            id: HiringRequestId(next_record_id("hr")),
            agency_id,
            job_title: self.job_title.trim().to_string(),
            quantity: self.quantity,
            destination_country: self.destination_country.trim().to_string(),
            status: HiringRequestStatus::initial(),
            deadline: self.deadline,
            created_at: now,
            updated_at: now,
        }
    }
}
