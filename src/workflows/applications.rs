use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationId, ApplicationStatus, HiringRequestId};
use super::graph::{ActorRule, Edge, Lifecycle};
use crate::access::IdentityId;
use crate::persistence::{next_record_id, EntityKind};

static APPLICATION_EDGES: [Edge<ApplicationStatus>; 7] = [
    Edge {
        from: ApplicationStatus::Applied,
        to: ApplicationStatus::UnderReview,
        actors: ActorRule::STAFF,
    },
    Edge {
        from: ApplicationStatus::UnderReview,
        to: ApplicationStatus::InterviewScheduled,
        actors: ActorRule::STAFF,
    },
    Edge {
        from: ApplicationStatus::InterviewScheduled,
        to: ApplicationStatus::Accepted,
        actors: ActorRule::STAFF,
    },
    Edge {
        from: ApplicationStatus::Applied,
        to: ApplicationStatus::Rejected,
        actors: ActorRule::STAFF,
    },
    Edge {
        from: ApplicationStatus::UnderReview,
        to: ApplicationStatus::Rejected,
        actors: ActorRule::STAFF,
    },
    Edge {
        from: ApplicationStatus::InterviewScheduled,
        to: ApplicationStatus::Rejected,
        actors: ActorRule::STAFF,
    },
    // Candidate-initiated, and only before review starts.
    Edge {
        from: ApplicationStatus::Applied,
        to: ApplicationStatus::Withdrawn,
        actors: ActorRule::OWNER,
    },
];

impl Lifecycle for ApplicationStatus {
    const ENTITY: EntityKind = EntityKind::Application;

    fn initial() -> Self {
        ApplicationStatus::Applied
    }

    fn edges() -> &'static [Edge<Self>] {
        &APPLICATION_EDGES
    }

    fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl Application {
    pub(crate) fn submit(
        hiring_request_id: HiringRequestId,
        candidate_id: IdentityId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ApplicationId(next_record_id("app")),
            hiring_request_id,
            candidate_id,
            status: ApplicationStatus::initial(),
            applied_at: now,
            updated_at: now,
        }
    }

    /// Still competing for the position; blocks a second application by the same candidate.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub(crate) fn blocks_reapplication(
        &self,
        hiring_request_id: &HiringRequestId,
        candidate_id: &IdentityId,
    ) -> bool {
        self.is_active()
            && &self.hiring_request_id == hiring_request_id
            && &self.candidate_id == candidate_id
    }
}
