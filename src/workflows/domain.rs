use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::access::IdentityId;
use crate::persistence::{EntityKind, Record, Tracked};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgencyId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HiringRequestId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

macro_rules! display_id {
    ($($id:ty),+) => {
        $(impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })+
    };
}

display_id!(AgencyId, HiringRequestId, ApplicationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Starter,
    Professional,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Cancelled,
}

impl SubscriptionStatus {
    /// Agencies in good standing may post hiring requests.
    pub const fn permits_posting(self) -> bool {
        matches!(self, Self::Trialing | Self::Active)
    }
}

/// Staffing agency, one per owning identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    pub id: AgencyId,
    pub name: String,
    pub subscription_tier: SubscriptionTier,
    pub subscription_status: SubscriptionStatus,
    pub owner_identity_id: IdentityId,
    pub created_at: DateTime<Utc>,
}

impl Record for Agency {
    const KIND: EntityKind = EntityKind::Agency;

    fn record_id(&self) -> &str {
        &self.id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiringRequestStatus {
    Pending,
    InProgress,
    Fulfilled,
    Cancelled,
}

/// Agency-authored demand for a number of positions abroad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringRequest {
    pub id: HiringRequestId,
    pub agency_id: AgencyId,
    pub job_title: String,
    pub quantity: u32,
    pub destination_country: String,
    pub status: HiringRequestStatus,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HiringRequest {
    /// The deadline day itself still counts as open.
    pub fn deadline_elapsed(&self, today: NaiveDate) -> bool {
        today > self.deadline
    }
}

impl Record for HiringRequest {
    const KIND: EntityKind = EntityKind::HiringRequest;

    fn record_id(&self) -> &str {
        &self.id.0
    }
}

impl Tracked for HiringRequest {
    type Status = HiringRequestStatus;

    fn status(&self) -> HiringRequestStatus {
        self.status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    UnderReview,
    InterviewScheduled,
    Accepted,
    Rejected,
    Withdrawn,
}

/// A talent's candidacy against one hiring request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub hiring_request_id: HiringRequestId,
    pub candidate_id: IdentityId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Application {
    const KIND: EntityKind = EntityKind::Application;

    fn record_id(&self) -> &str {
        &self.id.0
    }
}

impl Tracked for Application {
    type Status = ApplicationStatus;

    fn status(&self) -> ApplicationStatus {
        self.status
    }
}

/// Agency sign-up payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAgency {
    pub name: String,
    pub subscription_tier: SubscriptionTier,
}

/// Hiring request creation payload; the agency comes from the acting identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHiringRequest {
    pub job_title: String,
    pub quantity: u32,
    pub destination_country: String,
    pub deadline: NaiveDate,
}

/// Entity reference paired with the status the caller wants it to reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum TransitionRequest {
    HiringRequest {
        id: HiringRequestId,
        to: HiringRequestStatus,
    },
    Application {
        id: ApplicationId,
        to: ApplicationStatus,
    },
}

/// Entity state returned after a successful transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum WorkflowEntity {
    HiringRequest(HiringRequest),
    Application(Application),
}
