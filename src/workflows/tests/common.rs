use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};

use chrono::NaiveDate;

use crate::access::Role;
use crate::clock::FixedClock;
use crate::persistence::{InMemoryStore, Record, Store, StoreError, Tracked};
use crate::session::{IdentityDirectory, NewIdentity, Session};
use crate::workflows::{
    HiringRequest, NewAgency, NewHiringRequest, SubscriptionTier, WorkflowEngine,
};

pub(super) const ADMIN_EMAIL: &str = "admin@hireflow.test";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn deadline() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 15).expect("valid date")
}

pub(super) fn new_request(quantity: u32) -> NewHiringRequest {
    NewHiringRequest {
        job_title: "Caregiver".to_string(),
        quantity,
        destination_country: "Japan".to_string(),
        deadline: deadline(),
    }
}

/// Engine plus identity directory over one shared store, pinned to [`today`].
pub(super) struct Harness<S> {
    pub(super) store: Arc<S>,
    pub(super) engine: WorkflowEngine<S>,
    pub(super) directory: IdentityDirectory<S>,
}

pub(super) fn harness() -> Harness<InMemoryStore> {
    harness_on(Arc::new(InMemoryStore::new()))
}

pub(super) fn harness_on<S: Store>(store: Arc<S>) -> Harness<S> {
    Harness {
        engine: WorkflowEngine::with_clock(store.clone(), Arc::new(FixedClock::on(today()))),
        directory: IdentityDirectory::new(store.clone()),
        store,
    }
}

impl<S: Store> Harness<S> {
    /// A second engine over the same records, observing a different date.
    pub(super) fn engine_on(&self, date: NaiveDate) -> WorkflowEngine<S> {
        WorkflowEngine::with_clock(self.store.clone(), Arc::new(FixedClock::on(date)))
    }

    pub(super) fn admin(&self) -> Session {
        let admin = self
            .directory
            .bootstrap_admin(ADMIN_EMAIL)
            .expect("admin seeded");
        Session::authenticated(admin)
    }

    pub(super) fn member(&self, role: Role, email: &str) -> Session {
        let acting = if role.is_staff() {
            self.admin()
        } else {
            Session::anonymous()
        };
        let identity = self
            .directory
            .provision(
                &acting,
                NewIdentity {
                    email: email.to_string(),
                    role,
                    display_name: email.split('@').next().unwrap_or(email).to_string(),
                },
            )
            .expect("identity provisioned");
        Session::authenticated(identity)
    }

    pub(super) fn team(&self) -> Session {
        self.member(Role::Team, "team@hireflow.test")
    }

    pub(super) fn talent(&self, email: &str) -> Session {
        self.member(Role::Talent, email)
    }

    /// Agency identity that has already completed agency sign-up.
    pub(super) fn agency(&self, email: &str) -> Session {
        let session = self.member(Role::Agency, email);
        self.engine
            .register_agency(
                &session,
                NewAgency {
                    name: format!("{email} staffing"),
                    subscription_tier: SubscriptionTier::Professional,
                },
            )
            .expect("agency registered");
        session
    }

    pub(super) fn pending_request(&self, agency: &Session, quantity: u32) -> HiringRequest {
        self.engine
            .create_hiring_request(agency, new_request(quantity))
            .expect("hiring request created")
    }
}

/// Store wrapper that holds every armed `get` until two readers have arrived, so both
/// observe the same status before either writes.
pub(super) struct GatedStore<S> {
    inner: S,
    armed: AtomicBool,
    gate: Barrier,
}

impl<S: Store> GatedStore<S> {
    pub(super) fn new(inner: S) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            gate: Barrier::new(2),
        }
    }

    pub(super) fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub(super) fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}

impl<S: Store> Store for GatedStore<S> {
    fn get<E: Record>(&self, id: &str) -> Result<E, StoreError> {
        let record = self.inner.get(id);
        if self.armed.load(Ordering::SeqCst) {
            self.gate.wait();
        }
        record
    }

    fn find_where<E: Record>(
        &self,
        predicate: &dyn Fn(&E) -> bool,
    ) -> Result<Vec<E>, StoreError> {
        self.inner.find_where(predicate)
    }

    fn create<E: Record>(&self, record: E) -> Result<E, StoreError> {
        self.inner.create(record)
    }

    fn conditional_update<E: Tracked>(
        &self,
        id: &str,
        expected: E::Status,
        updated: E,
    ) -> Result<E, StoreError> {
        self.inner.conditional_update(id, expected, updated)
    }
}
