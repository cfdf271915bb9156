use std::sync::Arc;

use chrono::{Days, Utc};
use hireflow::access::{AccessGuard, Menu, PermissionEvaluator, Role, RoleRegistry};
use hireflow::clock::FixedClock;
use hireflow::error::AppError;
use hireflow::persistence::InMemoryStore;
use hireflow::session::{IdentityDirectory, NewIdentity, Session};
use hireflow::workflows::{
    ApplicationStatus, HiringRequestStatus, NewAgency, NewHiringRequest, SubscriptionTier,
    TransitionRequest, WorkflowEngine, WorkflowError,
};

/// Scripted walk through the hiring lifecycle, printing each decision.
pub(crate) fn run() -> Result<(), AppError> {
    let today = Utc::now().date_naive();
    let deadline = today.checked_add_days(Days::new(30)).unwrap_or(today);

    let store = Arc::new(InMemoryStore::new());
    let engine = WorkflowEngine::with_clock(store.clone(), Arc::new(FixedClock::on(today)));
    let directory = IdentityDirectory::new(store.clone());
    let guard = AccessGuard::new(PermissionEvaluator::new(Arc::new(RoleRegistry::standard())));
    let menu = Menu::standard();

    let admin = Session::authenticated(directory.bootstrap_admin("admin@hireflow.local")?);
    let agency = sign_up(&directory, Role::Agency, "recruiting@acme.example", "Acme Recruiting")?;
    let talent = sign_up(&directory, Role::Talent, "maria@talent.example", "Maria")?;

    println!("Hiring workflow demo ({today})");
    println!("\nMenus");
    for (name, session) in [("admin", &admin), ("agency", &agency), ("talent", &talent)] {
        let items = menu
            .list_for(&guard, session)
            .iter()
            .map(|item| item.label)
            .collect::<Vec<_>>()
            .join(", ");
        println!("- {name}: {items}");
    }

    engine.register_agency(
        &agency,
        NewAgency {
            name: "Acme Recruiting".to_string(),
            subscription_tier: SubscriptionTier::Professional,
        },
    )?;
    let request = engine.create_hiring_request(
        &agency,
        NewHiringRequest {
            job_title: "Welder".to_string(),
            quantity: 50,
            destination_country: "Germany".to_string(),
            deadline,
        },
    )?;
    println!("\nHiring request lifecycle");
    println!(
        "- agency created {} for {} x {} ({}), status {:?}",
        request.id, request.quantity, request.job_title, request.destination_country, request.status
    );

    let started = engine.transition_hiring_request(
        &admin,
        &request.id,
        HiringRequestStatus::InProgress,
    )?;
    println!("- admin moved it to {:?}", started.status);
    report(
        "agency tries in_progress -> fulfilled",
        engine.request_transition(
            &agency,
            TransitionRequest::HiringRequest {
                id: request.id.clone(),
                to: HiringRequestStatus::Fulfilled,
            },
        ),
    );

    println!("\nApplications");
    let application = engine.apply(&talent, &request.id)?;
    println!("- talent applied: {} ({:?})", application.id, application.status);
    report("talent applies again", engine.apply(&talent, &request.id));
    report(
        "talent moves own application to under_review",
        engine.request_transition(
            &talent,
            TransitionRequest::Application {
                id: application.id.clone(),
                to: ApplicationStatus::UnderReview,
            },
        ),
    );
    report(
        "talent withdraws",
        engine.request_transition(
            &talent,
            TransitionRequest::Application {
                id: application.id.clone(),
                to: ApplicationStatus::Withdrawn,
            },
        ),
    );

    let after_deadline = deadline.checked_add_days(Days::new(1)).unwrap_or(deadline);
    let late = WorkflowEngine::with_clock(store, Arc::new(FixedClock::on(after_deadline)));
    report(
        &format!("talent applies on {after_deadline}, after the deadline"),
        late.apply(&talent, &request.id),
    );

    Ok(())
}

fn sign_up(
    directory: &IdentityDirectory<InMemoryStore>,
    role: Role,
    email: &str,
    display_name: &str,
) -> Result<Session, WorkflowError> {
    let identity = directory.provision(
        &Session::anonymous(),
        NewIdentity {
            email: email.to_string(),
            role,
            display_name: display_name.to_string(),
        },
    )?;
    Ok(Session::authenticated(identity))
}

fn report<T: std::fmt::Debug>(action: &str, outcome: Result<T, WorkflowError>) {
    match outcome {
        Ok(value) => println!("- {action}: ok {value:?}"),
        Err(err) => println!("- {action}: {} ({err})", err.kind().label()),
    }
}
