use std::sync::Arc;

use tripmate::config::AppConfig;
use tripmate::error::AppError;
use tripmate::models::trip::ShortCode;
use tripmate::models::user::User;
use tripmate::services::api::{ApiClient, JoinOutcome};
use tripmate::services::sync::{SharedState, SyncScheduler};
use tripmate::settle::settle;
use tripmate::state::Store;
use tripmate::store::{Action, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let api = ApiClient::new(config.api_base.clone(), config.request_timeout)?;

    let (api, user) = authenticate(api, &config).await?;

    // join code handed on the command line, same flow the web app runs
    // for a ?join= query parameter once auth completes
    if let Some(raw) = std::env::args().nth(1) {
        let code: ShortCode = raw.parse()?;
        match api.join(&code).await {
            Ok(JoinOutcome::Joined) => info!(code = %code, "joined trip"),
            Ok(JoinOutcome::AlreadyMember) => info!(code = %code, "already a member"),
            Err(AppError::NotFound) => warn!(code = %code, "no trip with that code"),
            Err(err) => return Err(err),
        }
    }

    let initial = api.load_all(&user).await?;
    let snapshot: SharedState = Arc::new(std::sync::Mutex::new(AppState::default()));
    let scheduler = SyncScheduler::new(
        Arc::new(api.clone()),
        snapshot.clone(),
        config.debounce,
    );
    let store = Store::new(snapshot, user.id.clone(), scheduler);
    store.dispatch(Action::ReplaceState(initial))?;

    report(&store.snapshot(), &user);
    Ok(())
}

async fn authenticate(api: ApiClient, config: &AppConfig) -> Result<(ApiClient, User), AppError> {
    if let Some(token) = &config.auth_token {
        // with a pre-issued token the profile comes along with the trips,
        // so a placeholder identity is enough until the first load
        let user = User {
            id: "self".into(),
            name: String::new(),
            email: String::new(),
        };
        return Ok((api.with_token(token.clone()), user));
    }

    let (Some(email), Some(password)) = (&config.email, &config.password) else {
        return Err(AppError::Config(
            "set TRIPMATE_TOKEN or TRIPMATE_EMAIL / TRIPMATE_PASSWORD".into(),
        ));
    };
    let session = api.login(email, password).await?;
    info!(user = %session.user.email, "logged in");
    Ok((api.with_token(session.token.clone()), session.user))
}

fn report(state: &AppState, user: &User) {
    info!(trips = state.trips.len(), "snapshot loaded");
    for trip in tripmate::permissions::visible_trips(&state.trips, &user.id) {
        let role = tripmate::permissions::role_of(trip, &user.id);
        let expenses = state.expenses_of(&trip.id);
        let debts = settle(&expenses, &trip.participants);

        println!(
            "{} [{}] {}: {} days, {} participants, {} expenses",
            trip.short_code,
            format!("{role:?}").to_uppercase(),
            trip.title,
            trip.days,
            trip.participants.len(),
            expenses.len(),
        );
        for debt in debts {
            println!("    {} -> {}: {:.2}", debt.from, debt.to, debt.amount);
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tripmate=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
