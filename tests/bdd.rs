use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use cucumber::{given, then, when, World as _};
use tripmate::{
    error::AppError,
    models::{
        expense::{Debt, Expense},
        itinerary::ItineraryItem,
        note::Note,
        trip::Trip,
    },
    services::sync::{RemoteSink, SharedState, SyncPayload, SyncScheduler},
    settle::settle,
    state::Store,
    store::{Action, AppState, Direction},
};

const USER: &str = "user-1";
const DEBOUNCE: Duration = Duration::from_millis(50);
const QUIET: Duration = Duration::from_millis(250);

#[derive(Default)]
struct RecordingSink {
    pushes: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

#[async_trait]
impl RemoteSink for RecordingSink {
    async fn push_trip(&self, payload: SyncPayload) -> Result<(), AppError> {
        self.pushes.lock().unwrap().push(payload.trip.id.clone());
        Ok(())
    }

    async fn delete_trip(&self, trip_id: &str) -> Result<(), AppError> {
        self.deletes.lock().unwrap().push(trip_id.to_string());
        Ok(())
    }
}

struct TestEnv {
    store: Store,
    sink: Arc<RecordingSink>,
    trips: Vec<String>,
}

impl fmt::Debug for TestEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEnv").finish()
    }
}

impl TestEnv {
    fn new() -> Self {
        let snapshot: SharedState = Arc::new(Mutex::new(AppState::default()));
        let sink = Arc::new(RecordingSink::default());
        let scheduler = SyncScheduler::new(sink.clone(), snapshot.clone(), DEBOUNCE);
        let store = Store::new(snapshot, USER, scheduler);
        Self {
            store,
            sink,
            trips: Vec::new(),
        }
    }
}

#[derive(Debug, cucumber::World, Default)]
struct PlannerWorld {
    env: Option<TestEnv>,
    last_error: Option<AppError>,
    debts: Vec<Debt>,
}

impl PlannerWorld {
    fn env(&mut self) -> &mut TestEnv {
        self.env.get_or_insert_with(TestEnv::new)
    }

    fn current_trip(&self) -> String {
        self.env
            .as_ref()
            .and_then(|env| env.trips.last())
            .expect("a trip must exist first")
            .clone()
    }

    fn state(&self) -> AppState {
        self.env.as_ref().expect("env").store.snapshot()
    }

    fn settle_current(&mut self) {
        let trip_id = self.current_trip();
        let state = self.state();
        let trip = state.trips.iter().find(|t| t.id == trip_id).expect("trip");
        let expenses: Vec<Expense> = state
            .expenses
            .iter()
            .filter(|e| e.trip_id == trip_id)
            .cloned()
            .collect();
        self.debts = settle(&expenses, &trip.participants);
    }
}

fn parse_splits(raw: &str) -> HashMap<String, f64> {
    raw.split(',')
        .filter_map(|pair| {
            let (name, amount) = pair.split_once(':')?;
            Some((name.trim().to_string(), amount.trim().parse().ok()?))
        })
        .collect()
}

#[given(regex = r#"^a trip "([^"]+)" with participants "([^"]*)" lasting (\d+) days$"#)]
async fn given_trip(world: &mut PlannerWorld, title: String, participants: String, days: u32) {
    let mut trip = Trip::new(
        title,
        days,
        NaiveDate::from_ymd_opt(2026, 4, 1).expect("date"),
        USER,
    );
    trip.participants = participants
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let id = trip.id.clone();
    let env = world.env();
    env.store.dispatch(Action::AddTrip(trip)).expect("add trip");
    env.trips.push(id);
}

#[given(regex = r#"^an itinerary entry "([^"]+)" on day (\d+) at "([^"]+)"$"#)]
async fn given_itinerary_entry(world: &mut PlannerWorld, title: String, day: u32, time: String) {
    let trip_id = world.current_trip();
    let mut item = ItineraryItem::new(trip_id, day);
    item.title = title;
    item.time = time;
    world
        .env()
        .store
        .dispatch(Action::AddItem(item))
        .expect("add item");
}

#[given(regex = r#"^notes "([^"]+)"$"#)]
async fn given_notes(world: &mut PlannerWorld, titles: String) {
    let trip_id = world.current_trip();
    for (order, title) in titles.split(',').map(str::trim).enumerate() {
        let note = Note::new(&trip_id, title, order as i64);
        world
            .env()
            .store
            .dispatch(Action::AddNote(note))
            .expect("add note");
    }
}

#[when(regex = r#"^"([^"]+)" pays ([\d.]+) split evenly for "([^"]+)"$"#)]
async fn when_even_expense(world: &mut PlannerWorld, payer: String, amount: f64, title: String) {
    let trip_id = world.current_trip();
    let expense = Expense::new(trip_id, title, amount, payer);
    world
        .env()
        .store
        .dispatch(Action::AddExpense(expense))
        .expect("add expense");
    world.settle_current();
}

#[when(regex = r#"^"([^"]+)" pays ([\d.]+) for "([^"]+)" split as "([^"]+)"$"#)]
async fn when_custom_expense(
    world: &mut PlannerWorld,
    payer: String,
    amount: f64,
    title: String,
    splits: String,
) {
    let trip_id = world.current_trip();
    let expense =
        Expense::new(trip_id, title, amount, payer).with_custom_splits(parse_splits(&splits));
    world
        .env()
        .store
        .dispatch(Action::AddExpense(expense))
        .expect("add expense");
    world.settle_current();
}

#[when(regex = r#"^"([^"]+)" tries to pay ([\d.]+) for "([^"]+)" split as "([^"]+)"$"#)]
async fn when_invalid_expense(
    world: &mut PlannerWorld,
    payer: String,
    amount: f64,
    title: String,
    splits: String,
) {
    let trip_id = world.current_trip();
    let expense =
        Expense::new(trip_id, title, amount, payer).with_custom_splits(parse_splits(&splits));
    world.last_error = world.env().store.dispatch(Action::AddExpense(expense)).err();
}

#[when(regex = r"^day (\d+) is swapped with day (\d+)$")]
async fn when_swap_days(world: &mut PlannerWorld, day_a: u32, day_b: u32) {
    let trip_id = world.current_trip();
    world
        .env()
        .store
        .dispatch(Action::SwapDays { trip_id, day_a, day_b })
        .expect("swap days");
}

#[when(regex = r#"^note "([^"]+)" is moved (up|down)$"#)]
async fn when_move_note(world: &mut PlannerWorld, title: String, direction: String) {
    let state = world.state();
    let note = state
        .notes
        .iter()
        .find(|n| n.title == title)
        .expect("note exists");
    let direction = if direction == "up" { Direction::Up } else { Direction::Down };
    world
        .env()
        .store
        .dispatch(Action::ReorderNote { id: note.id.clone(), direction })
        .expect("reorder");
}

#[when(regex = r"^(\d+) expenses are added in quick succession$")]
async fn when_expense_burst(world: &mut PlannerWorld, count: usize) {
    let trip_id = world.current_trip();
    for n in 0..count {
        let expense = Expense::new(&trip_id, format!("expense {n}"), 10.0, "A");
        world
            .env()
            .store
            .dispatch(Action::AddExpense(expense))
            .expect("add expense");
    }
}

#[when(regex = r#"^an expense is added to trip "([^"]+)"$"#)]
async fn when_expense_on_named_trip(world: &mut PlannerWorld, title: String) {
    let state = world.state();
    let trip = state
        .trips
        .iter()
        .find(|t| t.title == title)
        .expect("trip by title");
    let expense = Expense::new(&trip.id, "shared", 10.0, "A");
    world
        .env()
        .store
        .dispatch(Action::AddExpense(expense))
        .expect("add expense");
}

#[when("the debounce window passes")]
async fn when_window_passes(_world: &mut PlannerWorld) {
    tokio::time::sleep(QUIET).await;
}

#[when(regex = r#"^trip "([^"]+)" is deleted$"#)]
async fn when_trip_deleted(world: &mut PlannerWorld, title: String) {
    let state = world.state();
    let trip = state
        .trips
        .iter()
        .find(|t| t.title == title)
        .expect("trip by title");
    let trip_id = trip.id.clone();
    world
        .env()
        .store
        .dispatch(Action::DeleteTrip { trip_id })
        .expect("delete trip");
}

#[then(regex = r"^the settlement has (\d+) transfers?$")]
async fn then_transfer_count(world: &mut PlannerWorld, expected: usize) {
    assert_eq!(world.debts.len(), expected, "debts: {:?}", world.debts);
}

#[then(regex = r#"^"([^"]+)" owes "([^"]+)" ([\d.]+)$"#)]
async fn then_owes(world: &mut PlannerWorld, from: String, to: String, amount: f64) {
    let found = world
        .debts
        .iter()
        .find(|d| d.from == from && d.to == to)
        .unwrap_or_else(|| panic!("no transfer {from} -> {to} in {:?}", world.debts));
    assert!((found.amount - amount).abs() < 0.01);
}

#[then("the expense is rejected")]
async fn then_rejected(world: &mut PlannerWorld) {
    assert!(matches!(world.last_error, Some(AppError::Validation(_))));
}

#[then(regex = r"^the trip has (\d+) stored expenses$")]
async fn then_expense_count(world: &mut PlannerWorld, expected: usize) {
    let trip_id = world.current_trip();
    let count = world
        .state()
        .expenses
        .iter()
        .filter(|e| e.trip_id == trip_id)
        .count();
    assert_eq!(count, expected);
}

#[then(regex = r#"^"([^"]+)" is on day (\d+)$"#)]
async fn then_entry_on_day(world: &mut PlannerWorld, title: String, day: u32) {
    let state = world.state();
    let item = state
        .itinerary
        .iter()
        .find(|i| i.title == title)
        .expect("entry exists");
    assert_eq!(item.day_index, day);
}

#[then(regex = r#"^the notes read "([^"]+)"$"#)]
async fn then_notes_read(world: &mut PlannerWorld, expected: String) {
    let trip_id = world.current_trip();
    let mut notes: Vec<Note> = world
        .state()
        .notes
        .iter()
        .filter(|n| n.trip_id == trip_id)
        .cloned()
        .collect();
    notes.sort_by_key(|n| n.order);
    let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
    let expected: Vec<&str> = expected.split(',').map(str::trim).collect();
    assert_eq!(titles, expected);
}

#[then(regex = r"^exactly (\d+) sync calls? reached the server$")]
async fn then_sync_count(world: &mut PlannerWorld, expected: usize) {
    let pushes = world.env().sink.pushes.lock().unwrap();
    assert_eq!(pushes.len(), expected, "pushed trips: {pushes:?}");
}

#[then(regex = r"^exactly (\d+) delete calls? reached the server$")]
async fn then_delete_count(world: &mut PlannerWorld, expected: usize) {
    let deletes = world.env().sink.deletes.lock().unwrap();
    assert_eq!(deletes.len(), expected, "deleted trips: {deletes:?}");
}

#[then("the local snapshot has no trips")]
async fn then_no_trips(world: &mut PlannerWorld) {
    assert!(world.state().trips.is_empty());
}

#[tokio::main]
async fn main() {
    PlannerWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
